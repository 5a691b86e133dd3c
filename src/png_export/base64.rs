//! # Base64 编解码模块
//!
//! ## 设计思路
//!
//! 输入与输出都以 `data:` URI 文本传输，因此需要在“字节 ↔ 文本”之间双向转换。
//! 编码使用滚动位缓冲区逐 6 位输出字符；解码按 4 字符一组还原 3 字节。
//!
//! ## 实现思路
//!
//! - 反向查找表通过 `once_cell::sync::Lazy` 在首次解码时构建，之后只读共享。
//! - 解码前先剥离尾部 `=`，再按有效字符数 `n` 计算输出长度 `n * 6 / 8`。
//! - 非字母表字符（包括出现在中间的 `=`）直接返回 `InvalidCharacter`，
//!   不做“垃圾进垃圾出”的宽松解码。

use once_cell::sync::Lazy;

use super::ExportError;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const PADDING: u8 = b'=';
const INVALID: u8 = 0xFF;

/// 反向查找表：ASCII 字节 → 6 位值，非字母表字节为 `INVALID`。
static REVERSE_TABLE: Lazy<[u8; 256]> = Lazy::new(|| {
    let mut table = [INVALID; 256];
    for (value, &symbol) in ALPHABET.iter().enumerate() {
        table[symbol as usize] = value as u8;
    }
    table
});

/// 将字节序列编码为 Base64 文本。
///
/// 输出长度恒为 `ceil(n / 3) * 4`，不足部分以 `=` 补齐。
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().div_ceil(3) * 4);

    let mut bits: u32 = 0;
    let mut num_bits: i32 = 0;
    let mut index = 0;

    while index < bytes.len() || num_bits > 0 {
        if num_bits < 6 {
            while num_bits <= 24 && index < bytes.len() {
                bits |= (bytes[index] as u32) << (24 - num_bits);
                num_bits += 8;
                index += 1;
            }
        }
        out.push(ALPHABET[(bits >> 26) as usize] as char);
        bits <<= 6;
        num_bits -= 6;
    }

    while out.len() % 4 != 0 {
        out.push(PADDING as char);
    }
    out
}

/// 将 Base64 文本解码为字节序列。
///
/// 尾部 `=` 会被剥离，数量不作限制；剥离后的任何非字母表字符都会报错，
/// `index` 为该字符在原文本中的字节偏移。
///
/// # 示例
/// ```rust
/// use png_dpi_export::png_export::base64;
///
/// assert_eq!(base64::decode("SGk=")?, b"Hi".to_vec());
/// # Ok::<(), png_dpi_export::png_export::ExportError>(())
/// ```
pub fn decode(text: &str) -> Result<Vec<u8>, ExportError> {
    let symbols = text.as_bytes();
    let mut n = symbols.len();
    while n > 0 && symbols[n - 1] == PADDING {
        n -= 1;
    }

    let table = &*REVERSE_TABLE;
    let mut values = Vec::with_capacity(n);
    for (index, &symbol) in symbols[..n].iter().enumerate() {
        let value = table[symbol as usize];
        if value == INVALID {
            let character = text[index..].chars().next().unwrap_or(symbol as char);
            return Err(ExportError::InvalidCharacter { index, character });
        }
        values.push(value);
    }

    let out_len = n * 6 / 8;
    let mut out = Vec::with_capacity(out_len);
    for group in values.chunks(4) {
        let v0 = group[0];
        let v1 = group.get(1).copied().unwrap_or(0);
        let v2 = group.get(2).copied().unwrap_or(0);
        let v3 = group.get(3).copied().unwrap_or(0);

        for byte in [
            (v0 << 2) | (v1 >> 4),
            (v1 << 4) | (v2 >> 2),
            (v2 << 6) | v3,
        ] {
            if out.len() == out_len {
                break;
            }
            out.push(byte);
        }
    }
    Ok(out)
}
