//! # CRC-32 校验模块
//!
//! PNG 使用的 CRC-32（反射多项式 `0xEDB88320`），查表实现。
//! 查找表在首次调用时构建一次，之后只读共享，可安全地被并发调用方使用。

use once_cell::sync::Lazy;

const POLYNOMIAL: u32 = 0xEDB8_8320;

static CRC_TABLE: Lazy<[u32; 256]> = Lazy::new(|| {
    let mut table = [0u32; 256];
    for (n, entry) in table.iter_mut().enumerate() {
        let mut c = n as u32;
        for _ in 0..8 {
            c = if c & 1 == 1 { POLYNOMIAL ^ (c >> 1) } else { c >> 1 };
        }
        *entry = c;
    }
    table
});

/// 用 `bytes` 更新一个运行中的 CRC。
///
/// 初始值应为 `0xFFFFFFFF`，最终结果需再与 `0xFFFFFFFF` 异或（见 [`crc32`]）。
pub fn update_crc(crc: u32, bytes: &[u8]) -> u32 {
    let table = &*CRC_TABLE;
    bytes.iter().fold(crc, |crc, &byte| {
        table[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8)
    })
}

/// 计算 `buffer[start..start + length]` 的 CRC-32。
///
/// # Panics
/// 范围超出 `buffer` 时与切片索引一样 panic；调用方负责传入已校验的范围。
pub fn crc32(buffer: &[u8], start: usize, length: usize) -> u32 {
    update_crc(0xFFFF_FFFF, &buffer[start..start + length]) ^ 0xFFFF_FFFF
}
