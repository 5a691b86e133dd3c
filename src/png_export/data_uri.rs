//! # 数据 URI 适配模块
//!
//! 渲染端交给我们的是 `data:image/png;base64,<payload>` 文本，下载/剪贴板端也只接受同样的形式。
//! 前缀必须逐字节匹配；不匹配时原样返回并记录诊断日志。

use super::patcher::{PatchAction, PatchOutcome, apply_dpi};
use super::{ExportError, PatchStatus, base64};

pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

pub const PNG_MIME_TYPE: &str = "image/png";

/// 数据 URI 补丁结果；失败时 `data_uri` 即原输入。
#[derive(Debug, Clone)]
pub struct DataUriOutcome {
    pub data_uri: String,
    pub status: PatchStatus,
    pub action: Option<PatchAction>,
}

impl DataUriOutcome {
    pub(crate) fn unchanged(data_uri: String, status: PatchStatus) -> Self {
        Self {
            data_uri,
            status,
            action: None,
        }
    }

    /// 无论结果如何都重新编码补丁后的字节（输入本就是字节时使用）。
    pub(crate) fn encoded(outcome: PatchOutcome) -> Self {
        Self {
            data_uri: encode_png_data_uri(&outcome.bytes),
            status: outcome.status,
            action: outcome.action,
        }
    }

    /// 输入是数据 URI 时：写入成功才重新编码，否则逐字保留原文本。
    pub(crate) fn finish(original: String, outcome: PatchOutcome) -> Self {
        if outcome.is_patched() {
            Self::encoded(outcome)
        } else {
            Self::unchanged(original, outcome.status)
        }
    }

    pub fn is_patched(&self) -> bool {
        self.status == PatchStatus::Patched
    }
}

/// 前缀匹配时返回 Base64 负载部分。
pub fn strip_png_prefix(data_uri: &str) -> Option<&str> {
    data_uri.strip_prefix(PNG_DATA_URI_PREFIX)
}

pub fn encode_png_data_uri(png: &[u8]) -> String {
    let payload = base64::encode(png);
    let mut out = String::with_capacity(PNG_DATA_URI_PREFIX.len() + payload.len());
    out.push_str(PNG_DATA_URI_PREFIX);
    out.push_str(&payload);
    out
}

pub fn decode_png_data_uri(data_uri: &str) -> Result<Vec<u8>, ExportError> {
    let payload = strip_png_prefix(data_uri).ok_or(ExportError::NotPngDataUri)?;
    base64::decode(payload)
}

/// 解码待补丁的数据 URI；失败时给出对应状态并记录诊断日志。
pub(crate) fn decode_for_patch(data_uri: &str) -> Result<Vec<u8>, PatchStatus> {
    match decode_png_data_uri(data_uri) {
        Ok(png) => Ok(png),
        Err(ExportError::NotPngDataUri) => {
            log::warn!("🚫 无法更新 PNG 分辨率：数据不是 {} 格式", PNG_DATA_URI_PREFIX);
            Err(PatchStatus::NotPng)
        }
        Err(err) => {
            log::warn!("🚫 无法更新 PNG 分辨率：{}", err);
            Err(PatchStatus::InvalidCharacter)
        }
    }
}

/// 对数据 URI 形式的 PNG 写入分辨率信息。
pub fn apply_dpi_to_data_uri(data_uri: &str, dpr: f64) -> DataUriOutcome {
    match decode_for_patch(data_uri) {
        Ok(png) => DataUriOutcome::finish(data_uri.to_string(), apply_dpi(png, dpr)),
        Err(status) => DataUriOutcome::unchanged(data_uri.to_string(), status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::png_export::chunk::PNG_SIGNATURE;

    fn minimal_png() -> Vec<u8> {
        let mut png = PNG_SIGNATURE.to_vec();
        // IHDR 1x1 灰度
        png.extend_from_slice(&[
            0, 0, 0, 13, b'I', b'H', b'D', b'R', 0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0, 0x3A, 0x7E,
            0x9B, 0x55,
        ]);
        png.extend_from_slice(&[
            0, 0, 0, 10, b'I', b'D', b'A', b'T', 0x78, 0x9C, 0x63, 0x60, 0x00, 0x00, 0x00, 0x02,
            0x00, 0x01,
        ]);
        let idat_crc = crate::png_export::crc::crc32(&png, 37, 14);
        png.extend_from_slice(&idat_crc.to_be_bytes());
        png.extend_from_slice(&[0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]);
        png
    }

    #[test]
    fn prefix_must_match_exactly() {
        assert_eq!(strip_png_prefix("data:image/png;base64,AAAA"), Some("AAAA"));
        assert!(strip_png_prefix("data:image/jpeg;base64,AAAA").is_none());
        assert!(strip_png_prefix("DATA:image/png;base64,AAAA").is_none());
        assert!(strip_png_prefix(" data:image/png;base64,AAAA").is_none());
    }

    #[test]
    fn patches_data_uri() {
        let uri = encode_png_data_uri(&minimal_png());
        let outcome = apply_dpi_to_data_uri(&uri, 2.0);

        assert!(outcome.is_patched());
        assert!(outcome.data_uri.starts_with(PNG_DATA_URI_PREFIX));
        let bytes = decode_png_data_uri(&outcome.data_uri).expect("valid uri");
        assert_eq!(bytes.len(), minimal_png().len() + 21);
    }

    #[test]
    fn other_mime_type_is_returned_unchanged() {
        let uri = "data:image/svg+xml;base64,PHN2Zy8+";
        let outcome = apply_dpi_to_data_uri(uri, 2.0);
        assert_eq!(outcome.status, PatchStatus::NotPng);
        assert_eq!(outcome.data_uri, uri);
    }

    #[test]
    fn invalid_payload_is_returned_unchanged() {
        let uri = "data:image/png;base64,iVBO!!!!";
        let outcome = apply_dpi_to_data_uri(uri, 2.0);
        assert_eq!(outcome.status, PatchStatus::InvalidCharacter);
        assert_eq!(outcome.data_uri, uri);
    }

    #[test]
    fn non_png_payload_keeps_original_text() {
        // 非规范填充的原文也应逐字保留
        let uri = "data:image/png;base64,SGVsbG8===";
        let outcome = apply_dpi_to_data_uri(uri, 2.0);
        assert_eq!(outcome.status, PatchStatus::NotPng);
        assert_eq!(outcome.data_uri, uri);
    }

    #[test]
    fn strict_mapping_follows_status() {
        let uri = encode_png_data_uri(&minimal_png());
        assert!(apply_dpi_to_data_uri(&uri, 2.0).status.ensure_patched().is_ok());

        let err = apply_dpi_to_data_uri("data:image/gif;base64,R0lG", 2.0)
            .status
            .ensure_patched()
            .unwrap_err();
        assert!(matches!(err, ExportError::Unpatched(PatchStatus::NotPng)));
    }
}
