//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 补丁本身永不失败：任何异常都只会“原样返回输入 + 非 `Patched` 状态”。
//! `PatchStatus` 描述这一结果；`ExportError` 则用于需要硬失败的调用方
//! （严格模式、数据 URI 解析、文件写入等）。

use std::fmt;

/// 一次补丁尝试的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchStatus {
    /// 已写入（原地更新或插入新块）。
    Patched,
    /// 签名不符，或数据 URI 前缀不是 PNG。
    NotPng,
    /// pHYs 单位不是“米”，不做修改。
    UnsupportedUnit,
    /// 扫描到结束仍未找到 pHYs 或 IDAT。
    NoInsertionPoint,
    /// Base64 负载包含非字母表字符。
    InvalidCharacter,
    /// 块框架越界，或 pHYs 数据区不足 9 字节。
    Malformed,
    /// 设备像素比不是有限正数。
    InvalidRatio,
}

impl PatchStatus {
    /// 稳定的状态码，供日志与报告使用。
    pub fn code(self) -> &'static str {
        match self {
            Self::Patched => "patched",
            Self::NotPng => "not_png",
            Self::UnsupportedUnit => "unsupported_unit",
            Self::NoInsertionPoint => "no_insertion_point",
            Self::InvalidCharacter => "invalid_character",
            Self::Malformed => "malformed",
            Self::InvalidRatio => "invalid_ratio",
        }
    }

    /// 严格模式下的统一映射：非 `Patched` 转为 `ExportError::Unpatched`。
    pub fn ensure_patched(self) -> Result<(), ExportError> {
        match self {
            Self::Patched => Ok(()),
            status => Err(ExportError::Unpatched(status)),
        }
    }
}

impl fmt::Display for PatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Patched => "已写入分辨率信息",
            Self::NotPng => "不是 PNG 数据",
            Self::UnsupportedUnit => "pHYs 使用了无法识别的单位",
            Self::NoInsertionPoint => "未找到 pHYs 或 IDAT 块",
            Self::InvalidCharacter => "Base64 数据包含非法字符",
            Self::Malformed => "PNG 块结构损坏",
            Self::InvalidRatio => "设备像素比无效",
        };
        f.write_str(text)
    }
}

/// 导出链路统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("格式错误：数据 URI 不是 data:image/png;base64, 开头")]
    NotPngDataUri,

    #[error("Base64 解码错误：位置 {index} 出现非法字符 {character:?}")]
    InvalidCharacter { index: usize, character: char },

    #[error("未写入分辨率：{0}")]
    Unpatched(PatchStatus),

    #[error("配置错误：{0}")]
    InvalidConfig(String),

    #[error("文件错误：{0}")]
    FileSystem(String),
}

impl ExportError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotPngDataUri => "not_png_data_uri",
            Self::InvalidCharacter { .. } => "invalid_character",
            Self::Unpatched(status) => status.code(),
            Self::InvalidConfig(_) => "invalid_config",
            Self::FileSystem(_) => "file_system",
        }
    }
}
