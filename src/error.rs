//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，命令行入口与设置/存储模块统一返回 `Result<T, AppError>`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ExportError` 与 `std::io::Error` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，便于写入 JSON 报告。

use serde::Serialize;

use crate::png_export::ExportError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 导出链路错误（解码 / 写入分辨率 / 写出）
    #[error("{0}")]
    Export(#[from] ExportError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 导出目录不可用
    #[error("存储目录不可用: {0}")]
    Storage(String),

    /// 设置文件读写失败
    #[error("设置错误: {0}")]
    Settings(String),
}

impl AppError {
    /// 稳定错误码，供 JSON 报告使用。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Export(err) => err.code(),
            Self::Io(_) => "io",
            Self::Storage(_) => "storage",
            Self::Settings(_) => "settings",
        }
    }
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
