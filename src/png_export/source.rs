//! # 数据源模型
//!
//! 渲染端可能直接给出 PNG 字节，也可能给出 `data:` URI 文本或磁盘上的文件。

use std::path::PathBuf;

/// 导出输入来源。
#[derive(Debug, Clone)]
pub enum ExportSource {
    /// 完整 PNG 字节。
    Bytes(Vec<u8>),
    /// `data:image/png;base64,` 形式的文本。
    DataUri(String),
    /// 本地文件；内容以 `data:` 开头时按数据 URI 文本处理。
    FilePath(PathBuf),
}

impl ExportSource {
    /// 来源提示（用于日志）。
    pub(crate) fn hint(&self) -> &'static str {
        match self {
            Self::Bytes(_) => "bytes",
            Self::DataUri(_) => "data_uri",
            Self::FilePath(_) => "file",
        }
    }
}
