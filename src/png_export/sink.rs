//! # 下载 / 剪贴板写出端
//!
//! ## 设计思路
//!
//! 真正的平台写入（保存对话框、系统剪贴板）不属于本库，抽象为 `ExportSink`：
//! 只接收最终的数据 URI 与建议的文件名 / MIME 类型。
//!
//! ## 实现思路
//!
//! 内置 `FileSink`，把数据 URI 解码后写入指定目录，供命令行与测试使用。

use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use super::ExportError;
use super::data_uri::decode_png_data_uri;

/// 建议的文件名与 MIME 类型。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestedFile {
    pub file_name: String,
    pub mime_type: &'static str,
}

/// 写出端：接收最终数据 URI，返回写入位置的描述。
pub trait ExportSink {
    fn deliver(&self, data_uri: &str, file: &SuggestedFile) -> Result<String, ExportError>;
}

/// 写入本地目录的写出端。
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ExportSink for FileSink {
    fn deliver(&self, data_uri: &str, file: &SuggestedFile) -> Result<String, ExportError> {
        let bytes = decode_png_data_uri(data_uri)?;
        let path = self.dir.join(&file.file_name);

        fs::write(&path, &bytes).map_err(|e| {
            ExportError::FileSystem(format!("写入文件 '{}' 失败：{}", path.display(), e))
        })?;

        log::info!("💾 已写入 {}（{} 字节）", path.display(), bytes.len());
        Ok(path.to_string_lossy().to_string())
    }
}
