//! # 配置模块
//!
//! ## 设计思路
//!
//! 将导出时的可调策略集中到 `ExportConfig`，可通过 JSON 持久化（见 `settings`）。
//! 所有字段都有默认值，缺失字段的旧配置文件可以直接读取。

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ExportError;

/// 导出配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// 默认设备像素比；调用方未显式给出时使用。
    pub device_pixel_ratio: f64,
    /// 严格模式：未能写入分辨率时视为失败，而不是导出原图。
    pub strict: bool,
    /// 导出目录；为空时使用 `storage` 的默认目录。
    pub output_dir: Option<PathBuf>,
    /// 建议文件名前缀，最终形如 `{prefix}_{timestamp}.png`。
    pub file_name_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            strict: false,
            output_dir: None,
            file_name_prefix: "export".to_string(),
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> Result<(), ExportError> {
        validate_device_pixel_ratio(self.device_pixel_ratio)?;

        let prefix = self.file_name_prefix.trim();
        if prefix.is_empty() {
            return Err(ExportError::InvalidConfig("文件名前缀不能为空".to_string()));
        }
        if prefix.contains(['/', '\\']) {
            return Err(ExportError::InvalidConfig(format!(
                "文件名前缀不能包含路径分隔符：{}",
                prefix
            )));
        }
        Ok(())
    }
}

pub(crate) fn validate_device_pixel_ratio(dpr: f64) -> Result<(), ExportError> {
    if dpr.is_finite() && dpr > 0.0 {
        Ok(())
    } else {
        Err(ExportError::InvalidConfig(format!(
            "设备像素比必须为正数：{}",
            dpr
        )))
    }
}
