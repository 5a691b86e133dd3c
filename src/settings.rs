//! 导出设置持久化
//!
//! `ExportConfig` 以 JSON 保存；文件不存在时返回 `None`，由调用方使用默认配置。

use std::fs;
use std::path::Path;

use crate::error::AppError;
use crate::png_export::ExportConfig;

pub fn load_export_config(path: &Path) -> Result<Option<ExportConfig>, AppError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let parsed = serde_json::from_str::<ExportConfig>(&content)
        .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))?;
    parsed.validate()?;

    Ok(Some(parsed))
}

pub fn save_export_config(path: &Path, config: &ExportConfig) -> Result<(), AppError> {
    config.validate()?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Settings(format!("创建设置目录失败: {}", e)))?;
        }
    }

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| AppError::Settings(format!("序列化设置失败: {}", e)))?;

    fs::write(path, content)?;
    Ok(())
}
