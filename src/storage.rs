//! 导出目录管理模块
//!
//! # 设计思路
//!
//! 统一管理导出 PNG 的落盘目录，支持用户自定义目录，并在目录不存在时自动创建。
//!
//! # 实现思路
//!
//! - 优先使用配置中的自定义目录。
//! - 未设置时回退到当前工作目录下的 `exports` 子目录。
//! - 目录不存在时自动 `create_dir_all`，避免上层判断。

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

const DEFAULT_EXPORT_DIR: &str = "exports";

/// 获取导出目录
///
/// # 参数
/// * `custom_dir` - 用户自定义目录（可选）
///
/// # 返回
/// - `Ok(PathBuf)`：可用的导出目录
/// - `Err(AppError::Storage)`：无法获取或创建目录
pub fn get_export_dir(custom_dir: Option<&Path>) -> Result<PathBuf, AppError> {
    if let Some(dir) = custom_dir.filter(|d| !d.as_os_str().is_empty()) {
        ensure_dir(dir)?;
        return Ok(dir.to_path_buf());
    }

    let cwd = std::env::current_dir()
        .map_err(|e| AppError::Storage(format!("获取当前工作目录失败: {}", e)))?;
    let export_dir = cwd.join(DEFAULT_EXPORT_DIR);
    ensure_dir(&export_dir)?;
    Ok(export_dir)
}

fn ensure_dir(dir: &Path) -> Result<(), AppError> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| {
        AppError::Storage(format!("创建目录 '{}' 失败: {}", dir.display(), e))
    })
}
