//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `PngExporter` 只负责流程编排与配置管理，处理链路固定为：
//! 1. 读取配置快照
//! 2. 按来源加载 PNG 字节或数据 URI
//! 3. 写入 pHYs 分辨率并重新编码为数据 URI
//! 4. 交给写出端（下载 / 剪贴板 / 文件）
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<ExportConfig>>` 支持运行时修改设备像素比。
//! - 单次请求内使用同一配置快照，避免处理中途配置漂移。
//! - 数据 URI 在加载阶段解码，补丁与 Base64 重新编码分开计时。
//! - 记录 `load/patch/encode/write/total` 阶段耗时，便于性能诊断。

use std::fs;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use chrono::Local;
use serde::Serialize;

use super::config::validate_device_pixel_ratio;
use super::data_uri::{DataUriOutcome, PNG_MIME_TYPE, decode_for_patch};
use super::patcher::{PatchAction, PatchOutcome, apply_dpi};
use super::sink::{ExportSink, SuggestedFile};
use super::{ExportConfig, ExportError, ExportSource, PatchStatus};

/// 一次导出的结果回执。
#[derive(Debug, Clone, Serialize)]
pub struct ExportReceipt {
    /// 写出端返回的位置描述。
    pub location: String,
    pub file: SuggestedFile,
    pub status: PatchStatus,
    pub action: Option<PatchAction>,
    /// 实际写入的 DPI；未写入时为空。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dots_per_inch: Option<f64>,
}

enum LoadedImage {
    Bytes(Vec<u8>),
    /// 已解码的数据 URI，保留原文以便失败时逐字返回。
    DataUri { text: String, png: Vec<u8> },
    /// 数据 URI 无法解码，直接按原文导出。
    Rejected { text: String, status: PatchStatus },
}

fn applied_dpi(action: Option<PatchAction>) -> Option<f64> {
    action.and_then(|a| a.resolution().dots_per_inch())
}

/// PNG 导出器。
pub struct PngExporter {
    config: Arc<RwLock<ExportConfig>>,
}

impl PngExporter {
    /// 根据初始配置创建导出器；配置无效时直接拒绝。
    ///
    /// # 示例
    /// ```rust
    /// use png_dpi_export::png_export::{ExportConfig, PngExporter};
    ///
    /// let exporter = PngExporter::new(ExportConfig::default())?;
    /// exporter.set_device_pixel_ratio(2.0)?;
    /// # Ok::<(), png_dpi_export::png_export::ExportError>(())
    /// ```
    pub fn new(config: ExportConfig) -> Result<Self, ExportError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
        })
    }

    /// 获取配置快照。
    pub fn config_snapshot(&self) -> Result<ExportConfig, ExportError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| ExportError::InvalidConfig("配置读取锁已中毒".to_string()))
    }

    pub fn set_device_pixel_ratio(&self, dpr: f64) -> Result<(), ExportError> {
        validate_device_pixel_ratio(dpr)?;
        let mut config = self
            .config
            .write()
            .map_err(|_| ExportError::InvalidConfig("配置写入锁已中毒".to_string()))?;
        config.device_pixel_ratio = dpr;
        log::info!("⚙️ 设备像素比已切换为 {}", dpr);
        Ok(())
    }

    pub fn set_strict(&self, strict: bool) -> Result<(), ExportError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| ExportError::InvalidConfig("配置写入锁已中毒".to_string()))?;
        config.strict = strict;
        Ok(())
    }

    /// 加载并写入分辨率，返回最终数据 URI。
    ///
    /// `dpr` 为空时使用配置中的默认值。非严格模式下，写入失败会得到原图的数据 URI。
    pub fn prepare(
        &self,
        source: ExportSource,
        dpr: Option<f64>,
    ) -> Result<DataUriOutcome, ExportError> {
        let config = self.config_snapshot()?;
        self.prepare_with_config(source, dpr, &config)
    }

    /// 完整导出：准备数据 URI 并交给写出端。
    pub fn export(
        &self,
        source: ExportSource,
        dpr: Option<f64>,
        sink: &dyn ExportSink,
    ) -> Result<ExportReceipt, ExportError> {
        let total_start = Instant::now();
        let config = self.config_snapshot()?;

        let outcome = self.prepare_with_config(source, dpr, &config)?;

        let write_start = Instant::now();
        let file = suggested_file(&config);
        let location = sink.deliver(&outcome.data_uri, &file)?;
        let write_elapsed = write_start.elapsed();

        log::info!(
            "✅ PNG 导出完成 - status={} write={}ms total={}ms",
            outcome.status.code(),
            write_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(ExportReceipt {
            location,
            file,
            status: outcome.status,
            action: outcome.action,
            dots_per_inch: applied_dpi(outcome.action),
        })
    }

    fn prepare_with_config(
        &self,
        source: ExportSource,
        dpr: Option<f64>,
        config: &ExportConfig,
    ) -> Result<DataUriOutcome, ExportError> {
        let dpr = dpr.unwrap_or(config.device_pixel_ratio);
        let hint = source.hint();

        let load_start = Instant::now();
        let loaded = Self::load(source)?;
        let load_elapsed = load_start.elapsed();

        let patch_start = Instant::now();
        let patched: Result<(PatchOutcome, Option<String>), DataUriOutcome> = match loaded {
            LoadedImage::Bytes(bytes) => Ok((apply_dpi(bytes, dpr), None)),
            LoadedImage::DataUri { text, png } => Ok((apply_dpi(png, dpr), Some(text))),
            LoadedImage::Rejected { text, status } => Err(DataUriOutcome::unchanged(text, status)),
        };
        let patch_elapsed = patch_start.elapsed();

        let encode_start = Instant::now();
        let outcome = match patched {
            Ok((patched, None)) => DataUriOutcome::encoded(patched),
            Ok((patched, Some(text))) => DataUriOutcome::finish(text, patched),
            Err(rejected) => rejected,
        };
        let encode_elapsed = encode_start.elapsed();

        let dpi = applied_dpi(outcome.action)
            .map(|dpi| format!("{:.1}", dpi))
            .unwrap_or_else(|| "-".to_string());
        log::info!(
            "📐 分辨率处理 source={} dpr={} dpi={} status={} load={}ms patch={}ms encode={}ms",
            hint,
            dpr,
            dpi,
            outcome.status.code(),
            load_elapsed.as_millis(),
            patch_elapsed.as_millis(),
            encode_elapsed.as_millis()
        );

        if config.strict {
            outcome.status.ensure_patched()?;
        } else if !outcome.is_patched() {
            log::warn!("⚠️ 未写入分辨率，按原图导出：{}", outcome.status);
        }
        Ok(outcome)
    }

    fn load(source: ExportSource) -> Result<LoadedImage, ExportError> {
        match source {
            ExportSource::Bytes(bytes) => Ok(LoadedImage::Bytes(bytes)),
            ExportSource::DataUri(text) => Ok(Self::decode_loaded(text)),
            ExportSource::FilePath(path) => {
                let bytes = fs::read(&path).map_err(|e| {
                    ExportError::FileSystem(format!("读取文件 '{}' 失败：{}", path.display(), e))
                })?;

                if !bytes.starts_with(b"data:") {
                    return Ok(LoadedImage::Bytes(bytes));
                }

                let text = String::from_utf8(bytes).map_err(|e| {
                    ExportError::FileSystem(format!(
                        "文件 '{}' 不是有效的 UTF-8 文本：{}",
                        path.display(),
                        e
                    ))
                })?;
                Ok(Self::decode_loaded(text.trim_end().to_string()))
            }
        }
    }

    fn decode_loaded(text: String) -> LoadedImage {
        match decode_for_patch(&text) {
            Ok(png) => LoadedImage::DataUri { text, png },
            Err(status) => LoadedImage::Rejected { text, status },
        }
    }
}

/// 生成建议文件名：`{prefix}_{时间戳}.png`。
fn suggested_file(config: &ExportConfig) -> SuggestedFile {
    let timestamp = Local::now().format("%Y%m%d%H%M%S%f");
    SuggestedFile {
        file_name: format!("{}_{}.png", config.file_name_prefix.trim(), timestamp),
        mime_type: PNG_MIME_TYPE,
    }
}
