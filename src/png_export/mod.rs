//! # PNG 分辨率导出模块（png_export）
//!
//! ## 设计思路
//!
//! 高分屏截图按设备像素渲染，如果 PNG 里没有正确的 pHYs，下游查看器会把它按 72 DPI
//! 显示成 2 倍/3 倍大小。本模块负责在导出时补上这一信息：
//!
//! - `base64`：字节 ↔ Base64 文本（传输层是 `data:` URI）
//! - `crc`：PNG 使用的 CRC-32
//! - `chunk`：块类型、块位置描述、块扫描器、pHYs 数据区
//! - `patcher`：找到或插入 pHYs，改写密度并重算 CRC
//! - `data_uri`：`data:image/png;base64,` 前缀处理
//! - `config/error/source/sink`：配置、错误、输入模型与写出端
//! - `handler`：编排整条导出链路
//!
//! ## 新同事快速上手
//!
//! ```text
//! 数据 URI / PNG 字节 / 文件
//!    ↓
//! handler.rs（配置快照 + 阶段耗时日志）
//!    ├─ data_uri.rs → base64.rs（解码）
//!    ├─ patcher.rs → chunk.rs + crc.rs（写入 pHYs）
//!    └─ data_uri.rs → base64.rs（编码）
//!    ↓
//! sink.rs（下载 / 剪贴板 / 文件）
//! ```
//!
//! 补丁阶段永不中断调用方：失败时返回原图与非 `Patched` 状态，
//! 需要硬失败的调用方可开启严格模式。

pub mod base64;
pub mod chunk;
pub mod crc;
pub mod data_uri;
mod config;
mod error;
mod handler;
pub mod patcher;
mod sink;
mod source;

pub use chunk::{ChunkDescriptor, ChunkScanner, ChunkType, PhysicalResolution};
pub use config::ExportConfig;
pub use crc::crc32;
pub use data_uri::{
    DataUriOutcome, PNG_DATA_URI_PREFIX, apply_dpi_to_data_uri, decode_png_data_uri,
    encode_png_data_uri,
};
pub use error::{ExportError, PatchStatus};
pub use handler::{ExportReceipt, PngExporter};
pub use patcher::{PatchAction, PatchOutcome, apply_dpi};
pub use sink::{ExportSink, FileSink, SuggestedFile};
pub use source::ExportSource;
