//! # PNG 分辨率导出工具：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │        渲染端（高分屏截图 / 矢量图栅格化，外部协作方）      │
//! │                PNG 字节 或 data:image/png;base64,...      │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↓            本库 (Rust)                           │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ png_export ─ 导出链路                                │
//! │  │   ├─ base64      Base64 编解码                        │
//! │  │   ├─ crc         PNG CRC-32                           │
//! │  │   ├─ chunk       块扫描 + pHYs 数据区                  │
//! │  │   ├─ patcher     原地改写 / 插入 pHYs                  │
//! │  │   └─ handler     编排 + 阶段耗时日志                   │
//! │  │                                                       │
//! │  ├─ settings         导出设置 JSON 持久化                 │
//! │  └─ storage          导出目录 (返回 Result)               │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓
//!   写出端（下载 / 剪贴板 / 文件，`ExportSink`）
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，命令行入口的返回类型 |
//! | [`png_export`] | Base64、CRC-32、PNG 块扫描与 pHYs 补丁、导出编排 |
//! | [`settings`] | `ExportConfig` 的读取与保存 |
//! | [`storage`] | 导出目录的获取与自动创建 |

pub mod error;
pub mod png_export;
pub mod settings;
pub mod storage;
