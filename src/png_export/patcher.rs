//! # pHYs 补丁模块
//!
//! ## 设计思路
//!
//! 输入是一段完整的 PNG 字节，输出同样是完整 PNG，只改动分辨率信息：
//! 1. 已有 pHYs：原地改写 8 字节密度字段并重算该块 CRC，长度不变
//! 2. 没有 pHYs：在第一个 IDAT 之前插入 21 字节的新 pHYs 块
//!
//! 其余字节保持原样。任何异常都原样返回输入，并通过状态与日志说明原因。
//!
//! ## 实现思路
//!
//! 先用只读扫描确定目标块（`ChunkDescriptor` 是 `Copy`），再拿回缓冲区所有权进行修改，
//! 避免扫描期间的借用与修改冲突。

use super::chunk::{
    ChunkDescriptor, ChunkScanner, ChunkType, PNG_SIGNATURE, PHYS_CHUNK_LEN, PhysicalResolution,
};
use super::PatchStatus;

/// 实际执行的写入动作。
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", content = "resolution", rename_all = "snake_case")]
pub enum PatchAction {
    /// 已有 pHYs 被原地改写。
    Updated(PhysicalResolution),
    /// 在第一个 IDAT 前插入了新的 pHYs。
    Inserted(PhysicalResolution),
}

impl PatchAction {
    pub fn resolution(&self) -> PhysicalResolution {
        match *self {
            Self::Updated(res) | Self::Inserted(res) => res,
        }
    }
}

/// 补丁结果：字节序列总是可用的 PNG（失败时即原输入）。
#[derive(Debug, Clone)]
pub struct PatchOutcome {
    pub bytes: Vec<u8>,
    pub status: PatchStatus,
    pub action: Option<PatchAction>,
}

impl PatchOutcome {
    fn unchanged(bytes: Vec<u8>, status: PatchStatus) -> Self {
        Self {
            bytes,
            status,
            action: None,
        }
    }

    fn patched(bytes: Vec<u8>, action: PatchAction) -> Self {
        Self {
            bytes,
            status: PatchStatus::Patched,
            action: Some(action),
        }
    }

    pub fn is_patched(&self) -> bool {
        self.status == PatchStatus::Patched
    }
}

enum Target {
    Existing(ChunkDescriptor),
    InsertBefore(usize),
}

/// 为 PNG 写入与 `dpr` 相符的 pHYs 分辨率信息。
///
/// # 示例
/// ```rust
/// use png_dpi_export::png_export::chunk::PNG_SIGNATURE;
/// use png_dpi_export::png_export::{PatchStatus, apply_dpi, crc32};
///
/// fn chunk(tag: &[u8; 4], data: &[u8]) -> Vec<u8> {
///     let mut out = (data.len() as u32).to_be_bytes().to_vec();
///     out.extend_from_slice(tag);
///     out.extend_from_slice(data);
///     let checksum = crc32(&out, 4, data.len() + 4);
///     out.extend_from_slice(&checksum.to_be_bytes());
///     out
/// }
///
/// let mut png = PNG_SIGNATURE.to_vec();
/// png.extend(chunk(b"IHDR", &[0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0]));
/// png.extend(chunk(b"IDAT", &[0x78, 0x9C, 0x63, 0x60, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01]));
/// png.extend(chunk(b"IEND", &[]));
/// let original_len = png.len();
///
/// let outcome = apply_dpi(png, 2.0);
/// assert_eq!(outcome.status, PatchStatus::Patched);
/// assert_eq!(outcome.bytes.len(), original_len + 21);
///
/// let unchanged = apply_dpi(b"GIF89a".to_vec(), 2.0);
/// assert_eq!(unchanged.status, PatchStatus::NotPng);
/// assert_eq!(unchanged.bytes, b"GIF89a");
/// ```
pub fn apply_dpi(png: Vec<u8>, dpr: f64) -> PatchOutcome {
    if !dpr.is_finite() || dpr <= 0.0 {
        log::warn!("🚫 设备像素比无效：{}", dpr);
        return PatchOutcome::unchanged(png, PatchStatus::InvalidRatio);
    }

    if !check_signature(&png) {
        return PatchOutcome::unchanged(png, PatchStatus::NotPng);
    }

    match find_target(&png) {
        Ok(Some(Target::Existing(chunk))) => update_in_place(png, chunk, dpr),
        Ok(Some(Target::InsertBefore(offset))) => insert_before(png, offset, dpr),
        Ok(None) => {
            log::warn!("🚫 PNG 中没有找到 pHYs 块，也没有 IDAT 可供插入");
            PatchOutcome::unchanged(png, PatchStatus::NoInsertionPoint)
        }
        Err(offset) => {
            log::warn!("🚫 PNG 块在偏移 {} 处越界，跳过分辨率写入", offset);
            PatchOutcome::unchanged(png, PatchStatus::Malformed)
        }
    }
}

fn check_signature(png: &[u8]) -> bool {
    for (index, &expected) in PNG_SIGNATURE.iter().enumerate() {
        match png.get(index) {
            Some(&actual) if actual == expected => {}
            Some(&actual) => {
                log::warn!(
                    "🚫 PNG 签名第 {} 字节为 {:#04x}，应为 {:#04x}",
                    index,
                    actual,
                    expected
                );
                return false;
            }
            None => {
                log::warn!("🚫 数据只有 {} 字节，不足以容纳 PNG 签名", png.len());
                return false;
            }
        }
    }
    true
}

/// pHYs 必须位于 IDAT 之前，因此按顺序遇到的第一个即为目标。
fn find_target(png: &[u8]) -> Result<Option<Target>, usize> {
    for item in ChunkScanner::new(png) {
        let chunk = item.map_err(|truncated| truncated.offset)?;
        match chunk.chunk_type {
            ChunkType::PhysicalDimensions => return Ok(Some(Target::Existing(chunk))),
            ChunkType::ImageData => return Ok(Some(Target::InsertBefore(chunk.byte_offset))),
            ChunkType::End => break,
            ChunkType::Header | ChunkType::Other(_) => {}
        }
    }
    Ok(None)
}

fn update_in_place(mut png: Vec<u8>, chunk: ChunkDescriptor, dpr: f64) -> PatchOutcome {
    let Some(current) = PhysicalResolution::read_from(chunk.data(&png)) else {
        log::warn!(
            "🚫 pHYs 数据区只有 {} 字节，无法读取分辨率",
            chunk.data_length
        );
        return PatchOutcome::unchanged(png, PatchStatus::Malformed);
    };

    if !current.is_meters() {
        log::warn!("🚫 无法识别的 PNG 像素单位：{}", current.unit);
        return PatchOutcome::unchanged(png, PatchStatus::UnsupportedUnit);
    }

    let updated = current.scaled(dpr);
    updated.write_into(&mut png[chunk.data_offset..chunk.crc_offset]);

    let checksum = chunk.computed_crc(&png);
    png[chunk.crc_offset..chunk.end_offset()].copy_from_slice(&checksum.to_be_bytes());

    log::debug!(
        "pHYs 已更新：{}x{} → {}x{} 像素/米",
        current.x_pixels_per_unit,
        current.y_pixels_per_unit,
        updated.x_pixels_per_unit,
        updated.y_pixels_per_unit
    );
    PatchOutcome::patched(png, PatchAction::Updated(updated))
}

fn insert_before(png: Vec<u8>, offset: usize, dpr: f64) -> PatchOutcome {
    let resolution = PhysicalResolution::from_device_pixel_ratio(dpr);

    let mut out = Vec::with_capacity(png.len() + PHYS_CHUNK_LEN);
    out.extend_from_slice(&png[..offset]);
    out.extend_from_slice(&resolution.to_chunk());
    out.extend_from_slice(&png[offset..]);

    log::debug!(
        "pHYs 已插入到偏移 {}：{} 像素/米",
        offset,
        resolution.x_pixels_per_unit
    );
    PatchOutcome::patched(out, PatchAction::Inserted(resolution))
}
