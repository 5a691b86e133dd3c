//! # PNG 块扫描模块
//!
//! ## 设计思路
//!
//! PNG 在 8 字节签名之后是一串块：4 字节大端长度、4 字节类型、数据、4 字节 CRC。
//! 这里只解析块的“框架”，从不解压像素数据。
//!
//! ## 实现思路
//!
//! - `ChunkType` 由 4 个原始字节得到，按枚举分支匹配，而不是字符串比较。
//! - `ChunkDescriptor` 是每次扫描临时得到的位置描述，`Copy`，不持有缓冲区。
//! - `ChunkScanner` 迭代到 `IEND` 为止；块越界时产出一次错误后停止。

use std::fmt;

use super::crc;

/// PNG 文件签名。
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// 长度字段 + 类型字段 + CRC 尾部的固定开销。
pub const CHUNK_OVERHEAD: usize = 12;

/// pHYs 数据区长度：x(4) + y(4) + 单位(1)。
pub const PHYS_DATA_LEN: usize = 9;

/// 完整 pHYs 块长度（21 字节）。
pub const PHYS_CHUNK_LEN: usize = PHYS_DATA_LEN + CHUNK_OVERHEAD;

/// 单位说明符：1 表示“米”。
pub const UNIT_METER: u8 = 1;

const INCHES_PER_METER: f64 = 1.0 / 0.0254;
const CSS_DPI: f64 = 72.0;

/// 块类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkType {
    /// 头部块 `IHDR`。
    Header,
    /// 物理像素密度块 `pHYs`。
    PhysicalDimensions,
    /// 图像数据块 `IDAT`。
    ImageData,
    /// 结束标记 `IEND`。
    End,
    /// 其他任意块，原样保留标签。
    Other([u8; 4]),
}

impl ChunkType {
    pub fn from_tag(tag: [u8; 4]) -> Self {
        match &tag {
            b"IHDR" => Self::Header,
            b"pHYs" => Self::PhysicalDimensions,
            b"IDAT" => Self::ImageData,
            b"IEND" => Self::End,
            _ => Self::Other(tag),
        }
    }

    pub fn tag(self) -> [u8; 4] {
        match self {
            Self::Header => *b"IHDR",
            Self::PhysicalDimensions => *b"pHYs",
            Self::ImageData => *b"IDAT",
            Self::End => *b"IEND",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.tag();
        match std::str::from_utf8(&tag) {
            Ok(s) => f.write_str(s),
            Err(_) => write!(f, "{:02X?}", tag),
        }
    }
}

/// 单个块在缓冲区中的位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkDescriptor {
    /// 4 字节长度字段的位置。
    pub byte_offset: usize,
    pub data_length: u32,
    pub chunk_type: ChunkType,
    /// `byte_offset + 8`
    pub data_offset: usize,
    /// `data_offset + data_length`
    pub crc_offset: usize,
}

impl ChunkDescriptor {
    /// 类型字段位置，也是 CRC 覆盖范围的起点。
    pub fn type_offset(&self) -> usize {
        self.byte_offset + 4
    }

    /// CRC 覆盖的字节数：类型 + 数据。
    pub fn checksum_len(&self) -> usize {
        self.data_length as usize + 4
    }

    /// 下一个块的起始位置。
    pub fn end_offset(&self) -> usize {
        self.crc_offset + 4
    }

    pub fn data<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        &buffer[self.data_offset..self.crc_offset]
    }

    pub fn stored_crc(&self, buffer: &[u8]) -> u32 {
        read_u32_be(buffer, self.crc_offset)
    }

    pub fn computed_crc(&self, buffer: &[u8]) -> u32 {
        crc::crc32(buffer, self.type_offset(), self.checksum_len())
    }
}

/// 块框架越界：长度字段声明的范围超出了缓冲区。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncatedChunk {
    pub offset: usize,
}

/// 从签名之后开始逐块扫描。
pub struct ChunkScanner<'a> {
    buffer: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> ChunkScanner<'a> {
    /// 调用方需先确认签名；扫描从偏移 8 开始。
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            offset: PNG_SIGNATURE.len(),
            done: false,
        }
    }

    fn read_descriptor(&self) -> Result<ChunkDescriptor, TruncatedChunk> {
        let byte_offset = self.offset;
        let truncated = TruncatedChunk { offset: byte_offset };

        let header_end = byte_offset.checked_add(8).ok_or(truncated)?;
        if header_end > self.buffer.len() {
            return Err(truncated);
        }

        let data_length = read_u32_be(self.buffer, byte_offset);
        let mut tag = [0u8; 4];
        tag.copy_from_slice(&self.buffer[byte_offset + 4..header_end]);

        let crc_offset = header_end
            .checked_add(data_length as usize)
            .ok_or(truncated)?;
        if crc_offset.checked_add(4).is_none_or(|end| end > self.buffer.len()) {
            return Err(truncated);
        }

        Ok(ChunkDescriptor {
            byte_offset,
            data_length,
            chunk_type: ChunkType::from_tag(tag),
            data_offset: header_end,
            crc_offset,
        })
    }
}

impl Iterator for ChunkScanner<'_> {
    type Item = Result<ChunkDescriptor, TruncatedChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.buffer.len() {
            return None;
        }

        match self.read_descriptor() {
            Ok(chunk) => {
                self.offset = chunk.end_offset();
                self.done = chunk.chunk_type == ChunkType::End;
                Some(Ok(chunk))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// pHYs 数据区内容。
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PhysicalResolution {
    pub x_pixels_per_unit: u32,
    pub y_pixels_per_unit: u32,
    pub unit: u8,
}

impl PhysicalResolution {
    /// 以 72 DPI 为 1 倍基准，按设备像素比生成“每米像素数”。
    pub fn from_device_pixel_ratio(dpr: f64) -> Self {
        let ppm = scale_density(CSS_DPI * INCHES_PER_METER, dpr);
        Self {
            x_pixels_per_unit: ppm,
            y_pixels_per_unit: ppm,
            unit: UNIT_METER,
        }
    }

    /// 数据区不足 9 字节时返回 `None`。
    pub fn read_from(data: &[u8]) -> Option<Self> {
        if data.len() < PHYS_DATA_LEN {
            return None;
        }
        Some(Self {
            x_pixels_per_unit: read_u32_be(data, 0),
            y_pixels_per_unit: read_u32_be(data, 4),
            unit: data[8],
        })
    }

    pub fn write_into(&self, data: &mut [u8]) {
        write_u32_be(data, 0, self.x_pixels_per_unit);
        write_u32_be(data, 4, self.y_pixels_per_unit);
        data[8] = self.unit;
    }

    pub fn is_meters(&self) -> bool {
        self.unit == UNIT_METER
    }

    /// 两个方向的密度都乘以 `dpr`，四舍五入，超出 `u32` 时饱和。
    pub fn scaled(&self, dpr: f64) -> Self {
        Self {
            x_pixels_per_unit: scale_density(self.x_pixels_per_unit as f64, dpr),
            y_pixels_per_unit: scale_density(self.y_pixels_per_unit as f64, dpr),
            unit: self.unit,
        }
    }

    /// 单位为米时换算成 DPI（水平方向）。
    pub fn dots_per_inch(&self) -> Option<f64> {
        self.is_meters()
            .then(|| self.x_pixels_per_unit as f64 / INCHES_PER_METER)
    }

    /// 生成完整的 21 字节 pHYs 块（含长度、类型与 CRC）。
    pub fn to_chunk(&self) -> [u8; PHYS_CHUNK_LEN] {
        let mut chunk = [0u8; PHYS_CHUNK_LEN];
        write_u32_be(&mut chunk, 0, PHYS_DATA_LEN as u32);
        chunk[4..8].copy_from_slice(&ChunkType::PhysicalDimensions.tag());
        self.write_into(&mut chunk[8..8 + PHYS_DATA_LEN]);
        let checksum = crc::crc32(&chunk, 4, PHYS_DATA_LEN + 4);
        write_u32_be(&mut chunk, 8 + PHYS_DATA_LEN, checksum);
        chunk
    }
}

fn scale_density(value: f64, dpr: f64) -> u32 {
    // `as` 对 f64 → u32 饱和转换
    (value * dpr).round() as u32
}

pub(crate) fn read_u32_be(buffer: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buffer[offset..offset + 4]);
    u32::from_be_bytes(bytes)
}

pub(crate) fn write_u32_be(buffer: &mut [u8], offset: usize, value: u32) {
    buffer[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}
