// End-to-end checks for writing pHYs into real PNG files
use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageFormat, Rgba};
use png_dpi_export::png_export::{
    ChunkScanner, ChunkType, PNG_DATA_URI_PREFIX, PatchAction, PatchStatus, PhysicalResolution,
    apply_dpi, apply_dpi_to_data_uri, crc32, decode_png_data_uri, encode_png_data_uri,
};

const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

fn create_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        let r = (x % 255) as u8;
        let g = (y % 255) as u8;
        let b = ((x + y) % 255) as u8;
        Rgba([r, g, b, 255])
    });

    let dyn_img = DynamicImage::ImageRgba8(img);
    let mut cursor = Cursor::new(Vec::new());
    dyn_img
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("failed to encode test image");
    cursor.into_inner()
}

fn chunk(tag: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(tag);
    out.extend_from_slice(data);
    let checksum = crc32(&out, 4, data.len() + 4);
    out.extend_from_slice(&checksum.to_be_bytes());
    out
}

fn phys_payload(x: u32, y: u32, unit: u8) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&x.to_be_bytes());
    data.extend_from_slice(&y.to_be_bytes());
    data.push(unit);
    data
}

fn build_png(chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut out = SIGNATURE.to_vec();
    for c in chunks {
        out.extend_from_slice(c);
    }
    out
}

fn ihdr() -> Vec<u8> {
    chunk(b"IHDR", &[0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0])
}

fn idat() -> Vec<u8> {
    chunk(
        b"IDAT",
        &[0x78, 0x9C, 0x63, 0x60, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01],
    )
}

fn text_chunk() -> Vec<u8> {
    chunk(b"tEXt", b"Software\0png-dpi-export")
}

fn iend() -> Vec<u8> {
    chunk(b"IEND", &[])
}

fn phys_chunks(png: &[u8]) -> Vec<png_dpi_export::png_export::ChunkDescriptor> {
    ChunkScanner::new(png)
        .map(|c| c.expect("well formed png"))
        .filter(|c| c.chunk_type == ChunkType::PhysicalDimensions)
        .collect()
}

#[test]
fn minimal_png_gets_phys_inserted_before_idat() {
    let input = build_png(&[ihdr(), text_chunk(), idat(), iend()]);
    let idat_offset = 8 + ihdr().len() + text_chunk().len();

    let outcome = apply_dpi(input.clone(), 2.0);

    assert_eq!(outcome.status, PatchStatus::Patched);
    assert_eq!(outcome.bytes.len(), input.len() + 21);
    assert_eq!(&outcome.bytes[..idat_offset], &input[..idat_offset]);
    assert_eq!(&outcome.bytes[idat_offset + 21..], &input[idat_offset..]);

    let inserted = chunk(b"pHYs", &phys_payload(5669, 5669, 1));
    assert_eq!(&outcome.bytes[idat_offset..idat_offset + 21], inserted.as_slice());

    let types: Vec<_> = ChunkScanner::new(&outcome.bytes)
        .map(|c| c.expect("well formed").chunk_type)
        .collect();
    let phys_pos = types
        .iter()
        .position(|t| *t == ChunkType::PhysicalDimensions)
        .expect("phys present");
    assert_eq!(types[phys_pos + 1], ChunkType::ImageData);
}

#[test]
fn existing_phys_is_scaled_in_place() {
    let input = build_png(&[
        ihdr(),
        chunk(b"pHYs", &phys_payload(2835, 2835, 1)),
        idat(),
        iend(),
    ]);

    let outcome = apply_dpi(input.clone(), 3.0);

    assert_eq!(outcome.status, PatchStatus::Patched);
    assert_eq!(outcome.bytes.len(), input.len());

    let phys = phys_chunks(&outcome.bytes);
    assert_eq!(phys.len(), 1);
    let res = PhysicalResolution::read_from(phys[0].data(&outcome.bytes)).expect("payload");
    assert_eq!(res.x_pixels_per_unit, 8505);
    assert_eq!(res.y_pixels_per_unit, 8505);
    assert_eq!(res.unit, 1);
    assert_eq!(
        phys[0].stored_crc(&outcome.bytes),
        crc32(&outcome.bytes, phys[0].type_offset(), phys[0].checksum_len())
    );

    // 除 pHYs 的数据区与 CRC 外，其余字节保持不变
    let changed: Vec<usize> = input
        .iter()
        .zip(&outcome.bytes)
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(i, _)| i)
        .collect();
    assert!(changed
        .iter()
        .all(|&i| i >= phys[0].data_offset && i < phys[0].end_offset()));
}

#[test]
fn unknown_unit_leaves_bytes_identical() {
    let input = build_png(&[
        ihdr(),
        chunk(b"pHYs", &phys_payload(1, 1, 0)),
        idat(),
        iend(),
    ]);
    let outcome = apply_dpi(input.clone(), 2.0);
    assert_eq!(outcome.status, PatchStatus::UnsupportedUnit);
    assert_eq!(outcome.bytes, input);
}

#[test]
fn missing_signature_leaves_bytes_identical() {
    let mut input = build_png(&[ihdr(), idat(), iend()]);
    input[1] = b'Q';
    let outcome = apply_dpi(input.clone(), 2.0);
    assert_eq!(outcome.status, PatchStatus::NotPng);
    assert_eq!(outcome.bytes, input);
}

#[test]
fn second_patch_updates_instead_of_inserting() {
    let input = build_png(&[ihdr(), idat(), iend()]);
    let first = apply_dpi(input, 2.0);
    let second = apply_dpi(first.bytes.clone(), 2.0);

    assert_eq!(second.bytes.len(), first.bytes.len());
    assert_eq!(phys_chunks(&second.bytes).len(), 1);
    assert!(matches!(second.action, Some(PatchAction::Updated(_))));
    assert_eq!(
        second.action.map(|a| a.resolution().x_pixels_per_unit),
        Some(5669 * 2)
    );
}

#[test]
fn patched_encoder_output_still_decodes() {
    let input = create_png_bytes(64, 48);
    let had_phys = !phys_chunks(&input).is_empty();

    let outcome = apply_dpi(input.clone(), 2.0);
    assert!(outcome.is_patched());
    if !had_phys {
        assert_eq!(outcome.bytes.len(), input.len() + 21);
    }

    let phys = phys_chunks(&outcome.bytes);
    assert_eq!(phys.len(), 1);
    assert_eq!(
        phys[0].stored_crc(&outcome.bytes),
        phys[0].computed_crc(&outcome.bytes)
    );

    let original = image::load_from_memory(&input).expect("decode original");
    let patched = image::load_from_memory(&outcome.bytes).expect("decode patched");
    assert_eq!(patched.dimensions(), (64, 48));
    assert_eq!(patched.to_rgba8().into_raw(), original.to_rgba8().into_raw());
}

#[test]
fn every_chunk_checksum_is_valid_after_patch() {
    let outcome = apply_dpi(create_png_bytes(16, 16), 1.5);
    for c in ChunkScanner::new(&outcome.bytes) {
        let c = c.expect("well formed");
        assert_eq!(c.stored_crc(&outcome.bytes), c.computed_crc(&outcome.bytes), "{}", c.chunk_type);
    }
}

#[test]
fn data_uri_pipeline_matches_reference_base64() {
    let png = create_png_bytes(32, 32);
    let uri = format!(
        "{}{}",
        PNG_DATA_URI_PREFIX,
        general_purpose::STANDARD.encode(&png)
    );
    assert_eq!(encode_png_data_uri(&png), uri);

    let outcome = apply_dpi_to_data_uri(&uri, 2.0);
    assert_eq!(outcome.status, PatchStatus::Patched);

    let payload = outcome
        .data_uri
        .strip_prefix(PNG_DATA_URI_PREFIX)
        .expect("prefix kept");
    let reference = general_purpose::STANDARD
        .decode(payload)
        .expect("reference decoder accepts output");
    assert_eq!(reference, decode_png_data_uri(&outcome.data_uri).expect("decode"));
    assert!(image::load_from_memory(&reference).is_ok());
}

#[test]
fn data_uri_with_wrong_prefix_is_untouched() {
    let uri = format!(
        "data:image/webp;base64,{}",
        general_purpose::STANDARD.encode(create_png_bytes(4, 4))
    );
    let outcome = apply_dpi_to_data_uri(&uri, 2.0);
    assert_eq!(outcome.status, PatchStatus::NotPng);
    assert_eq!(outcome.data_uri, uri);
}
