// Property checks for the base64 codec against the reference crate
use base64::{Engine as _, engine::general_purpose};
use png_dpi_export::png_export::base64 as codec;
use png_dpi_export::png_export::crc32;
use proptest::prelude::*;

proptest! {
    #[test]
    fn decode_inverts_encode(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let text = codec::encode(&bytes);
        prop_assert_eq!(text.len() % 4, 0);
        prop_assert_eq!(codec::decode(&text).expect("own output decodes"), bytes);
    }

    #[test]
    fn encode_matches_reference_engine(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        prop_assert_eq!(codec::encode(&bytes), general_purpose::STANDARD.encode(&bytes));
    }

    #[test]
    fn decode_accepts_reference_output_without_padding(
        bytes in proptest::collection::vec(any::<u8>(), 0..512)
    ) {
        let text = general_purpose::STANDARD_NO_PAD.encode(&bytes);
        prop_assert_eq!(codec::decode(&text).expect("unpadded decodes"), bytes);
    }

    #[test]
    fn crc_of_split_ranges_is_position_independent(
        prefix in proptest::collection::vec(any::<u8>(), 0..32),
        body in proptest::collection::vec(any::<u8>(), 0..128),
    ) {
        let mut buffer = prefix.clone();
        buffer.extend_from_slice(&body);
        prop_assert_eq!(
            crc32(&buffer, prefix.len(), body.len()),
            crc32(&body, 0, body.len())
        );
    }
}

#[test]
fn crc_known_answer() {
    assert_eq!(crc32(b"123456789", 0, 9), 0xCBF4_3926);
}
