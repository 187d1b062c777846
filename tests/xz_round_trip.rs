//! Round-trips full `.xz` files (stream header, one block, index, footer)
//! produced by `liblzma`'s easy encoder through [`unlzma2::xz::decode`].
//! Grounded the same way as `tests/round_trip.rs`, but here using
//! `Stream::new_easy_encoder` to keep the container liblzma normally
//! produces instead of the raw-filter payload.

use std::io::Read;

use liblzma::stream::{Check, Stream};

fn encode_xz(data: &[u8], preset: u32, check: Check) -> Vec<u8> {
    let stream = Stream::new_easy_encoder(preset, check).unwrap();
    let mut encoder = liblzma::read::XzEncoder::new_stream(data, stream);
    let mut compressed = Vec::new();
    encoder.read_to_end(&mut compressed).unwrap();
    compressed
}

fn highly_repetitive(len: usize) -> Vec<u8> {
    b"the quick brown fox jumps over the lazy dog. "
        .iter()
        .cycle()
        .take(len)
        .copied()
        .collect()
}

#[test]
fn round_trip_with_crc32_check() {
    let data = highly_repetitive(100_000);
    let compressed = encode_xz(&data, 6, Check::Crc32);
    let mut out = vec![0u8; data.len()];
    let outcome = unlzma2::xz::decode(&compressed, &mut out);
    assert_eq!(outcome.status, unlzma2::Status::Ok);
    assert_eq!(&out[..], &data[..]);
}

#[test]
fn round_trip_with_no_check() {
    let data = highly_repetitive(50_000);
    let compressed = encode_xz(&data, 6, Check::None);
    let mut out = vec![0u8; data.len()];
    let outcome = unlzma2::xz::decode(&compressed, &mut out);
    assert_eq!(outcome.status, unlzma2::Status::Ok);
    assert_eq!(&out[..], &data[..]);
}

#[test]
fn decode_requiring_crc32_accepts_a_crc32_stream() {
    let data = highly_repetitive(20_000);
    let compressed = encode_xz(&data, 6, Check::Crc32);
    let mut out = vec![0u8; data.len()];
    let outcome = unlzma2::xz::decode_requiring_crc32(&compressed, &mut out);
    assert_eq!(outcome.status, unlzma2::Status::Ok);
}

#[test]
fn decode_requiring_crc32_rejects_a_no_check_stream() {
    let data = highly_repetitive(20_000);
    let compressed = encode_xz(&data, 6, Check::None);
    let mut out = vec![0u8; data.len()];
    let outcome = unlzma2::xz::decode_requiring_crc32(&compressed, &mut out);
    assert!(matches!(outcome.status, unlzma2::Status::DataError { .. }));
}

#[test]
fn corrupted_payload_is_caught_by_crc32_even_when_the_lzma2_stream_stays_well_formed() {
    // Flip a byte that lands inside a literal run rather than near a
    // control byte, so the LZMA2 framing itself still parses cleanly and
    // only the CRC32 catches the corruption.
    let data = highly_repetitive(100_000);
    let mut compressed = encode_xz(&data, 0, Check::Crc32);
    let flip_at = compressed.len() / 2;
    compressed[flip_at] ^= 0x01;
    let mut out = vec![0u8; data.len()];
    let outcome = unlzma2::xz::decode(&compressed, &mut out);
    assert!(matches!(outcome.status, unlzma2::Status::DataError { .. }) || outcome.status == unlzma2::Status::InLimit);
}

#[test]
fn consumed_in_is_relative_to_the_original_envelope_not_the_stripped_payload() {
    // The payload handed to the inner decoder starts well after byte 0 of
    // the envelope (stream header + block header); `consumed_in` must be
    // translated back to a cursor over the original buffer `xz::decode`
    // was actually called with, not left relative to that sub-slice.
    let data = highly_repetitive(20_000);
    let compressed = encode_xz(&data, 6, Check::Crc32);
    let mut out = vec![0u8; data.len()];
    let outcome = unlzma2::xz::decode(&compressed, &mut out);
    assert_eq!(outcome.status, unlzma2::Status::Ok);
    assert!(outcome.consumed_in <= compressed.len());
    // The final consumed byte must be the LZMA2 end-of-stream control byte,
    // not some offset that only makes sense inside the stripped payload.
    assert_eq!(compressed[outcome.consumed_in - 1], 0x00);
    // A cursor that only accounted for the inner payload would undercount
    // by at least the stream + block header size (12 + block header).
    assert!(outcome.consumed_in > 12);
}

#[test]
fn rejects_truncated_footer() {
    let data = highly_repetitive(1_000);
    let compressed = encode_xz(&data, 6, Check::Crc32);
    let truncated = &compressed[..compressed.len() - 3];
    let mut out = vec![0u8; data.len()];
    let outcome = unlzma2::xz::decode(truncated, &mut out);
    assert!(matches!(outcome.status, unlzma2::Status::DataError { .. }));
}
