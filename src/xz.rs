//! XZ envelope stripper (spec.md §6.2): validates the stream header,
//! block header, index and footer of a single-block, single-filter XZ
//! file, trims it down to the raw LZMA2 payload, decodes that payload with
//! [`crate::decode`], and — when the stream declares a CRC32 check —
//! verifies it against the decoded output.
//!
//! Architecturally this is a sibling of the core decoder, not a layer
//! beneath it, mirroring how the teacher keeps `xz.rs`/`xz/reader.rs`
//! separate from `lzma2_reader.rs`: this module depends on nothing from
//! `crate::lzma2` beyond its public [`crate::decode`] entry point. Grounded
//! on the teacher's `ChecksumCalculator`/multi-byte integer helpers in
//! `examples/ikrivosheev-lzma-rust2/src/xz.rs`, reimplemented as a direct
//! one-shot slice parse (no `Read` chain) since this crate only ever
//! expects one block and one record.

use crate::{Outcome, Status};

const MAGIC: [u8; 6] = [0xFD, b'7', b'z', b'X', b'Z', 0x00];
const FOOTER_MAGIC: [u8; 2] = [b'Y', b'Z'];

const CRC32: crc::Crc<u32, crc::Table<16>> =
    crc::Crc::<u32, crc::Table<16>>::new(&crc::CRC_32_ISO_HDLC);

/// Strips the XZ container around `input` and decodes the single LZMA2
/// block inside it into `output`, matching spec.md §6.2's parse exactly
/// (single filter, single index record). Returns a [`Status::DataError`]
/// for anything that doesn't match that shape — multi-block or
/// multi-filter XZ files are outside this crate's scope.
pub fn decode(input: &[u8], output: &mut [u8]) -> Outcome {
    decode_impl(input, output, false)
}

/// As [`decode`], but also requires the envelope to declare a CRC32 check
/// (`test-unlzma2 -c`): an envelope with no check or a different check
/// type fails with [`Status::DataError`] rather than being decoded anyway.
pub fn decode_requiring_crc32(input: &[u8], output: &mut [u8]) -> Outcome {
    decode_impl(input, output, true)
}

fn decode_impl(input: &[u8], output: &mut [u8], require_crc: bool) -> Outcome {
    match strip(input) {
        Ok(env) => {
            if require_crc && env.check_type != CheckType::Crc32 {
                return Outcome {
                    status: Status::data_error("envelope does not declare a CRC32 check"),
                    consumed_in: 0,
                    produced_out: 0,
                };
            }
            let inner = crate::decode(env.payload, output);
            // `inner.consumed_in` is relative to `env.payload`, a sub-slice
            // of `input` starting at `payload_start` — translate it back to
            // a cursor over the original envelope before returning, so the
            // `Outcome` contract (lib.rs: `consumed_in` never exceeds the
            // input passed to *this* call) holds for XZ-wrapped input too.
            let o = Outcome {
                consumed_in: env.payload_start + inner.consumed_in,
                ..inner
            };
            if o.status != Status::Ok {
                return o;
            }
            if env.check_type == CheckType::Crc32 {
                match verify_crc32(input, env.check_field_start, &output[..o.produced_out]) {
                    Ok(()) => o,
                    Err(reason) => Outcome {
                        status: Status::data_error(reason),
                        ..o
                    },
                }
            } else {
                o
            }
        }
        Err(reason) => Outcome {
            status: Status::data_error(reason),
            consumed_in: 0,
            produced_out: 0,
        },
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CheckType {
    None,
    Crc32,
    Other,
}

struct Envelope<'a> {
    payload: &'a [u8],
    check_type: CheckType,
    /// Offset into `input` at which `payload` begins, so callers can
    /// translate the inner decoder's payload-relative `consumed_in` back
    /// into a cursor over the original envelope.
    payload_start: usize,
    /// Offset into `input` of the four-byte check field that immediately
    /// follows the LZMA2 payload.
    check_field_start: usize,
}

fn strip(input: &[u8]) -> Result<Envelope<'_>, &'static str> {
    if input.len() < 6 + 2 + 4 + 12 + 2 + 4 {
        return Err("input too short to contain an XZ stream");
    }
    if input[..6] != MAGIC {
        return Err("missing XZ stream magic");
    }

    let flags = [input[6], input[7]];
    let flags_crc = u32::from_le_bytes(input[8..12].try_into().unwrap());
    if CRC32.checksum(&flags) != flags_crc {
        return Err("stream header flags failed CRC32 check");
    }
    if flags[0] != 0x00 || flags[1] & 0xF0 != 0 {
        return Err("unsupported stream flags");
    }
    let check_type = match flags[1] & 0x0F {
        0x00 => CheckType::None,
        0x01 => CheckType::Crc32,
        _ => CheckType::Other,
    };

    // Block header.
    let block_header_start = 12;
    if input.len() < block_header_start + 8 {
        return Err("truncated block header");
    }
    let block_header_size_byte = input[block_header_start];
    if block_header_size_byte == 0 {
        return Err("block header size of zero is invalid");
    }
    let block_header_size = (block_header_size_byte as usize + 1) * 4;
    if input.len() < block_header_start + block_header_size {
        return Err("truncated block header");
    }
    let block_flags = input[block_header_start + 1];
    if block_flags & 0x03 != 0 {
        return Err("only single-filter blocks are supported");
    }
    let block_header_bytes = &input[block_header_start..block_header_start + block_header_size];
    let block_header_crc = u32::from_le_bytes(
        block_header_bytes[block_header_size - 4..]
            .try_into()
            .unwrap(),
    );
    if CRC32.checksum(&block_header_bytes[..block_header_size - 4]) != block_header_crc {
        return Err("block header failed CRC32 check");
    }

    // Footer: located by its magic at the very end of the stream.
    if input[input.len() - 2..] != FOOTER_MAGIC {
        return Err("missing XZ stream footer magic");
    }
    let footer_start = input.len() - 12;
    let footer_crc =
        u32::from_le_bytes(input[footer_start..footer_start + 4].try_into().unwrap());
    let backward_size = (u32::from_le_bytes(
        input[footer_start + 4..footer_start + 8].try_into().unwrap(),
    ) as u64
        + 1)
        * 4;
    let footer_flags = [input[footer_start + 8], input[footer_start + 9]];
    if footer_flags != flags {
        return Err("footer stream flags do not match header stream flags");
    }
    if CRC32.checksum(&input[footer_start + 4..footer_start + 10]) != footer_crc {
        return Err("stream footer failed CRC32 check");
    }

    // Index: backward_size bytes immediately before the footer.
    let index_start = footer_start
        .checked_sub(backward_size as usize)
        .ok_or("backward_size places the index before the start of the stream")?;
    if index_start < block_header_start + block_header_size {
        return Err("backward_size places the index inside the block");
    }
    let index_bytes = &input[index_start..footer_start];
    if index_bytes.len() < 8 {
        return Err("truncated index");
    }
    if index_bytes[0] != 0x00 {
        return Err("unexpected index indicator byte");
    }
    if index_bytes[1] != 0x01 {
        return Err("only single-record indexes are supported");
    }
    let index_crc =
        u32::from_le_bytes(index_bytes[index_bytes.len() - 4..].try_into().unwrap());
    if CRC32.checksum(&index_bytes[..index_bytes.len() - 4]) != index_crc {
        return Err("index failed CRC32 check");
    }

    let payload_start = block_header_start + block_header_size;
    let check_size = match check_type {
        CheckType::None => 0,
        CheckType::Crc32 => 4,
        CheckType::Other => return Err("unsupported check type"),
    };
    let check_field_start = index_start
        .checked_sub(check_size)
        .ok_or("check field does not fit before the index")?;

    if payload_start > check_field_start {
        return Err("block header size overruns the check field");
    }
    let payload = &input[payload_start..check_field_start];

    Ok(Envelope {
        payload,
        check_type,
        payload_start,
        check_field_start,
    })
}

fn verify_crc32(
    input: &[u8],
    check_field_start: usize,
    decoded: &[u8],
) -> Result<(), &'static str> {
    if input.len() < check_field_start + 4 {
        return Err("truncated CRC32 check field");
    }
    let expected = u32::from_le_bytes(
        input[check_field_start..check_field_start + 4]
            .try_into()
            .unwrap(),
    );
    if CRC32.checksum(decoded) != expected {
        return Err("decoded output failed the stream's CRC32 check");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_magic() {
        let input = [0u8; 32];
        let mut out = [0u8; 8];
        let o = decode(&input, &mut out);
        assert!(matches!(o.status, Status::DataError { .. }));
    }

    #[test]
    fn rejects_too_short_input() {
        let input = [0xFDu8, b'7', b'z'];
        let mut out = [0u8; 8];
        let o = decode(&input, &mut out);
        assert!(matches!(o.status, Status::DataError { .. }));
    }
}
