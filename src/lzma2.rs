//! LZMA2 chunk driver (spec.md §4.5, C5) and public entry point (§4.6, C6).
//! Grounded on `Lzma2Reader::decode_chunk_header`/`decode_props`/`read_decode`
//! in `examples/ikrivosheev-lzma-rust2/src/lzma2_reader.rs`, rewritten from
//! that crate's incremental `Read`-based chunk loop into the one-shot
//! `(inbuf, outbuf) -> Outcome` contract this crate exposes — there is no
//! partial-chunk resumption across calls here (spec.md §1 Non-goals).

use crate::lzma::{self, CoreError, LzmaState};
use crate::range_decoder::RangeDecoder;
use crate::{
    Outcome, Status, CONTROL_END, CONTROL_LZMA_MIN, CONTROL_UNCOMPRESSED_NO_RESET,
    CONTROL_UNCOMPRESSED_RESET,
};

/// Decodes a raw LZMA2 stream (no XZ framing — see [`crate::xz::decode`] if
/// the input still carries that envelope). `input` is consumed starting at
/// offset 0; `output` is filled starting at offset 0. Always returns how
/// much of each buffer was actually touched, even on error.
pub fn decode(input: &[u8], output: &mut [u8]) -> Outcome {
    let insize = input.len();
    let outsize = output.len();

    let mut pos: usize = 0;
    let mut outcount: usize = 0;
    let mut dict_origin: usize = 0;
    let mut dict_established = false;
    let mut need_props = true;

    let mut rc = RangeDecoder::new();
    let mut lzma = LzmaState::new();

    macro_rules! done {
        ($status:expr) => {
            return Outcome {
                status: $status,
                consumed_in: pos,
                produced_out: outcount,
            }
        };
    }

    loop {
        if pos >= insize {
            done!(Status::InLimit);
        }
        let control = input[pos];
        pos += 1;

        match control {
            CONTROL_END => done!(Status::Ok),

            CONTROL_UNCOMPRESSED_RESET | CONTROL_UNCOMPRESSED_NO_RESET => {
                if control == CONTROL_UNCOMPRESSED_RESET {
                    dict_origin = outcount;
                    dict_established = true;
                    need_props = true;
                } else if !dict_established {
                    done!(Status::data_error(
                        "uncompressed chunk before any dictionary reset"
                    ));
                }

                if pos + 2 > insize {
                    done!(Status::InLimit);
                }
                let copy_len =
                    u16::from_be_bytes([input[pos], input[pos + 1]]) as usize + 1;
                pos += 2;

                let avail_in = insize - pos;
                let avail_out = outsize - outcount;
                let n = copy_len.min(avail_in).min(avail_out);
                output[outcount..outcount + n].copy_from_slice(&input[pos..pos + n]);
                pos += n;
                outcount += n;

                if n < copy_len {
                    if avail_in <= avail_out {
                        done!(Status::InLimit);
                    } else {
                        done!(Status::OutLimit);
                    }
                }
            }

            0x03..=0x7F => done!(Status::data_error("reserved LZMA2 control byte")),

            _ => {
                debug_assert!(control >= CONTROL_LZMA_MIN);
                let reset_bits = control & 0xE0;

                if pos + 4 > insize {
                    done!(Status::InLimit);
                }
                let unc_hi = (control & 0x1F) as u32;
                let unc_lo = u16::from_be_bytes([input[pos], input[pos + 1]]) as u32;
                let uncompressed_size = ((unc_hi << 16) | unc_lo) + 1;
                let compressed_size =
                    u16::from_be_bytes([input[pos + 2], input[pos + 3]]) as usize + 1;
                pos += 4;

                match reset_bits {
                    0x80 => {
                        if need_props {
                            done!(Status::data_error(
                                "LZMA chunk needs properties but none were set"
                            ));
                        }
                    }
                    0xA0 => {
                        if need_props {
                            done!(Status::data_error(
                                "LZMA chunk needs properties but none were set"
                            ));
                        }
                        lzma.reset_state_and_probs();
                    }
                    0xC0 | 0xE0 => {
                        lzma.reset_state_and_probs();
                        if reset_bits == 0xE0 {
                            dict_origin = outcount;
                            dict_established = true;
                        }
                        if pos >= insize {
                            done!(Status::InLimit);
                        }
                        let prop = input[pos];
                        pos += 1;
                        if let Err(reason) = lzma.set_props(prop) {
                            done!(Status::data_error(reason));
                        }
                        need_props = false;
                    }
                    _ => unreachable!("c & 0xE0 for c in 0x80..=0xFF is always one of the four above"),
                }

                if compressed_size < 5 {
                    done!(Status::data_error("LZMA chunk compressed size is below 5"));
                }
                if pos + 5 > insize {
                    done!(Status::InLimit);
                }

                let chunk_compressed_end = pos + compressed_size;
                let rc_limit_clamped_by_input = chunk_compressed_end > insize;
                let rc_limit = chunk_compressed_end.min(insize);

                let chunk_end = outcount + uncompressed_size as usize;
                let out_limit_is_outcap = chunk_end > outsize;
                let out_limit = chunk_end.min(outsize);

                // `pos + 5 <= insize` was just checked and `rc_limit >= pos
                // + 5` follows from `compressed_size >= 5`, so this cannot
                // fail; handled anyway since `RangeDecoder::init` is a
                // public-to-the-crate fallible operation.
                if rc.init(input, &mut pos, rc_limit).is_err() {
                    done!(Status::InLimit);
                }

                match lzma::run(
                    &mut lzma,
                    &mut rc,
                    input,
                    &mut pos,
                    rc_limit,
                    output,
                    &mut outcount,
                    dict_origin,
                    out_limit,
                ) {
                    Ok(()) => {
                        if out_limit_is_outcap {
                            done!(Status::OutLimit);
                        }
                        if pos != rc_limit {
                            done!(Status::data_error(
                                "LZMA chunk did not consume exactly its declared compressed size"
                            ));
                        }
                        // fall through to the next control byte.
                    }
                    Err(CoreError::RangeLimit) => {
                        if rc_limit_clamped_by_input {
                            done!(Status::InLimit);
                        } else {
                            done!(Status::data_error(
                                "LZMA chunk declared too few compressed bytes for its contents"
                            ));
                        }
                    }
                    Err(CoreError::OutOfSpace) => {
                        if out_limit_is_outcap {
                            done!(Status::OutLimit);
                        } else {
                            done!(Status::data_error(
                                "LZMA chunk produced more bytes than its declared uncompressed size"
                            ));
                        }
                    }
                    Err(CoreError::DataError(reason)) => {
                        done!(Status::data_error(reason));
                    }
                }
            }
        }
    }
}
