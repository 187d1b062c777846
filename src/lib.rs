//! A small, `no_std`, allocation-free decoder for the LZMA2 container format
//! (the compressed payload used inside XZ Utils and 7-Zip archives).
//!
//! The only entry point most callers need is [`decode`]: hand it a
//! compressed buffer and a destination buffer, get back how much of each was
//! used. There is no streaming/incremental mode and no encoder — see the
//! crate's `SPEC_FULL.md` for the full rationale. The dictionary a match can
//! reference *is* the caller's output buffer; nothing is allocated on the
//! heap and the working state (~28 KiB of probabilities plus a handful of
//! cursors) lives entirely on the stack for the duration of one [`decode`]
//! call.
//!
//! Enable the `xz` feature (on by default) for [`xz::decode`], which strips
//! the enclosing XZ stream framing (magic, block header, index, optional
//! CRC32 check) before handing the raw LZMA2 payload to [`decode`].

#![cfg_attr(not(feature = "std"), no_std)]

mod dict;
mod length;
mod lzma;
mod lzma2;
mod probs;
mod range_decoder;
mod state;

#[cfg(feature = "xz")]
pub mod xz;

pub use lzma2::decode;

/// Outcome of a [`decode`] call. See `spec.md` §7 for the full contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Clean end of stream, or the caller's output buffer was exactly
    /// filled at the same moment the stream legitimately ended.
    Ok,
    /// Reserved: this implementation performs no heap allocation and never
    /// produces this status. Kept so the status space matches the spec's
    /// five-variant contract.
    NoMemory,
    /// The compressed stream is malformed. `reason` is a short, static
    /// description for diagnostics (never user-controlled data).
    DataError { reason: &'static str },
    /// Input was exhausted before the stream said it should be: the range
    /// coder needed a byte past the chunk's declared compressed length, or
    /// a chunk header was truncated.
    InLimit,
    /// The caller's output buffer cannot hold the next byte, but the stream
    /// itself is consistent up to this point — retry with a bigger buffer.
    OutLimit,
}

impl Status {
    pub(crate) fn data_error(reason: &'static str) -> Self {
        Status::DataError { reason }
    }
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Status::Ok => write!(f, "ok"),
            Status::NoMemory => write!(f, "out of memory"),
            Status::DataError { reason } => write!(f, "corrupt LZMA2 stream: {reason}"),
            Status::InLimit => write!(f, "input exhausted before stream end"),
            Status::OutLimit => write!(f, "output buffer too small"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Status {}

/// Outcome of a [`decode`] call: the status plus how much of each buffer was
/// actually touched. `consumed_in` never exceeds the input length passed in,
/// and `produced_out` never exceeds the output length passed in, even when
/// `status` is not [`Status::Ok`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub status: Status,
    pub consumed_in: usize,
    pub produced_out: usize,
}

// LZMA constants (spec.md §3, §4). Named and sized exactly as spec.md lays
// them out; grounded in the equivalent constants of the teacher crate
// (`lzma-rust2`'s crate root, vendored at
// examples/other_examples/f3aed6ae_..._lzma-rust2-0.13.0-.rs).
pub(crate) const TOP_VALUE: u32 = 0x0100_0000;
pub(crate) const SHIFT_BITS: u32 = 8;
pub(crate) const BIT_MODEL_TOTAL_BITS: u32 = 11;
pub(crate) const BIT_MODEL_TOTAL: u16 = 1 << BIT_MODEL_TOTAL_BITS;
pub(crate) const PROB_INIT: u16 = BIT_MODEL_TOTAL / 2;
pub(crate) const MOVE_BITS: u32 = 5;

pub(crate) const POS_STATES_MAX: usize = 1 << 4;

pub(crate) const MATCH_LEN_MIN: u32 = 2;
pub(crate) const LOW_SYMBOLS: usize = 8;
pub(crate) const MID_SYMBOLS: usize = 8;
pub(crate) const HIGH_SYMBOLS: usize = 256;
pub(crate) const MATCH_LEN_MAX: u32 =
    MATCH_LEN_MIN + LOW_SYMBOLS as u32 + MID_SYMBOLS as u32 + HIGH_SYMBOLS as u32 - 1;

pub(crate) const DIST_STATES: usize = 4;
pub(crate) const DIST_SLOTS: usize = 1 << 6;
pub(crate) const DIST_MODEL_START: u32 = 4;
pub(crate) const DIST_MODEL_END: u32 = 14;
pub(crate) const DIST_SPECIAL_SIZE: usize = 128 - DIST_MODEL_END as usize;

pub(crate) const ALIGN_BITS: u32 = 4;
pub(crate) const ALIGN_SIZE: usize = 1 << ALIGN_BITS;

pub(crate) const REPS: usize = 4;
pub(crate) const LITERAL_CODER_SIZE: usize = 0x300;

/// LZMA2 control byte for "end of stream" (spec.md §4.5).
pub(crate) const CONTROL_END: u8 = 0x00;
pub(crate) const CONTROL_UNCOMPRESSED_RESET: u8 = 0x01;
pub(crate) const CONTROL_UNCOMPRESSED_NO_RESET: u8 = 0x02;
pub(crate) const CONTROL_LZMA_MIN: u8 = 0x80;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_is_human_readable() {
        assert_eq!(Status::Ok.to_string(), "ok");
        assert_eq!(
            Status::DataError {
                reason: "reserved control byte"
            }
            .to_string(),
            "corrupt LZMA2 stream: reserved control byte"
        );
    }

    #[test]
    fn match_len_max_is_273() {
        assert_eq!(MATCH_LEN_MAX, 273);
    }

    #[test]
    fn dist_special_size_is_114() {
        assert_eq!(DIST_SPECIAL_SIZE, 114);
    }
}
