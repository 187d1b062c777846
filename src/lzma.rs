//! The LZMA core (spec.md §4.4, C4): the per-symbol loop, literal/match/rep
//! dispatch, and distance decoding. Grounded on `LZMADecoder`/`LiteralDecoder`
//! /`LiteralSubDecoder` in
//! `examples/other_examples/7f3061cd_..._lzma-rust2-0.13.0-.rs`, adapted so
//! the dictionary the decoder copies from is the caller's output slice
//! directly (see `dict.rs`) rather than the teacher's cyclic `LZDecoder`
//! buffer, since this crate never decodes more than one output buffer's
//! worth of dictionary.

use crate::dict::{self, CopyError};
use crate::probs::Probs;
use crate::range_decoder::{RangeDecoder, RcError};
use crate::state::State;
use crate::{ALIGN_BITS, DIST_MODEL_END, DIST_MODEL_START, DIST_STATES, MATCH_LEN_MIN, REPS};

/// Why the per-symbol loop stopped before reaching `out_limit` normally.
pub(crate) enum CoreError {
    /// The range coder needed a byte past `rc_limit`.
    RangeLimit,
    /// A decoded value broke an invariant (distance past the dictionary
    /// origin, for instance). Carries a static description for
    /// diagnostics.
    DataError(&'static str),
    /// A match copy would write past `out_limit`. Distinct from the
    /// ordinary "loop exits because `outcount >= out_limit`" case because
    /// it happens mid-copy, straddling the limit.
    OutOfSpace,
}

impl From<RcError> for CoreError {
    fn from(_: RcError) -> Self {
        CoreError::RangeLimit
    }
}

impl From<CopyError> for CoreError {
    fn from(e: CopyError) -> Self {
        match e {
            CopyError::DistanceTooLarge => {
                CoreError::DataError("match distance exceeds dictionary occupancy")
            }
            CopyError::OutOfSpace => CoreError::OutOfSpace,
        }
    }
}

pub(crate) struct LzmaState {
    pub(crate) probs: Probs,
    pub(crate) state: State,
    pub(crate) reps: [u32; REPS],
    pub(crate) lc: u32,
    pub(crate) lp: u32,
    pub(crate) pb: u32,
}

impl LzmaState {
    pub(crate) fn new() -> Self {
        LzmaState {
            probs: Probs::new(),
            state: State::new(),
            reps: [0; REPS],
            lc: 0,
            lp: 0,
            pb: 0,
        }
    }

    pub(crate) fn reset_state_and_probs(&mut self) {
        self.state = State::new();
        self.reps = [0; REPS];
        self.probs.reset();
    }

    pub(crate) fn set_props(&mut self, p: u8) -> Result<(), &'static str> {
        if p > 224 {
            return Err("LZMA properties byte exceeds the valid range (0..=224)");
        }
        let p = p as u32;
        let pb = p / 45;
        let lp = (p % 45) / 9;
        let lc = p % 9;
        if lc + lp > 4 {
            return Err("LZMA properties byte implies lc + lp > 4");
        }
        self.pb = pb;
        self.lp = lp;
        self.lc = lc;
        Ok(())
    }

    #[inline]
    fn pos_mask(&self) -> u32 {
        (1 << self.pb) - 1
    }

    #[inline]
    fn lp_mask(&self) -> u32 {
        (1 << self.lp) - 1
    }
}

/// Runs the per-symbol loop until `outcount >= out_limit` or an error.
/// `out_limit_is_outcap` tells [`CoreError::OutOfSpace`] apart from "the
/// chunk declared more output than it produced": when the output limit
/// was clamped by the caller's buffer rather than by the chunk's own
/// declared uncompressed size, running out mid-copy is legitimately
/// `OUTLIMIT`, not `DATA_ERROR` — the chunk driver (`lzma2.rs`) maps
/// `CoreError` into a `Status` using exactly that flag.
pub(crate) fn run(
    st: &mut LzmaState,
    rc: &mut RangeDecoder,
    input: &[u8],
    pos: &mut usize,
    rc_limit: usize,
    output: &mut [u8],
    outcount: &mut usize,
    dict_origin: usize,
    out_limit: usize,
) -> Result<(), CoreError> {
    loop {
        rc.renormalize(input, pos, rc_limit)?;
        if *outcount >= out_limit {
            return Ok(());
        }

        let pos_state = ((*outcount - dict_origin) as u32) & st.pos_mask();
        let state_idx = st.state.get();
        let bit = rc.decode_bit(
            &mut st.probs.is_match[state_idx][pos_state as usize],
            input,
            pos,
            rc_limit,
        )?;

        if bit == 0 {
            decode_literal(st, rc, input, pos, rc_limit, output, outcount, dict_origin)?;
            continue;
        }

        let len = if rc.decode_bit(&mut st.probs.is_rep[state_idx], input, pos, rc_limit)? == 0 {
            decode_match(st, rc, pos_state, input, pos, rc_limit)?
        } else {
            decode_rep_match(st, rc, pos_state, input, pos, rc_limit)?
        };

        dict::copy_match(output, outcount, dict_origin, out_limit, st.reps[0], len)?;
    }
}

fn decode_literal(
    st: &mut LzmaState,
    rc: &mut RangeDecoder,
    input: &[u8],
    pos: &mut usize,
    rc_limit: usize,
    output: &mut [u8],
    outcount: &mut usize,
    dict_origin: usize,
) -> Result<(), CoreError> {
    let rel = (*outcount - dict_origin) as u32;
    let prev = dict::prev_byte(output, *outcount, dict_origin) as u32;
    let coder_index = (prev >> (8 - st.lc)) | ((rel & st.lp_mask()) << st.lc);
    let probs = &mut st.probs.literal[coder_index as usize];

    let mut symbol: u32 = 1;
    if st.state.is_literal() {
        while symbol < 0x100 {
            let bit = rc.decode_bit(&mut probs[symbol as usize], input, pos, rc_limit)?;
            symbol = (symbol << 1) | bit;
        }
    } else {
        let dist = st.reps[0];
        if !dict::in_dictionary(*outcount, dict_origin, dist) {
            return Err(CoreError::DataError(
                "match-byte literal references before the dictionary origin",
            ));
        }
        let mut match_byte = dict::byte_back(output, *outcount, dist) as u32;
        let mut offset: u32 = 0x100;
        loop {
            match_byte <<= 1;
            let match_bit = match_byte & offset;
            let bit = rc.decode_bit(
                &mut probs[(offset + match_bit + symbol) as usize],
                input,
                pos,
                rc_limit,
            )?;
            symbol = (symbol << 1) | bit;
            offset &= 0u32.wrapping_sub(bit) ^ !match_bit;
            if symbol >= 0x100 {
                break;
            }
        }
    }

    output[*outcount] = symbol as u8;
    *outcount += 1;
    st.state.update_literal();
    Ok(())
}

fn decode_match(
    st: &mut LzmaState,
    rc: &mut RangeDecoder,
    pos_state: u32,
    input: &[u8],
    pos: &mut usize,
    rc_limit: usize,
) -> Result<u32, CoreError> {
    st.state.update_match();
    st.reps[3] = st.reps[2];
    st.reps[2] = st.reps[1];
    st.reps[1] = st.reps[0];

    let len = st
        .probs
        .match_len
        .decode(pos_state as usize, rc, input, pos, rc_limit)?;

    let slot_ctx = core::cmp::min(len - MATCH_LEN_MIN, (DIST_STATES as u32) - 1) as usize;
    let dist_slot = rc.decode_bit_tree(&mut st.probs.dist_slot[slot_ctx], input, pos, rc_limit)?;

    if dist_slot < DIST_MODEL_START {
        st.reps[0] = dist_slot;
    } else {
        let extra = (dist_slot >> 1) - 1;
        let base = (2 | (dist_slot & 1)) << extra;
        if dist_slot < DIST_MODEL_END {
            let bits = rc.decode_dist_special(
                &mut st.probs.dist_special,
                base,
                dist_slot,
                extra,
                input,
                pos,
                rc_limit,
            )?;
            st.reps[0] = base + bits;
        } else {
            let direct = rc.decode_direct_bits(extra - ALIGN_BITS, input, pos, rc_limit)?;
            let aligned =
                rc.decode_reverse_bit_tree(&mut st.probs.dist_align, ALIGN_BITS, input, pos, rc_limit)?;
            st.reps[0] = base + (direct << ALIGN_BITS) + aligned;
        }
    }

    Ok(len)
}

fn decode_rep_match(
    st: &mut LzmaState,
    rc: &mut RangeDecoder,
    pos_state: u32,
    input: &[u8],
    pos: &mut usize,
    rc_limit: usize,
) -> Result<u32, CoreError> {
    let s = st.state.get();
    if rc.decode_bit(&mut st.probs.is_rep0[s], input, pos, rc_limit)? == 0 {
        let s2 = st.state.get();
        if rc.decode_bit(
            &mut st.probs.is_rep0_long[s2][pos_state as usize],
            input,
            pos,
            rc_limit,
        )? == 0
        {
            st.state.update_short_rep();
            return Ok(1);
        }
    } else {
        let tmp;
        let s2 = st.state.get();
        if rc.decode_bit(&mut st.probs.is_rep1[s2], input, pos, rc_limit)? == 0 {
            tmp = st.reps[1];
        } else {
            if rc.decode_bit(&mut st.probs.is_rep2[s2], input, pos, rc_limit)? == 0 {
                tmp = st.reps[2];
            } else {
                tmp = st.reps[3];
                st.reps[3] = st.reps[2];
            }
            st.reps[2] = st.reps[1];
        }
        st.reps[1] = st.reps[0];
        st.reps[0] = tmp;
    }

    st.state.update_long_rep();
    Ok(st
        .probs
        .rep_len
        .decode(pos_state as usize, rc, input, pos, rc_limit)?)
}
