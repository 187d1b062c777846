//! Match/rep length decoder (spec.md §4.3): three cascading sub-models
//! (`low`, `mid`, `high`) selected by two `choice` bits, covering lengths
//! 2..273. `match_len` and `rep_len` are two independent instances of this
//! same shape (spec.md §3).

use crate::range_decoder::{RangeDecoder, RcError};
use crate::{HIGH_SYMBOLS, LOW_SYMBOLS, MATCH_LEN_MIN, MID_SYMBOLS, POS_STATES_MAX, PROB_INIT};

#[derive(Clone)]
pub(crate) struct LengthProbs {
    choice: [u16; 2],
    low: [[u16; LOW_SYMBOLS]; POS_STATES_MAX],
    mid: [[u16; MID_SYMBOLS]; POS_STATES_MAX],
    high: [u16; HIGH_SYMBOLS],
}

impl LengthProbs {
    pub(crate) fn new() -> Self {
        LengthProbs {
            choice: [PROB_INIT; 2],
            low: [[PROB_INIT; LOW_SYMBOLS]; POS_STATES_MAX],
            mid: [[PROB_INIT; MID_SYMBOLS]; POS_STATES_MAX],
            high: [PROB_INIT; HIGH_SYMBOLS],
        }
    }

    pub(crate) fn decode(
        &mut self,
        pos_state: usize,
        rc: &mut RangeDecoder,
        input: &[u8],
        pos: &mut usize,
        rc_limit: usize,
    ) -> Result<u32, RcError> {
        if rc.decode_bit(&mut self.choice[0], input, pos, rc_limit)? == 0 {
            let sym = rc.decode_bit_tree(&mut self.low[pos_state], input, pos, rc_limit)?;
            return Ok(sym + MATCH_LEN_MIN);
        }
        if rc.decode_bit(&mut self.choice[1], input, pos, rc_limit)? == 0 {
            let sym = rc.decode_bit_tree(&mut self.mid[pos_state], input, pos, rc_limit)?;
            return Ok(sym + MATCH_LEN_MIN + LOW_SYMBOLS as u32);
        }
        let sym = rc.decode_bit_tree(&mut self.high, input, pos, rc_limit)?;
        Ok(sym + MATCH_LEN_MIN + LOW_SYMBOLS as u32 + MID_SYMBOLS as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_length_probs_start_at_midpoint() {
        let l = LengthProbs::new();
        assert!(l.choice.iter().all(|&v| v == PROB_INIT));
        assert!(l.high.iter().all(|&v| v == PROB_INIT));
    }
}
