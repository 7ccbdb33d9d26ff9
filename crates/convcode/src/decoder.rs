//! Viterbi (maximum-likelihood) decoder over the trellis built from
//! [`CodeTables`].

use std::sync::Arc;

use convcode_core::bitio::{get_bits, popcount, put_bit, BitAccumulator, BitCursor};
use convcode_core::CoderError;

use crate::tables::CodeTables;

/// Path metric type. Wide enough to hold `init_other_states` (up to
/// `u32::MAX / 2`) plus several symbols' worth of soft-distance accumulation
/// without overflow, matching the reference implementation's choice of a
/// type with headroom above the largest realistic initial bias.
pub type Metric = u32;

/// Result of [`Decoder::decode_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeBlockResult {
    pub num_errs: Metric,
    pub total_out_bits: usize,
}

/// The Viterbi decoder half of a [`crate::Coder`].
pub struct Decoder {
    tables: Arc<CodeTables>,
    do_tail: bool,
    uncertainty_100: u8,
    curr_path: Vec<Metric>,
    next_path: Vec<Metric>,
    /// `trellis[step][state]`: survivor predecessor state. During
    /// `finish`/`decode_finish`, column `trellis[step][0]` is repurposed to
    /// cache the traced-back playback bit, saving a second equal-sized
    /// buffer (see the design notes on trellis memory reuse).
    trellis: Vec<Vec<u32>>,
    trellis_size: usize,
    ctrellis: usize,
    leftover_bits: u32,
    leftover_count: u8,
    leftover_uncertainty: Vec<u8>,
}

impl Decoder {
    pub(crate) fn new(tables: Arc<CodeTables>, do_tail: bool, trellis_size: usize) -> Self {
        let num_states = tables.num_states;
        let trellis = vec![vec![0u32; num_states]; trellis_size];
        Self::with_trellis(tables, do_tail, trellis)
    }

    /// As [`Decoder::new`], but with the trellis storage supplied by the
    /// caller (see [`crate::alloc::TableAlloc`]).
    pub(crate) fn with_trellis(tables: Arc<CodeTables>, do_tail: bool, trellis: Vec<Vec<u32>>) -> Self {
        let num_states = tables.num_states;
        let trellis_size = trellis.len();
        let mut curr_path = vec![Metric::MAX / 2; num_states];
        if !curr_path.is_empty() {
            curr_path[0] = 0;
        }
        Decoder {
            tables,
            do_tail,
            uncertainty_100: 100,
            curr_path,
            next_path: vec![0; num_states],
            trellis,
            trellis_size,
            ctrellis: 0,
            leftover_bits: 0,
            leftover_count: 0,
            leftover_uncertainty: Vec::new(),
        }
    }

    /// Sets the value that represents "100% uncertain" in soft-decision
    /// inputs (default 100).
    pub fn set_max_uncertainty(&mut self, uncertainty_100: u8) {
        self.uncertainty_100 = uncertainty_100;
    }

    /// Resets the path metrics to favor `start_state`, biasing every other
    /// state's initial metric by `init_other_states`. Clears the trellis and
    /// leftover buffer. Fails if `start_state >= num_states`.
    pub fn reinit(&mut self, start_state: u32, init_other_states: Metric) -> Result<(), CoderError> {
        let num_states = self.tables.num_states;
        if start_state as usize >= num_states {
            return Err(CoderError::InvalidStartState { start_state, num_states: num_states as u32 });
        }
        for s in 0..num_states {
            self.curr_path[s] = if s as u32 == start_state { 0 } else { init_other_states };
        }
        self.ctrellis = 0;
        self.leftover_bits = 0;
        self.leftover_count = 0;
        self.leftover_uncertainty.clear();
        Ok(())
    }

    fn distance(&self, received: u32, expected: u32, u: Option<&[u8]>) -> Metric {
        match u {
            None => popcount(received ^ expected),
            Some(u) => {
                let mut total: Metric = 0;
                for j in 0..self.tables.num_polys {
                    let rbit = (received >> j) & 1;
                    let ebit = (expected >> j) & 1;
                    total += if rbit == ebit {
                        u[j] as Metric
                    } else {
                        self.uncertainty_100 as Metric - u[j] as Metric
                    };
                }
                total
            }
        }
    }

    /// Runs one trellis step on a complete `num_polys`-bit symbol, with an
    /// optional per-bit uncertainty window of the same width.
    fn step(&mut self, symbol: u32, u: Option<&[u8]>) -> Result<(), CoderError> {
        if self.ctrellis + self.tables.num_polys > self.trellis_size {
            return Err(CoderError::CapacityExceeded { ctrellis: self.ctrellis, trellis_size: self.trellis_size });
        }
        let num_states = self.tables.num_states;
        let top_bit = self.tables.top_state_bit();
        let recursive = self.tables.recursive;
        let ctrellis = self.ctrellis;

        for s in 0..num_states {
            let p0 = (s as u32) >> 1;
            let p1 = p0 | top_bit;

            let b0 = if !recursive { (s as u32) & 1 } else if self.tables.next[0][p0 as usize] == s as u32 { 0 } else { 1 };
            let b1 = if !recursive { (s as u32) & 1 } else if self.tables.next[0][p1 as usize] == s as u32 { 0 } else { 1 };

            let out0 = self.tables.out[b0 as usize][p0 as usize];
            let out1 = self.tables.out[b1 as usize][p1 as usize];

            let metric0 = self.curr_path[p0 as usize] + self.distance(symbol, out0, u);
            let metric1 = self.curr_path[p1 as usize] + self.distance(symbol, out1, u);

            if metric1 < metric0 {
                self.next_path[s] = metric1;
                self.trellis[ctrellis][s] = p1;
            } else {
                self.next_path[s] = metric0;
                self.trellis[ctrellis][s] = p0;
            }
        }

        std::mem::swap(&mut self.curr_path, &mut self.next_path);
        self.ctrellis += 1;
        Ok(())
    }

    fn transition_bit(&self, pstate: u32, cstate: u32) -> u8 {
        if !self.tables.recursive {
            (cstate & 1) as u8
        } else if self.tables.next[0][pstate as usize] == cstate {
            0
        } else {
            1
        }
    }

    /// Feeds `nbits` low-bit-first received bits (and, if soft-decoding,
    /// their per-bit uncertainties) into the decoder, buffering any trailing
    /// partial symbol until the next call.
    pub fn decode_stream(&mut self, bytes: &[u8], nbits: usize, uncertainty: Option<&[u8]>) -> Result<(), CoderError> {
        let num_polys = self.tables.num_polys;
        let mut cursor = BitCursor::new(bytes, nbits);
        let mut idx = 0usize;

        while let Some(bit) = cursor.next_bit() {
            self.leftover_bits |= (bit as u32) << self.leftover_count;
            if let Some(uu) = uncertainty {
                self.leftover_uncertainty.push(uu[idx]);
            }
            self.leftover_count += 1;
            idx += 1;

            if self.leftover_count as usize == num_polys {
                let symbol = self.leftover_bits;
                let sym_u = uncertainty.map(|_| std::mem::take(&mut self.leftover_uncertainty));
                self.step(symbol, sym_u.as_deref())?;
                self.leftover_bits = 0;
                self.leftover_count = 0;
            }
        }
        Ok(())
    }

    fn best_final_state(&self) -> (usize, Metric) {
        let mut best_state = 0usize;
        let mut min_val = self.curr_path[0];
        for s in 1..self.tables.num_states {
            if self.curr_path[s] < min_val {
                min_val = self.curr_path[s];
                best_state = s;
            }
        }
        (best_state, min_val)
    }

    /// Finds the maximum-likelihood final state, traces back through the
    /// trellis emitting decoded bits (byte-packed, low-bit-first) through
    /// `sink`, and reports the path metric (`num_errs`) and total decoded
    /// bit count.
    pub fn decode_finish(&mut self, mut sink: impl FnMut(u8, u8) -> i32) -> Result<(Metric, u64), CoderError> {
        let (best_state, min_val) = self.best_final_state();
        let mut cstate = best_state as u32;
        for t in (0..self.ctrellis).rev() {
            let pstate = self.trellis[t][cstate as usize];
            let bit = self.transition_bit(pstate, cstate);
            self.trellis[t][0] = bit as u32;
            cstate = pstate;
        }

        let tail = if self.do_tail { self.tables.k.saturating_sub(1) as usize } else { 0 };
        let total_bits = self.ctrellis.saturating_sub(tail);

        let mut acc = BitAccumulator::new_byte_mode();
        for t in 0..total_bits {
            let bit = self.trellis[t][0] as u8;
            acc.push_bit(bit, &mut sink)?;
        }
        let total_out_bits = acc.finish(&mut sink)?;
        Ok((min_val, total_out_bits))
    }

    /// Non-streaming variant: decodes `nbits` received bits (a multiple of
    /// `num_polys`) directly into `out` in natural bit order, optionally
    /// populating `out_uncertainty` with the cumulative path-metric
    /// uncertainty up to each output bit.
    pub fn decode_block(
        &mut self,
        bytes: &[u8],
        nbits: usize,
        uncertainty: Option<&[u8]>,
        out: &mut [u8],
        mut out_uncertainty: Option<&mut [Metric]>,
    ) -> Result<DecodeBlockResult, CoderError> {
        let num_polys = self.tables.num_polys;
        if nbits % num_polys != 0 {
            return Err(CoderError::InvalidBlockLength { nbits, num_polys });
        }
        let num_symbols = nbits / num_polys;
        for t in 0..num_symbols {
            let symbol = get_bits(bytes, t * num_polys, num_polys);
            let sym_u = uncertainty.map(|uu| &uu[t * num_polys..t * num_polys + num_polys]);
            self.step(symbol, sym_u)?;
        }

        let (best_state, min_val) = self.best_final_state();
        let mut cstate = best_state as u32;
        // steps[t] = (pstate, bit) for forward step t
        let mut steps = vec![(0u32, 0u8); self.ctrellis];
        for t in (0..self.ctrellis).rev() {
            let pstate = self.trellis[t][cstate as usize];
            let bit = self.transition_bit(pstate, cstate);
            steps[t] = (pstate, bit);
            cstate = pstate;
        }

        let tail = if self.do_tail { self.tables.k.saturating_sub(1) as usize } else { 0 };
        let total_bits = self.ctrellis.saturating_sub(tail);

        for t in 0..total_bits {
            put_bit(out, t, steps[t].1);
        }

        if let Some(ou) = out_uncertainty.as_deref_mut() {
            let mut acc: Metric = 0;
            for t in 0..total_bits {
                let (pstate, bit) = steps[t];
                let symbol = get_bits(bytes, t * num_polys, num_polys);
                let sym_u = uncertainty.map(|uu| &uu[t * num_polys..t * num_polys + num_polys]);
                let expected = self.tables.out[bit as usize][pstate as usize];
                let incr = self.distance(symbol, expected, sym_u);
                acc += incr;
                ou[t] = acc;
            }
        }

        Ok(DecodeBlockResult { num_errs: min_val, total_out_bits: total_bits })
    }

    pub fn ctrellis(&self) -> usize {
        self.ctrellis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Coder;

    #[test]
    fn decode_stream_matches_decode_block() {
        let mut enc = Coder::new(3, &[0b101, 0b111], 0, true, false).unwrap();
        let input = [0b1101_0110u8];
        let nbits = 8;
        let mut encoded = vec![0u8; 10];
        let total_bits = enc.encoder_mut().encode_block(&input, nbits, &mut encoded).unwrap();

        let mut dec_a = Coder::new(3, &[0b101, 0b111], 64, true, false).unwrap();
        let mut dec_b = Coder::new(3, &[0b101, 0b111], 64, true, false).unwrap();

        dec_a.decoder_mut().decode_stream(&encoded, total_bits, None).unwrap();
        let (errs_a, _) = dec_a.decoder_mut().decode_finish(|_, _| 0).unwrap();

        let mut out_b = vec![0u8; 4];
        let result = dec_b.decoder_mut().decode_block(&encoded, total_bits, None, &mut out_b, None).unwrap();

        assert_eq!(errs_a, result.num_errs);
        assert_eq!(errs_a, 0);
    }
}
