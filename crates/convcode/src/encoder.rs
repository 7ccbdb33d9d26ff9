//! Drives the encoder state machine over an input bitstream.

use std::sync::Arc;

use convcode_core::bitio::{get_bits, put_bits, BitAccumulator, BitCursor};
use convcode_core::CoderError;

use crate::tables::CodeTables;

/// The convolutional encoder half of a [`crate::Coder`].
///
/// Owns its own output accumulator and shift-register state, disjoint from
/// [`crate::decoder::Decoder`]'s state, so the two halves may be
/// [`crate::Coder::split`] onto separate threads sharing one [`CodeTables`].
pub struct Encoder {
    tables: Arc<CodeTables>,
    do_tail: bool,
    state: u32,
    acc: BitAccumulator,
}

impl Encoder {
    pub(crate) fn new(tables: Arc<CodeTables>, do_tail: bool) -> Self {
        Encoder { tables, do_tail, state: 0, acc: BitAccumulator::new_byte_mode() }
    }

    /// Switches the output accumulator between byte-packed (default) and
    /// symbol-packed (one sink call per `num_polys`-bit symbol).
    pub fn set_output_per_symbol(&mut self, per_symbol: bool) {
        self.acc = if per_symbol {
            BitAccumulator::new_symbol_mode(self.tables.num_polys as u8)
        } else {
            BitAccumulator::new_byte_mode()
        };
    }

    /// Resets the shift register to `start_state` and clears the output
    /// accumulator. Fails if `start_state >= num_states`.
    pub fn reinit(&mut self, start_state: u32) -> Result<(), CoderError> {
        if start_state as usize >= self.tables.num_states {
            return Err(CoderError::InvalidStartState {
                start_state,
                num_states: self.tables.num_states as u32,
            });
        }
        self.state = start_state;
        self.acc.reset();
        Ok(())
    }

    #[inline]
    fn step(&mut self, bit: u8) -> u32 {
        let b = (bit & 1) as usize;
        let out = self.tables.out[b][self.state as usize];
        self.state = self.tables.next[b][self.state as usize];
        out
    }

    /// Encodes `nbits` low-bit-first input bits from `bytes`, emitting one
    /// symbol per input bit through `sink`. A non-zero return from `sink`
    /// aborts the operation and is surfaced as [`CoderError::SinkAborted`].
    pub fn encode_stream(
        &mut self,
        bytes: &[u8],
        nbits: usize,
        mut sink: impl FnMut(u8, u8) -> i32,
    ) -> Result<(), CoderError> {
        let num_polys = self.tables.num_polys;
        let mut cursor = BitCursor::new(bytes, nbits);
        while let Some(bit) = cursor.next_bit() {
            let symbol = self.step(bit);
            for j in 0..num_polys {
                let b = ((symbol >> j) & 1) as u8;
                self.acc.push_bit(b, &mut sink)?;
            }
        }
        Ok(())
    }

    /// If `do_tail`, flushes `k-1` zero bits through the register; then
    /// flushes any partially-filled output byte. Returns the total number of
    /// output bits emitted since the last [`Encoder::reinit`].
    pub fn encode_finish(&mut self, mut sink: impl FnMut(u8, u8) -> i32) -> Result<u64, CoderError> {
        if self.do_tail {
            let num_polys = self.tables.num_polys;
            for _ in 0..self.tables.k.saturating_sub(1) {
                let symbol = self.step(0);
                for j in 0..num_polys {
                    let b = ((symbol >> j) & 1) as u8;
                    self.acc.push_bit(b, &mut sink)?;
                }
            }
        }
        self.acc.finish(&mut sink)
    }

    /// Non-streaming variant: encodes `nbits` input bits (plus the tail, if
    /// `do_tail`) directly into `out`, bit-packed low-bit-first regardless of
    /// the symbol-mode setting. `out` must be at least
    /// `(nbits + tail) * num_polys` bits long. Returns the number of bits
    /// written.
    pub fn encode_block(&mut self, bytes: &[u8], nbits: usize, out: &mut [u8]) -> Result<usize, CoderError> {
        let num_polys = self.tables.num_polys;
        let tail = if self.do_tail { self.tables.k.saturating_sub(1) as usize } else { 0 };
        let total_out_bits = (nbits + tail) * num_polys;
        debug_assert!(out.len() * 8 >= total_out_bits);

        let mut out_pos = 0usize;
        for i in 0..nbits {
            let bit = (get_bits(bytes, i, 1) & 1) as u8;
            let symbol = self.step(bit);
            put_bits(out, out_pos, num_polys, symbol);
            out_pos += num_polys;
        }
        for _ in 0..tail {
            let symbol = self.step(0);
            put_bits(out, out_pos, num_polys, symbol);
            out_pos += num_polys;
        }
        Ok(total_out_bits)
    }

    /// Current shift-register value.
    pub fn state(&self) -> u32 {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Coder;

    #[test]
    fn encode_stream_matches_encode_block() {
        let mut coder_a = Coder::new(3, &[0b101, 0b111], 64, true, false).unwrap();
        let mut coder_b = Coder::new(3, &[0b101, 0b111], 64, true, false).unwrap();

        let input = [0b1101_0110u8];
        let nbits = 8;

        let mut chunks = Vec::new();
        coder_a
            .encoder_mut()
            .encode_stream(&input, nbits, |byte, n| {
                chunks.push((byte, n));
                0
            })
            .unwrap();
        coder_a
            .encoder_mut()
            .encode_finish(|byte, n| {
                chunks.push((byte, n));
                0
            })
            .unwrap();

        let mut out = vec![0u8; 10];
        let total_bits = coder_b.encoder_mut().encode_block(&input, nbits, &mut out).unwrap();

        let mut stream_bits = Vec::new();
        for (byte, n) in &chunks {
            for i in 0..*n {
                stream_bits.push((byte >> i) & 1);
            }
        }
        let mut block_bits = Vec::new();
        for i in 0..total_bits {
            block_bits.push(get_bits(&out, i, 1) as u8);
        }
        assert_eq!(stream_bits, block_bits);
    }

    #[test]
    fn tail_adds_k_minus_1_symbols() {
        let mut coder = Coder::new(3, &[0b101, 0b111], 64, true, false).unwrap();
        let mut out = vec![0u8; 10];
        let nbits = 5;
        let total_bits = coder.encoder_mut().encode_block(&[0b10110u8], nbits, &mut out).unwrap();
        assert_eq!(total_bits, (nbits + 2) * 2);
    }

    #[test]
    fn symbol_mode_sink_sees_one_full_symbol_per_call() {
        let num_polys = 2;
        let mut coder = Coder::new(3, &[0b101, 0b111], 64, true, false).unwrap();
        coder.encoder_mut().set_output_per_symbol(true);

        let input = [0b1101_0110u8];
        let nbits = 8;
        let tail = 2;

        let mut calls = Vec::new();
        coder
            .encoder_mut()
            .encode_stream(&input, nbits, |byte, n| {
                calls.push((byte, n));
                0
            })
            .unwrap();
        coder
            .encoder_mut()
            .encode_finish(|byte, n| {
                calls.push((byte, n));
                0
            })
            .unwrap();

        assert_eq!(calls.len(), nbits + tail);
        for (_, n) in &calls {
            assert_eq!(*n as usize, num_polys);
        }
    }
}
