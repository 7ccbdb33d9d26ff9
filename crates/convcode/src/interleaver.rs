//! Block bit interleaver/deinterleaver.
//!
//! Bits are conceptually written into a rectangular grid row-major (one row
//! per `cols`-bit group) and read back out column-major, scattering burst
//! errors across widely-separated output positions. The grid's last column
//! may be short (`last_full_col`) when `nbits` is not a multiple of `cols`.

use convcode_core::bitio::{get_bit, put_bit};
use convcode_core::CoderError;

/// Computes the number of full rows and the height of the grid's columns for
/// `nbits` bits spread across `cols` columns.
fn grid_shape(nbits: usize, cols: usize) -> (usize, usize, usize) {
    let rows = nbits / cols;
    let rem = nbits % cols;
    let full_rows = if rem == 0 { rows } else { rows + 1 };
    (rows, rem, full_rows)
}

/// Maps interleaved output bit index `out_idx` back to the row-major input
/// bit index it was read from, for a grid of `cols` columns holding `nbits`
/// bits total.
fn deinterleave_index(nbits: usize, cols: usize, out_idx: usize) -> usize {
    let (rows, rem, full_rows) = grid_shape(nbits, cols);
    let last_full_col = rem;

    // Columns before `last_full_col` have `full_rows` entries; the rest have
    // `rows` entries (the short columns, present only when rem > 0).
    let mut remaining = out_idx;
    let mut col = 0usize;
    loop {
        let col_height = if col < last_full_col || rem == 0 { full_rows } else { rows };
        if remaining < col_height {
            let row = remaining;
            return row * cols + col;
        }
        remaining -= col_height;
        col += 1;
    }
}

/// One-shot interleave: reads `nbits` bits from `input` (row-major, `cols`
/// columns) and writes them column-major into `output`. `cols` must be >= 1.
pub fn interleave(input: &[u8], nbits: usize, cols: usize, output: &mut [u8]) -> Result<(), CoderError> {
    if cols == 0 {
        return Err(CoderError::InvalidInterleaveParams { interleave: cols });
    }
    for out_idx in 0..nbits {
        let in_idx = deinterleave_index(nbits, cols, out_idx);
        let bit = get_bit(input, in_idx);
        put_bit(output, out_idx, bit);
    }
    Ok(())
}

/// Inverse of [`interleave`]: reads `nbits` bits from `input` (column-major)
/// and writes them row-major into `output`.
pub fn deinterleave(input: &[u8], nbits: usize, cols: usize, output: &mut [u8]) -> Result<(), CoderError> {
    if cols == 0 {
        return Err(CoderError::InvalidInterleaveParams { interleave: cols });
    }
    for out_idx in 0..nbits {
        let in_idx = deinterleave_index(nbits, cols, out_idx);
        let bit = get_bit(input, out_idx);
        put_bit(output, in_idx, bit);
    }
    Ok(())
}

/// Streaming interleaver cursor: walks one output bit index at a time so a
/// caller can interleave bits as they arrive rather than buffering a whole
/// block.
#[derive(Debug, Clone)]
pub struct InterleaverState {
    nbits: usize,
    cols: usize,
    out_idx: usize,
}

impl InterleaverState {
    pub fn new(nbits: usize, cols: usize) -> Result<Self, CoderError> {
        if cols == 0 {
            return Err(CoderError::InvalidInterleaveParams { interleave: cols });
        }
        Ok(InterleaverState { nbits, cols, out_idx: 0 })
    }

    /// Number of output bits not yet produced.
    pub fn remaining(&self) -> usize {
        self.nbits - self.out_idx
    }

    /// Returns the next source bit index (row-major) to read from the input
    /// buffer, advancing the cursor. `None` once the block is exhausted.
    pub fn next_source_index(&mut self) -> Option<usize> {
        if self.out_idx >= self.nbits {
            return None;
        }
        let idx = deinterleave_index(self.nbits, self.cols, self.out_idx);
        self.out_idx += 1;
        Some(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_columns() {
        let input = [0u8; 4];
        let mut output = [0u8; 4];
        assert!(interleave(&input, 16, 0, &mut output).is_err());
    }

    #[test]
    fn interleave_then_deinterleave_is_identity_exact_grid() {
        let input = [0b1011_0110u8, 0b0010_1101u8];
        let nbits = 16;
        let cols = 4;
        let mut woven = vec![0u8; 2];
        let mut back = vec![0u8; 2];
        interleave(&input, nbits, cols, &mut woven).unwrap();
        deinterleave(&woven, nbits, cols, &mut back).unwrap();
        assert_eq!(input, back.as_slice());
    }

    #[test]
    fn interleave_then_deinterleave_is_identity_ragged_grid() {
        let input = [0b1011_0110u8, 0b0000_0101u8];
        let nbits = 13;
        let cols = 4;
        let mut woven = vec![0u8; 2];
        let mut back = vec![0u8; 2];
        interleave(&input, nbits, cols, &mut woven).unwrap();
        deinterleave(&woven, nbits, cols, &mut back).unwrap();
        for i in 0..nbits {
            assert_eq!(get_bit(&input, i), get_bit(&back, i));
        }
    }

    #[test]
    fn single_column_is_identity() {
        let input = [0b1011_0110u8];
        let nbits = 8;
        let mut woven = vec![0u8; 1];
        interleave(&input, nbits, 1, &mut woven).unwrap();
        assert_eq!(input, woven.as_slice());
    }

    #[test]
    fn streaming_cursor_matches_one_shot() {
        let nbits = 13;
        let cols = 4;
        let mut cursor = InterleaverState::new(nbits, cols).unwrap();
        let mut indices = Vec::new();
        while let Some(idx) = cursor.next_source_index() {
            indices.push(idx);
        }
        let expected: Vec<usize> = (0..nbits).map(|i| deinterleave_index(nbits, cols, i)).collect();
        assert_eq!(indices, expected);
    }
}
