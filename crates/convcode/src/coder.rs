//! Paired encoder/decoder handle sharing one set of code tables.

use std::sync::Arc;

use convcode_core::CoderError;

use crate::alloc::{StdAlloc, TableAlloc};
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::tables::CodeTables;

/// Owns a shared [`CodeTables`] plus an [`Encoder`] and, if a decode trellis
/// was requested, a [`Decoder`].
///
/// A freshly built `Coder` always has a usable encoder; the decoder is
/// optional since some callers only ever encode (and the trellis storage is
/// the more expensive of the two halves to allocate).
pub struct Coder {
    tables: Arc<CodeTables>,
    encoder: Encoder,
    decoder: Option<Decoder>,
}

impl Coder {
    /// Builds a `Coder` for constraint length `k` and the given generator
    /// polynomials. `max_decode_len_bits` sizes the decode trellis in input
    /// bits (0 disables decoding); `do_tail` selects tail-terminated framing
    /// for both halves; `recursive` selects a systematic recursive code.
    pub fn new(
        k: u8,
        polys: &[u32],
        max_decode_len_bits: usize,
        do_tail: bool,
        recursive: bool,
    ) -> Result<Self, CoderError> {
        Self::with_alloc(k, polys, max_decode_len_bits, do_tail, recursive, &StdAlloc)
    }

    /// As [`Coder::new`], but sourcing all backing storage from `alloc`.
    pub fn with_alloc(
        k: u8,
        polys: &[u32],
        max_decode_len_bits: usize,
        do_tail: bool,
        recursive: bool,
        alloc: &dyn TableAlloc,
    ) -> Result<Self, CoderError> {
        let tables = Arc::new(CodeTables::new(k, polys, recursive)?);
        let encoder = Encoder::new(Arc::clone(&tables), do_tail);

        let decoder = if max_decode_len_bits == 0 {
            None
        } else {
            let tail = if do_tail { (k.saturating_sub(1)) as usize } else { 0 };
            let trellis_size = max_decode_len_bits + tail;
            let trellis = alloc.alloc_trellis(trellis_size, tables.num_states);
            Some(Decoder::with_trellis(Arc::clone(&tables), do_tail, trellis))
        };

        Ok(Coder { tables, encoder, decoder })
    }

    pub fn encoder_mut(&mut self) -> &mut Encoder {
        &mut self.encoder
    }

    pub fn decoder_mut(&mut self) -> &mut Decoder {
        self.decoder.as_mut().expect("Coder built with max_decode_len_bits == 0 has no decoder")
    }

    pub fn has_decoder(&self) -> bool {
        self.decoder.is_some()
    }

    pub fn tables(&self) -> &Arc<CodeTables> {
        &self.tables
    }

    /// Resets both halves to `start_state` (the decoder's other-state bias
    /// defaults to `Metric::MAX / 2`, matching its constructor).
    pub fn reinit_both(&mut self, start_state: u32) -> Result<(), CoderError> {
        self.encoder.reinit(start_state)?;
        if let Some(decoder) = self.decoder.as_mut() {
            decoder.reinit(start_state, crate::decoder::Metric::MAX / 2)?;
        }
        Ok(())
    }

    /// Splits into independent, thread-movable halves. Both still share the
    /// same [`CodeTables`] through an `Arc`, so building the tables (the one
    /// genuinely shared, immutable resource) happens exactly once regardless
    /// of how the two halves are later distributed across threads.
    pub fn split(self) -> (Encoder, Option<Decoder>) {
        (self.encoder, self.decoder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_only_coder_has_no_decoder() {
        let coder = Coder::new(3, &[0b101, 0b111], 0, true, false).unwrap();
        assert!(!coder.has_decoder());
    }

    #[test]
    fn split_preserves_shared_tables() {
        let coder = Coder::new(3, &[0b101, 0b111], 32, true, false).unwrap();
        let (_encoder, decoder) = coder.split();
        assert!(decoder.is_some());
    }

    #[test]
    fn rejects_bad_start_state() {
        let mut coder = Coder::new(3, &[0b101, 0b111], 32, true, false).unwrap();
        assert!(coder.reinit_both(100).is_err());
    }
}
