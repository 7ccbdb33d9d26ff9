//! Convolutional encoding, Viterbi decoding and block bit interleaving for
//! forward-error-correction chains.
//!
//! The three pieces compose independently: [`interleave`]/[`deinterleave`]
//! operate on raw bit buffers with no knowledge of the code, and a
//! [`Coder`] built from a constraint length and generator polynomials hands
//! out an [`Encoder`] and (optionally) a [`Decoder`] sharing one set of
//! [`CodeTables`].

pub mod alloc;
pub mod coder;
pub mod decoder;
pub mod encoder;
pub mod interleaver;
pub mod tables;

pub use alloc::{StdAlloc, TableAlloc};
pub use coder::Coder;
pub use decoder::{DecodeBlockResult, Decoder, Metric};
pub use encoder::Encoder;
pub use interleaver::{deinterleave, interleave, InterleaverState};
pub use tables::CodeTables;

pub use convcode_core::CoderError;
