//! Shared primitives for the convcode workspace.
//!
//! This crate provides the low-level bit I/O helpers and the error type used
//! by both the coder engine (`convcode`) and its configuration layer
//! (`convcode-config`).

/// Crate version, e.g. "0.1.0".
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod bitio;
pub mod error;

pub use bitio::{BitAccumulator, BitCursor};
pub use error::CoderError;
