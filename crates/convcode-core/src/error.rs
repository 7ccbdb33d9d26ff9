use std::fmt;

/// Errors returned by the coder engine and its configuration layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoderError {
    /// Constraint length `k` was outside the supported range 1..=16.
    InvalidConstraintLength { k: u8 },
    /// Number of generator polynomials was outside the supported range 1..=16.
    InvalidPolynomialCount { num_polys: usize },
    /// `start_state` was >= `num_states` for the configured constraint length.
    InvalidStartState { start_state: u32, num_states: u32 },
    /// The decoder would have advanced past the pre-allocated trellis.
    CapacityExceeded { ctrellis: usize, trellis_size: usize },
    /// The caller-supplied output sink returned a non-zero status.
    SinkAborted(i32),
    /// Interleaver grid parameters were degenerate (zero columns).
    InvalidInterleaveParams { interleave: usize },
    /// A block operation's bit count was not a multiple of `num_polys`.
    InvalidBlockLength { nbits: usize, num_polys: usize },
}

impl fmt::Display for CoderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoderError::InvalidConstraintLength { k } => {
                write!(f, "constraint length {k} out of range 1..=16")
            }
            CoderError::InvalidPolynomialCount { num_polys } => {
                write!(f, "polynomial count {num_polys} out of range 1..=16")
            }
            CoderError::InvalidStartState { start_state, num_states } => {
                write!(f, "start_state {start_state} >= num_states {num_states}")
            }
            CoderError::CapacityExceeded { ctrellis, trellis_size } => {
                write!(f, "decode step at {ctrellis} would exceed trellis capacity {trellis_size}")
            }
            CoderError::SinkAborted(code) => write!(f, "output sink aborted with status {code}"),
            CoderError::InvalidInterleaveParams { interleave } => {
                write!(f, "interleaver column count {interleave} must be >= 1")
            }
            CoderError::InvalidBlockLength { nbits, num_polys } => {
                write!(f, "block length {nbits} is not a multiple of num_polys {num_polys}")
            }
        }
    }
}

impl std::error::Error for CoderError {}
