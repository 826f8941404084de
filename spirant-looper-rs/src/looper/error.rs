use core::fmt;

/// Errors raised while wiring the looper together.
///
/// The per-sample path never fails; these only come from construction and
/// from the control-surface helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LooperError {
    /// The backing sample storage has zero length.
    EmptyBuffer,
    /// Control index is out of bounds (must be < [`CONTROL_COUNT`](super::CONTROL_COUNT)).
    InvalidControlIndex,
}

impl fmt::Display for LooperError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LooperError::EmptyBuffer => write!(f, "sample buffer has zero capacity"),
            LooperError::InvalidControlIndex => write!(f, "invalid control index (must be 0-3)"),
        }
    }
}
