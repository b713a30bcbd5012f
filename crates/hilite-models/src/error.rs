//! Validation errors for model construction.

use thiserror::Error;

/// Result type for model construction.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised when a record would violate its invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Highlight end ({end}) must be after start ({start})")]
    NonIncreasingRange { start: f64, end: f64 },

    #[error("Value for {field} must be finite and non-negative, got {value}")]
    InvalidValue { field: &'static str, value: f64 },
}
