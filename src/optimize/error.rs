//! Error types for optimization runs.

use thiserror::Error;

/// Result type for optimization operations.
pub type OptimizeResult<T> = Result<T, OptimizeError>;

/// Errors that can end a minimization early.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizeError {
    /// Initial point, bounds or options are unusable.
    #[error("invalid input: {context}")]
    InvalidInput { context: String },

    /// The objective produced no usable value.
    #[error("numerical failure: {message}")]
    NumericalError { message: String },
}
