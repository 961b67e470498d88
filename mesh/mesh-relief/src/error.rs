//! Error types for relief conversion.

use thiserror::Error;

/// Result type alias for relief operations.
pub type ReliefResult<T> = Result<T, ReliefError>;

/// Errors that can occur while turning a height field into an STL.
#[derive(Debug, Error)]
pub enum ReliefError {
    /// Input is not a rectangular 2D array.
    #[error("invalid height field shape: expected {expected}, got {got}")]
    InvalidShape {
        /// What the constructor required.
        expected: String,
        /// What it was given.
        got: String,
    },

    /// Input has no rows or no columns.
    #[error("height field is empty")]
    EmptyField,

    /// A height is NaN or infinite.
    #[error("height at row {row}, column {col} is not finite")]
    NonFiniteHeight {
        /// Row of the offending cell.
        row: usize,
        /// Column of the offending cell.
        col: usize,
    },

    /// Invalid conversion parameters.
    #[error("invalid conversion parameters: {0}")]
    InvalidParams(String),

    /// The native tessellator was explicitly requested but is not compiled in.
    #[error("native tessellator requested but the `native` feature is disabled")]
    NativeUnavailable,

    /// Writing the STL failed.
    #[error("STL output failed: {0}")]
    Io(#[from] mesh_io::IoError),
}

impl ReliefError {
    /// Create an invalid params error.
    #[must_use]
    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::InvalidParams(details.into())
    }

    /// Create an invalid shape error.
    #[must_use]
    pub fn invalid_shape(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::InvalidShape {
            expected: expected.into(),
            got: got.into(),
        }
    }
}
