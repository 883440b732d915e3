use thiserror::Error;

/// Typed failures raised by the meshing operations.
///
/// Operations return `anyhow::Result` and wrap one of these variants,
/// so a caller can tell a cancellation apart from a failure with
/// `err.downcast_ref::<MeshingError>()`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshingError {
    /// Malformed input geometry or connectivity.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A numeric parameter outside of its allowed range.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A per-point array does not match the number of points.
    #[error("length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The progress callback requested to stop.
    #[error("operation cancelled")]
    Cancelled,
}

impl MeshingError {
    pub(crate) fn invalid_parameter<T: num_traits::ToPrimitive>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_f64().unwrap_or(f64::NAN),
            reason,
        }
    }
}

/// Returns true if the error chain carries a cancellation.
pub fn is_cancelled(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<MeshingError>(),
        Some(MeshingError::Cancelled)
    )
}
