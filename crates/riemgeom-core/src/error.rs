//! Error types for Riemannian manifold operations.
//!
//! This module defines the error taxonomy shared by every manifold and metric:
//! shape and broadcast errors, domain errors, numerical failures of the
//! linear-algebra backend and invalid parameter combinations.

use thiserror::Error;

/// Errors that can occur during manifold operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ManifoldError {
    /// Point is not on the manifold.
    ///
    /// This error occurs when a point fails to satisfy the manifold constraints
    /// within numerical tolerance.
    #[error("Point is not on the manifold: {reason}")]
    InvalidPoint {
        /// Description of why the point is invalid
        reason: String,
    },

    /// Vector is not in the tangent space.
    #[error("Vector is not in the tangent space: {reason}")]
    InvalidTangent {
        /// Description of why the tangent vector is invalid
        reason: String,
    },

    /// Dimension mismatch between arrays.
    ///
    /// This error occurs when an element of a batch does not have the shape
    /// the manifold expects.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions
        expected: String,
        /// Actual dimensions
        actual: String,
    },

    /// Two batched arguments cannot be broadcast against each other.
    ///
    /// Batch sizes must either agree or one of them must be 1.
    #[error("Cannot broadcast batch of size {left} against batch of size {right}")]
    BroadcastMismatch {
        /// Batch size of the first offending argument
        left: usize,
        /// Batch size of the second offending argument
        right: usize,
    },

    /// Numerical failure in the linear-algebra backend.
    ///
    /// Raised when an eigendecomposition does not converge, when a matrix is
    /// singular, or when a matrix function is evaluated outside its domain.
    #[error("Numerical instability detected: {reason}")]
    NumericalError {
        /// Description of the numerical issue
        reason: String,
    },

    /// Invalid parameter or parameter combination.
    #[error("Invalid parameter: {reason}")]
    InvalidParameter {
        /// Description of the offending parameter(s)
        reason: String,
    },
}

impl ManifoldError {
    /// Create an InvalidPoint error with a custom reason.
    pub fn invalid_point<S: Into<String>>(reason: S) -> Self {
        Self::InvalidPoint {
            reason: reason.into(),
        }
    }

    /// Create an InvalidTangent error with a custom reason.
    pub fn invalid_tangent<S: Into<String>>(reason: S) -> Self {
        Self::InvalidTangent {
            reason: reason.into(),
        }
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a BroadcastMismatch error.
    pub fn broadcast_mismatch(left: usize, right: usize) -> Self {
        Self::BroadcastMismatch { left, right }
    }

    /// Create a NumericalError with a custom reason.
    pub fn numerical_error<S: Into<String>>(reason: S) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter<S: Into<String>>(reason: S) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }
}

/// Result type alias for operations that can produce ManifoldError.
pub type Result<T> = std::result::Result<T, ManifoldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ManifoldError::invalid_point("determinant is negative");
        assert!(matches!(err, ManifoldError::InvalidPoint { .. }));
        assert_eq!(
            err.to_string(),
            "Point is not on the manifold: determinant is negative"
        );

        let err = ManifoldError::dimension_mismatch("(3, 3)", "(4, 4)");
        assert!(matches!(err, ManifoldError::DimensionMismatch { .. }));
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: expected (3, 3), got (4, 4)"
        );
    }

    #[test]
    fn test_broadcast_message_names_both_sizes() {
        let err = ManifoldError::broadcast_mismatch(4, 3);
        assert_eq!(
            err.to_string(),
            "Cannot broadcast batch of size 4 against batch of size 3"
        );
    }

    #[test]
    fn test_error_display() {
        let errors = vec![
            ManifoldError::invalid_point("not unit norm"),
            ManifoldError::invalid_tangent("not symmetric"),
            ManifoldError::dimension_mismatch("square matrix", "rectangular matrix"),
            ManifoldError::broadcast_mismatch(2, 5),
            ManifoldError::numerical_error("eigenvalue computation failed"),
            ManifoldError::invalid_parameter("power must be non-zero"),
        ];

        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }
}
