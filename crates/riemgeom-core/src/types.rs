//! Type definitions and aliases for vectorized Riemannian geometry.
//!
//! This module provides the scalar trait implemented by the numeric backends
//! (`f32` and `f64`), the dynamic matrix aliases and the element trait that batched
//! points and tangent vectors implement.

use nalgebra::{RealField, Scalar as NalgebraScalar};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

/// Trait for scalar types used by manifold operations (f32 or f64).
///
/// This trait combines all the necessary numeric traits required by the
/// linear-algebra backend and the geometric kernels.
pub trait Scalar:
    NalgebraScalar
    + RealField
    + Float
    + FromPrimitive
    + Display
    + Debug
    + Default
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Machine epsilon for this scalar type.
    const EPSILON: Self;

    /// Tolerance used by `belongs` membership tests.
    const BELONGS_TOLERANCE: Self;

    /// Relative gap below which two eigenvalues are treated as equal by
    /// divided-difference kernels.
    const EIGEN_GAP_TOLERANCE: Self;

    /// Threshold under which closed-form trigonometric coefficients are
    /// replaced by their Taylor expansions.
    const TAYLOR_THRESHOLD: Self;

    /// Maximum number of sweeps for symmetric eigendecompositions.
    const MAX_EIGEN_ITERATIONS: usize;

    /// Convert from f64 (for constants).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).expect("Failed to convert from f64")
    }

    /// Convert from usize (for averaging over batch or landmark counts).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn from_usize(v: usize) -> Self {
        <Self as FromPrimitive>::from_usize(v).expect("Failed to convert from usize")
    }
}

impl Scalar for f32 {
    const EPSILON: Self = f32::EPSILON;
    const BELONGS_TOLERANCE: Self = 1e-4;
    const EIGEN_GAP_TOLERANCE: Self = 1e-4;
    const TAYLOR_THRESHOLD: Self = 1e-3;
    const MAX_EIGEN_ITERATIONS: usize = 10_000;
}

impl Scalar for f64 {
    const EPSILON: Self = f64::EPSILON;
    const BELONGS_TOLERANCE: Self = 1e-6;
    const EIGEN_GAP_TOLERANCE: Self = 1e-8;
    const TAYLOR_THRESHOLD: Self = 1e-6;
    const MAX_EIGEN_ITERATIONS: usize = 10_000;
}

/// Type alias for a dynamically-sized matrix.
pub type DMatrix<T> = nalgebra::DMatrix<T>;

/// Type alias for a dynamically-sized vector.
pub type DVector<T> = nalgebra::DVector<T>;

/// Array element stored in a batch: a point or a tangent vector.
///
/// Geodesics scale tangent vectors by time values, and shape diagnostics need
/// the element shape; both vectors and matrices provide these.
pub trait PointArray<T: Scalar>: Clone + Debug + Send + Sync {
    /// Returns `factor * self`.
    fn scaled(&self, factor: T) -> Self;

    /// Returns the element shape as `(rows, cols)`.
    fn shape(&self) -> (usize, usize);

    /// Entries in column-major order.
    fn values(&self) -> &[T];
}

impl<T: Scalar> PointArray<T> for DVector<T> {
    fn scaled(&self, factor: T) -> Self {
        self.map(|x| x * factor)
    }

    fn shape(&self) -> (usize, usize) {
        (self.nrows(), 1)
    }

    fn values(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Scalar> PointArray<T> for DMatrix<T> {
    fn scaled(&self, factor: T) -> Self {
        self.map(|x| x * factor)
    }

    fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    fn values(&self) -> &[T] {
        self.as_slice()
    }
}
