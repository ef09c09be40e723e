//! Core traits and types for vectorized Riemannian geometry.
//!
//! This crate provides the foundational abstractions for manifolds and their
//! Riemannian metrics, with every operation working on batches of points.
//!
//! # Key Concepts
//!
//! - **Batches**: a single point is a batch of length one; batched arguments
//!   broadcast against each other (size 1 against size n)
//! - **Manifolds**: membership predicates and samplers over an array space
//! - **Riemannian Metrics**: inner products, exponential and logarithm maps,
//!   distances and geodesics
//! - **Geodesics**: immutable curves evaluated lazily at any sequence of times
//!
//! # Modules
//!
//! - [`batch`]: Batch container and broadcasting
//! - [`config`]: Batch parallelism configuration
//! - [`error`]: Error types for manifold operations
//! - [`geodesic`]: Geodesic curves
//! - [`linalg`]: Symmetric matrix functions and their differentials
//! - [`manifold`]: Core manifold traits
//! - [`metric`]: Riemannian metric trait
//! - [`types`]: Scalar trait and type aliases

pub mod batch;
pub mod config;
pub mod error;
pub mod geodesic;
pub mod linalg;
pub mod manifold;
pub mod metric;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub use utils::{test_manifolds, test_utils};

// Re-export commonly used items at the crate root
pub use batch::Batch;
pub use error::{ManifoldError, Result};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use riemgeom_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::batch::{broadcast_len, Batch};
    pub use crate::config::{ParallelConfig, ParallelConfigBuilder};
    pub use crate::error::{ManifoldError, Result};
    pub use crate::geodesic::Geodesic;
    pub use crate::manifold::{Manifold, RiemannianManifold};
    pub use crate::metric::RiemannianMetric;
    pub use crate::types::{DMatrix, DVector, PointArray, Scalar};
}
