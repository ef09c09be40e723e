//! riemgeom manifolds - concrete manifolds and their Riemannian metrics.
//!
//! This crate provides the hypersphere, Euclidean space, manifolds of
//! symmetric positive-definite matrices with a family of metrics, and
//! landmark spaces built on top of any of them. Every operation accepts a
//! [`Batch`](riemgeom_core::Batch) and broadcasts batches of length one.
//!
//! # Example
//!
//! ```rust
//! use riemgeom_core::prelude::*;
//! use riemgeom_manifolds::{SPDMatrices, SPDMetricLogEuclidean};
//!
//! let spd = SPDMatrices::<f64>::new(2)?;
//! let metric = SPDMetricLogEuclidean::new(2)?;
//! let base = Batch::single(DMatrix::identity(2, 2));
//! let point = Batch::single(DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 1.0]));
//!
//! assert!(spd.belongs(&point)[0]);
//! let dist = metric.dist(&base, &point)?;
//! assert!((dist[0] - 2.0_f64.ln()).abs() < 1e-12);
//! # Ok::<(), riemgeom_core::ManifoldError>(())
//! ```

pub mod euclidean;
pub mod hypersphere;
pub mod landmarks;
pub mod spd;
pub mod spd_affine;
pub mod spd_euclidean;
pub mod spd_log_euclidean;
pub mod spd_procrustes;
pub mod utils;

pub use euclidean::{Euclidean, EuclideanMetric};
pub use hypersphere::{Hypersphere, HypersphereMetric};
pub use landmarks::{L2Metric, LandmarksSpace};
pub use spd::SPDMatrices;
pub use spd_affine::SPDMetricAffine;
pub use spd_euclidean::SPDMetricEuclidean;
pub use spd_log_euclidean::SPDMetricLogEuclidean;
pub use spd_procrustes::SPDMetricProcrustes;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Euclidean, EuclideanMetric, Hypersphere, HypersphereMetric, L2Metric, LandmarksSpace,
        SPDMatrices, SPDMetricAffine, SPDMetricEuclidean, SPDMetricLogEuclidean,
        SPDMetricProcrustes,
    };
}
