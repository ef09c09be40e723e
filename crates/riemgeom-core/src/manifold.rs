//! Core manifold traits.
//!
//! A manifold here is a stateless descriptor: dimension metadata, a membership
//! predicate and a sampler. It owns no mutable state and is safe to share
//! across threads.
//!
//! # Mathematical Background
//!
//! A Riemannian manifold (M, g) consists of:
//! - A smooth manifold M, represented as a subset of some array space
//! - A Riemannian metric g that assigns an inner product to each tangent space
//!
//! The metric lives in [`crate::metric`]; [`RiemannianManifold`] ties a
//! manifold to its default metric.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "test-utils")]
//! # fn main() -> riemgeom_core::Result<()> {
//! use rand::{rngs::StdRng, SeedableRng};
//! use riemgeom_core::prelude::*;
//! use riemgeom_core::test_manifolds::TestEuclideanManifold;
//!
//! let manifold = TestEuclideanManifold::<f64>::new(3);
//! let mut rng = StdRng::seed_from_u64(42);
//! let points = manifold.random_uniform(&mut rng, 5)?;
//! assert!(manifold.belongs(&points).iter().all(|&b| b));
//!
//! let d = manifold.metric().dist(&points, &points)?;
//! assert!(d.iter().all(|&x| x == 0.0));
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "test-utils"))]
//! # fn main() {}
//! ```

use crate::{
    batch::Batch,
    error::Result,
    metric::RiemannianMetric,
    types::{DVector, PointArray, Scalar},
};
use rand::Rng;
use std::fmt::Debug;

/// A manifold embedded in an array space.
///
/// # Type Parameters
///
/// - `T`: The scalar type (f32 or f64)
pub trait Manifold<T: Scalar>: Debug + Send + Sync {
    /// Array type of a single point (and of a single tangent vector).
    type Point: PointArray<T>;

    /// Human-readable name of the manifold.
    fn name(&self) -> &str;

    /// Intrinsic dimension of the manifold.
    fn dimension(&self) -> usize;

    /// Tolerance used by [`Manifold::belongs`].
    fn tolerance(&self) -> T {
        T::BELONGS_TOLERANCE
    }

    /// Checks whether a single point lies on the manifold.
    fn is_point_on_manifold(&self, point: &Self::Point, tolerance: T) -> bool;

    /// Membership test for every point of a batch.
    ///
    /// Returns an `(n_points, 1)` column of booleans. Points of the wrong
    /// shape do not belong.
    fn belongs(&self, points: &Batch<Self::Point>) -> DVector<bool> {
        let tolerance = self.tolerance();
        DVector::from_iterator(
            points.len(),
            points
                .iter()
                .map(|point| self.is_point_on_manifold(point, tolerance)),
        )
    }

    /// Samples `n_samples` points uniformly from a bounded region of the
    /// manifold.
    ///
    /// The generator is owned by the caller; seeding it makes sampling
    /// reproducible.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `n_samples` is zero.
    fn random_uniform<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n_samples: usize,
    ) -> Result<Batch<Self::Point>>;
}

/// A manifold equipped with a default Riemannian metric.
pub trait RiemannianManifold<T: Scalar>: Manifold<T> {
    /// The metric type.
    type Metric: RiemannianMetric<T, Point = Self::Point>;

    /// The manifold's metric.
    fn metric(&self) -> &Self::Metric;
}

/// Draws `n_samples` elements from `sample`, rejecting an empty request.
pub fn sample_batch<E, R, F>(rng: &mut R, n_samples: usize, mut sample: F) -> Result<Batch<E>>
where
    R: Rng + ?Sized,
    F: FnMut(&mut R) -> Result<E>,
{
    let elements = (0..n_samples)
        .map(|_| sample(rng))
        .collect::<Result<Vec<_>>>()?;
    Batch::new(elements)
}
