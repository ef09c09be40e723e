//! # Landmark spaces M^k
//!
//! A landmark set is an ordered collection of `k` points on an ambient
//! manifold M, for example the vertices of a discretized curve on the sphere.
//! The space of landmark sets is the product manifold
//!
//! ```text
//! M^k = M × M × ... × M = {(x₁, ..., x_k) : xᵢ ∈ M}
//! ```
//!
//! A landmark set is stored as a `k × d` matrix with one landmark per row,
//! where `d` is the length of an ambient point.
//!
//! ## L2 metric
//!
//! The metric is the discretized L2 metric, i.e. the product metric averaged
//! over landmarks:
//!
//! ```text
//! g_x(u, v) = (1/k) Σᵢ g_{xᵢ}(uᵢ, vᵢ)
//! ```
//!
//! Geodesics are landmark-wise ambient geodesics, so `exp` and `log` apply the
//! ambient operation to each row and reassemble the matrix.
//!
//! ## Example
//!
//! ```rust
//! use riemgeom_core::prelude::*;
//! use riemgeom_manifolds::{Hypersphere, LandmarksSpace};
//!
//! let sphere = Hypersphere::<f64>::new(2)?;
//! let space = LandmarksSpace::new(sphere, 3)?;
//! let set = space.landmark_set(&Batch::new(vec![
//!     DVector::from_vec(vec![1.0, 0.0, 0.0]),
//!     DVector::from_vec(vec![0.0, 1.0, 0.0]),
//!     DVector::from_vec(vec![0.0, 0.0, 1.0]),
//! ])?)?;
//! assert!(space.belongs(&Batch::single(set))[0]);
//! # Ok::<(), riemgeom_core::ManifoldError>(())
//! ```

use std::marker::PhantomData;

use nalgebra::{DMatrix, DVector};
use rand::Rng;
use riemgeom_core::{
    batch::Batch,
    error::{ManifoldError, Result},
    manifold::{sample_batch, Manifold, RiemannianManifold},
    metric::RiemannianMetric,
    types::Scalar,
};
use tracing::trace;

use crate::utils::{row_vector, stack_rows};

fn check_landmark_count<T: Scalar>(matrix: &DMatrix<T>, n_landmarks: usize) -> Result<()> {
    if matrix.nrows() == n_landmarks {
        Ok(())
    } else {
        Err(ManifoldError::dimension_mismatch(
            format!("{n_landmarks} landmarks"),
            format!("{} landmarks", matrix.nrows()),
        ))
    }
}

/// Discretized L2 metric on landmark sets, lifted from an ambient metric.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct L2Metric<T, G> {
    ambient_metric: G,
    n_landmarks: usize,
    #[cfg_attr(feature = "serde", serde(skip))]
    _phantom: PhantomData<T>,
}

impl<T, G> L2Metric<T, G>
where
    T: Scalar,
    G: RiemannianMetric<T, Point = DVector<T>>,
{
    /// Lifts `ambient_metric` to sets of `n_landmarks` landmarks.
    pub fn new(ambient_metric: G, n_landmarks: usize) -> Result<Self> {
        if n_landmarks == 0 {
            return Err(ManifoldError::invalid_parameter(
                "a landmark set requires at least one landmark",
            ));
        }
        Ok(Self {
            ambient_metric,
            n_landmarks,
            _phantom: PhantomData,
        })
    }

    /// The metric of the ambient manifold.
    pub fn ambient_metric(&self) -> &G {
        &self.ambient_metric
    }

    /// Number of landmarks per set.
    pub fn n_landmarks(&self) -> usize {
        self.n_landmarks
    }

    fn check_counts(&self, matrices: &[&DMatrix<T>]) -> Result<()> {
        matrices
            .iter()
            .try_for_each(|m| check_landmark_count(m, self.n_landmarks))
    }

    /// Applies an ambient map landmark by landmark.
    fn map_landmarks<F>(&self, a: &DMatrix<T>, b: &DMatrix<T>, f: F) -> Result<DMatrix<T>>
    where
        F: Fn(&DVector<T>, &DVector<T>) -> Result<DVector<T>>,
    {
        self.check_counts(&[a, b])?;
        let rows = (0..self.n_landmarks)
            .map(|k| f(&row_vector(a, k), &row_vector(b, k)))
            .collect::<Result<Vec<_>>>()?;
        stack_rows(&rows)
    }

    fn mean_over_landmarks<F>(&self, f: F) -> Result<T>
    where
        F: Fn(usize) -> Result<T>,
    {
        let mut sum = T::zero();
        for k in 0..self.n_landmarks {
            sum += f(k)?;
        }
        Ok(sum / <T as Scalar>::from_usize(self.n_landmarks))
    }
}

impl<T, G> RiemannianMetric<T> for L2Metric<T, G>
where
    T: Scalar,
    G: RiemannianMetric<T, Point = DVector<T>>,
{
    type Point = DMatrix<T>;

    fn inner_product_at(
        &self,
        tangent_vec_a: &DMatrix<T>,
        tangent_vec_b: &DMatrix<T>,
        base_point: &DMatrix<T>,
    ) -> Result<T> {
        self.check_counts(&[tangent_vec_a, tangent_vec_b, base_point])?;
        self.mean_over_landmarks(|k| {
            self.ambient_metric.inner_product_at(
                &row_vector(tangent_vec_a, k),
                &row_vector(tangent_vec_b, k),
                &row_vector(base_point, k),
            )
        })
    }

    fn exp_at(&self, tangent_vec: &DMatrix<T>, base_point: &DMatrix<T>) -> Result<DMatrix<T>> {
        self.map_landmarks(tangent_vec, base_point, |v, p| {
            self.ambient_metric.exp_at(v, p)
        })
    }

    fn log_at(&self, point: &DMatrix<T>, base_point: &DMatrix<T>) -> Result<DMatrix<T>> {
        self.map_landmarks(point, base_point, |q, p| self.ambient_metric.log_at(q, p))
    }

    fn squared_dist_at(&self, point_a: &DMatrix<T>, point_b: &DMatrix<T>) -> Result<T> {
        self.check_counts(&[point_a, point_b])?;
        self.mean_over_landmarks(|k| {
            self.ambient_metric
                .squared_dist_at(&row_vector(point_a, k), &row_vector(point_b, k))
        })
    }
}

/// The space of sets of `n_landmarks` points on an ambient manifold.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "T: serde::Serialize, M: serde::Serialize, M::Metric: serde::Serialize",
        deserialize = "T: serde::Deserialize<'de>, M: serde::Deserialize<'de>, M::Metric: serde::Deserialize<'de>"
    ))
)]
pub struct LandmarksSpace<T, M>
where
    T: Scalar,
    M: RiemannianManifold<T, Point = DVector<T>>,
{
    ambient_manifold: M,
    n_landmarks: usize,
    metric: L2Metric<T, M::Metric>,
}

impl<T, M> Clone for LandmarksSpace<T, M>
where
    T: Scalar,
    M: RiemannianManifold<T, Point = DVector<T>> + Clone,
    M::Metric: Clone,
{
    fn clone(&self) -> Self {
        Self {
            ambient_manifold: self.ambient_manifold.clone(),
            n_landmarks: self.n_landmarks,
            metric: self.metric.clone(),
        }
    }
}

impl<T, M> LandmarksSpace<T, M>
where
    T: Scalar,
    M: RiemannianManifold<T, Point = DVector<T>>,
    M::Metric: Clone,
{
    /// Creates the space of `n_landmarks` landmarks on `ambient_manifold`.
    ///
    /// # Errors
    /// `InvalidParameter` if `n_landmarks` is zero.
    pub fn new(ambient_manifold: M, n_landmarks: usize) -> Result<Self> {
        let metric = L2Metric::new(ambient_manifold.metric().clone(), n_landmarks)?;
        Ok(Self {
            ambient_manifold,
            n_landmarks,
            metric,
        })
    }
}

impl<T, M> LandmarksSpace<T, M>
where
    T: Scalar,
    M: RiemannianManifold<T, Point = DVector<T>>,
{
    /// The manifold each landmark lives on.
    pub fn ambient_manifold(&self) -> &M {
        &self.ambient_manifold
    }

    /// Number of landmarks per set.
    pub fn n_landmarks(&self) -> usize {
        self.n_landmarks
    }

    /// The L2 metric lifted from the ambient manifold's metric.
    pub fn l2_metric(&self) -> &L2Metric<T, M::Metric> {
        &self.metric
    }

    /// Stacks a sequence of ambient points into one landmark set.
    ///
    /// # Errors
    /// `DimensionMismatch` if the sequence does not hold exactly
    /// `n_landmarks` points of a common length.
    pub fn landmark_set(&self, points: &Batch<DVector<T>>) -> Result<DMatrix<T>> {
        if points.len() != self.n_landmarks {
            return Err(ManifoldError::dimension_mismatch(
                format!("{} landmarks", self.n_landmarks),
                format!("{} landmarks", points.len()),
            ));
        }
        stack_rows(points.as_slice())
    }
}

impl<T, M> Manifold<T> for LandmarksSpace<T, M>
where
    T: Scalar,
    M: RiemannianManifold<T, Point = DVector<T>>,
{
    type Point = DMatrix<T>;

    fn name(&self) -> &str {
        "Landmarks"
    }

    fn dimension(&self) -> usize {
        self.n_landmarks * self.ambient_manifold.dimension()
    }

    fn tolerance(&self) -> T {
        self.ambient_manifold.tolerance()
    }

    fn is_point_on_manifold(&self, point: &DMatrix<T>, tolerance: T) -> bool {
        point.nrows() == self.n_landmarks
            && (0..self.n_landmarks).all(|k| {
                self.ambient_manifold
                    .is_point_on_manifold(&row_vector(point, k), tolerance)
            })
    }

    fn random_uniform<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n_samples: usize,
    ) -> Result<Batch<DMatrix<T>>> {
        trace!(
            n_samples,
            n_landmarks = self.n_landmarks,
            "sampling landmark sets"
        );
        sample_batch(rng, n_samples, |rng| {
            let landmarks = self.ambient_manifold.random_uniform(rng, self.n_landmarks)?;
            stack_rows(landmarks.as_slice())
        })
    }
}

impl<T, M> RiemannianManifold<T> for LandmarksSpace<T, M>
where
    T: Scalar,
    M: RiemannianManifold<T, Point = DVector<T>>,
{
    type Metric = L2Metric<T, M::Metric>;

    fn metric(&self) -> &Self::Metric {
        &self.metric
    }
}
