//! Riemannian metrics and their batched operations.
//!
//! A metric supplies three pointwise kernels: the inner product on a tangent
//! space, the exponential map and the logarithm map. Every batched operation
//! is provided on top of them: arguments are broadcast against each other
//! first (see [`crate::batch`]) and the kernel then runs per element.
//!
//! Scalar-valued operations return an `(n, 1)` column where `n` is the
//! broadcast batch length.

use crate::{
    batch::{broadcast_map2, broadcast_map3, Batch},
    error::{ManifoldError, Result},
    geodesic::Geodesic,
    types::{DVector, PointArray, Scalar},
};
use num_traits::Float;
use std::fmt::Debug;

/// A Riemannian metric on a manifold whose points are `Self::Point` arrays.
///
/// Implementors provide [`inner_product_at`](Self::inner_product_at),
/// [`exp_at`](Self::exp_at) and [`log_at`](Self::log_at), and may override
/// [`squared_dist_at`](Self::squared_dist_at) with a closed form.
pub trait RiemannianMetric<T: Scalar>: Debug + Send + Sync {
    /// Array type of points and tangent vectors.
    type Point: PointArray<T>;

    /// Inner product `⟨a, b⟩` at `base_point`.
    fn inner_product_at(
        &self,
        tangent_vec_a: &Self::Point,
        tangent_vec_b: &Self::Point,
        base_point: &Self::Point,
    ) -> Result<T>;

    /// Riemannian exponential of `tangent_vec` at `base_point`.
    fn exp_at(&self, tangent_vec: &Self::Point, base_point: &Self::Point) -> Result<Self::Point>;

    /// Riemannian logarithm of `point` at `base_point`.
    fn log_at(&self, point: &Self::Point, base_point: &Self::Point) -> Result<Self::Point>;

    /// Squared geodesic distance between two points.
    ///
    /// Defaults to the squared norm of `log(point_b, point_a)`.
    fn squared_dist_at(&self, point_a: &Self::Point, point_b: &Self::Point) -> Result<T> {
        let log = self.log_at(point_b, point_a)?;
        self.inner_product_at(&log, &log, point_a)
    }

    /// Batched inner product, shape `(n, 1)`.
    fn inner_product(
        &self,
        tangent_vec_a: &Batch<Self::Point>,
        tangent_vec_b: &Batch<Self::Point>,
        base_point: &Batch<Self::Point>,
    ) -> Result<DVector<T>> {
        broadcast_map3(tangent_vec_a, tangent_vec_b, base_point, |a, b, p| {
            self.inner_product_at(a, b, p)
        })
        .map(Batch::into_column)
    }

    /// Batched squared norm, shape `(n, 1)`.
    fn squared_norm(
        &self,
        tangent_vec: &Batch<Self::Point>,
        base_point: &Batch<Self::Point>,
    ) -> Result<DVector<T>> {
        self.inner_product(tangent_vec, tangent_vec, base_point)
    }

    /// Batched norm, shape `(n, 1)`.
    fn norm(
        &self,
        tangent_vec: &Batch<Self::Point>,
        base_point: &Batch<Self::Point>,
    ) -> Result<DVector<T>> {
        Ok(self
            .squared_norm(tangent_vec, base_point)?
            .map(clamped_sqrt))
    }

    /// Batched exponential map.
    fn exp(
        &self,
        tangent_vec: &Batch<Self::Point>,
        base_point: &Batch<Self::Point>,
    ) -> Result<Batch<Self::Point>> {
        broadcast_map2(tangent_vec, base_point, |v, p| self.exp_at(v, p))
    }

    /// Batched logarithm map.
    fn log(
        &self,
        point: &Batch<Self::Point>,
        base_point: &Batch<Self::Point>,
    ) -> Result<Batch<Self::Point>> {
        broadcast_map2(point, base_point, |q, p| self.log_at(q, p))
    }

    /// Batched squared distance, shape `(max(n_a, n_b), 1)`.
    fn squared_dist(
        &self,
        point_a: &Batch<Self::Point>,
        point_b: &Batch<Self::Point>,
    ) -> Result<DVector<T>> {
        broadcast_map2(point_a, point_b, |a, b| self.squared_dist_at(a, b)).map(Batch::into_column)
    }

    /// Batched geodesic distance, shape `(max(n_a, n_b), 1)`.
    fn dist(
        &self,
        point_a: &Batch<Self::Point>,
        point_b: &Batch<Self::Point>,
    ) -> Result<DVector<T>> {
        Ok(self.squared_dist(point_a, point_b)?.map(clamped_sqrt))
    }

    /// Geodesic starting at `initial_point`.
    ///
    /// Exactly one of `end_point` and `initial_tangent_vec` must be given.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` naming the conflicting or missing argument, or any
    /// error raised by `log` when the geodesic is defined by its end point.
    fn geodesic(
        &self,
        initial_point: &Batch<Self::Point>,
        end_point: Option<&Batch<Self::Point>>,
        initial_tangent_vec: Option<&Batch<Self::Point>>,
    ) -> Result<Geodesic<'_, T, Self>>
    where
        Self: Sized,
    {
        match (end_point, initial_tangent_vec) {
            (Some(end_point), None) => {
                Geodesic::from_endpoints(self, initial_point.clone(), end_point)
            }
            (None, Some(tangent_vec)) => {
                Geodesic::new(self, initial_point.clone(), tangent_vec.clone())
            }
            (Some(_), Some(_)) => Err(ManifoldError::invalid_parameter(
                "cannot specify both `end_point` and `initial_tangent_vec` for a geodesic",
            )),
            (None, None) => Err(ManifoldError::invalid_parameter(
                "a geodesic requires either `end_point` or `initial_tangent_vec`",
            )),
        }
    }
}

/// Square root that maps tiny negative round-off to zero.
fn clamped_sqrt<T: Scalar>(x: T) -> T {
    <T as Float>::sqrt(Float::max(x, T::zero()))
}
