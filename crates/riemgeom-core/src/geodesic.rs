//! Lazily evaluated geodesics.
//!
//! A [`Geodesic`] is an immutable value: it borrows its metric and owns the
//! initial point and initial velocity of one geodesic, or of a family of
//! geodesics sharing the broadcast rule. Evaluating it at a sequence of times
//! is a pure function and can be repeated at will.

use crate::{
    batch::{broadcast_len, Batch},
    error::{ManifoldError, Result},
    metric::RiemannianMetric,
    types::{PointArray, Scalar},
};
use std::marker::PhantomData;

/// The curve `t ↦ exp(t · v, p)`.
#[derive(Debug)]
pub struct Geodesic<'a, T: Scalar, M: RiemannianMetric<T>> {
    metric: &'a M,
    initial_point: Batch<M::Point>,
    initial_tangent_vec: Batch<M::Point>,
    _scalar: PhantomData<T>,
}

impl<T: Scalar, M: RiemannianMetric<T>> Clone for Geodesic<'_, T, M> {
    fn clone(&self) -> Self {
        Self {
            metric: self.metric,
            initial_point: self.initial_point.clone(),
            initial_tangent_vec: self.initial_tangent_vec.clone(),
            _scalar: PhantomData,
        }
    }
}

impl<'a, T: Scalar, M: RiemannianMetric<T>> Geodesic<'a, T, M> {
    /// Geodesic from an initial point and an initial velocity.
    ///
    /// # Errors
    ///
    /// `BroadcastMismatch` if the two batches do not broadcast.
    pub fn new(
        metric: &'a M,
        initial_point: Batch<M::Point>,
        initial_tangent_vec: Batch<M::Point>,
    ) -> Result<Self> {
        broadcast_len(&[initial_point.len(), initial_tangent_vec.len()])?;
        Ok(Self {
            metric,
            initial_point,
            initial_tangent_vec,
            _scalar: PhantomData,
        })
    }

    /// Geodesic joining `initial_point` (at `t = 0`) to `end_point` (at `t = 1`).
    pub fn from_endpoints(
        metric: &'a M,
        initial_point: Batch<M::Point>,
        end_point: &Batch<M::Point>,
    ) -> Result<Self> {
        let initial_tangent_vec = metric.log(end_point, &initial_point)?;
        Self::new(metric, initial_point, initial_tangent_vec)
    }

    /// Number of geodesics in the family.
    pub fn n_geodesics(&self) -> usize {
        self.initial_point.len().max(self.initial_tangent_vec.len())
    }

    /// Initial points of the family.
    pub fn initial_point(&self) -> &Batch<M::Point> {
        &self.initial_point
    }

    /// Initial velocities of the family.
    pub fn initial_tangent_vec(&self) -> &Batch<M::Point> {
        &self.initial_tangent_vec
    }

    /// One point per geodesic, at time `t`.
    pub fn point_at(&self, t: T) -> Result<Batch<M::Point>> {
        let scaled = self.initial_tangent_vec.map(|v| Ok(v.scaled(t)))?;
        self.metric.exp(&scaled, &self.initial_point)
    }

    /// Evaluates every geodesic of the family at `times`.
    ///
    /// Returns one batch of `times.len()` points per geodesic.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `times` is empty.
    pub fn family_at(&self, times: &[T]) -> Result<Vec<Batch<M::Point>>> {
        if times.is_empty() {
            return Err(ManifoldError::invalid_parameter(
                "a geodesic must be evaluated at one or more times",
            ));
        }
        (0..self.n_geodesics())
            .map(|g| {
                let base = Batch::single(self.initial_point.broadcast_get(g).clone());
                let velocity = self.initial_tangent_vec.broadcast_get(g);
                let tangents = Batch::new(times.iter().map(|&t| velocity.scaled(t)).collect())?;
                self.metric.exp(&tangents, &base)
            })
            .collect()
    }

    /// Evaluates the geodesics at `times`, geodesic-major.
    ///
    /// For a single geodesic the batch holds one point per time; for a family
    /// of `g` geodesics it holds `g * times.len()` points, the points of the
    /// first geodesic first.
    pub fn at(&self, times: &[T]) -> Result<Batch<M::Point>> {
        Batch::concat(self.family_at(times)?)
    }
}
