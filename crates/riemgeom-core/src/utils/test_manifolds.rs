//! Simple manifolds for use in unit tests.
//!
//! Flat Euclidean space exercises the batched trait machinery without any
//! curvature: exp and log are vector addition and subtraction, so expected
//! values can be written down by hand.

#![cfg(any(test, feature = "test-utils"))]

use crate::{
    batch::Batch,
    error::{ManifoldError, Result},
    manifold::{sample_batch, Manifold, RiemannianManifold},
    metric::RiemannianMetric,
    types::{DVector, Scalar},
};
use num_traits::Float;
use rand::{distributions::Uniform, Rng};
use std::marker::PhantomData;

/// Flat metric with the standard dot product.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestEuclideanMetric<T> {
    _scalar: PhantomData<T>,
}

impl<T: Scalar> TestEuclideanMetric<T> {
    /// Creates the flat metric.
    pub fn new() -> Self {
        Self {
            _scalar: PhantomData,
        }
    }
}

fn check_same_len<T: Scalar>(a: &DVector<T>, b: &DVector<T>) -> Result<()> {
    if a.len() == b.len() {
        Ok(())
    } else {
        Err(ManifoldError::dimension_mismatch(a.len(), b.len()))
    }
}

impl<T: Scalar> RiemannianMetric<T> for TestEuclideanMetric<T> {
    type Point = DVector<T>;

    fn inner_product_at(
        &self,
        tangent_vec_a: &DVector<T>,
        tangent_vec_b: &DVector<T>,
        _base_point: &DVector<T>,
    ) -> Result<T> {
        check_same_len(tangent_vec_a, tangent_vec_b)?;
        Ok(tangent_vec_a.dot(tangent_vec_b))
    }

    fn exp_at(&self, tangent_vec: &DVector<T>, base_point: &DVector<T>) -> Result<DVector<T>> {
        check_same_len(tangent_vec, base_point)?;
        Ok(base_point + tangent_vec)
    }

    fn log_at(&self, point: &DVector<T>, base_point: &DVector<T>) -> Result<DVector<T>> {
        check_same_len(point, base_point)?;
        Ok(point - base_point)
    }
}

/// Euclidean space `R^dim`.
#[derive(Debug, Clone)]
pub struct TestEuclideanManifold<T> {
    dim: usize,
    metric: TestEuclideanMetric<T>,
}

impl<T: Scalar> TestEuclideanManifold<T> {
    /// Creates `R^dim` with its flat metric.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            metric: TestEuclideanMetric::new(),
        }
    }
}

impl<T: Scalar> Manifold<T> for TestEuclideanManifold<T> {
    type Point = DVector<T>;

    fn name(&self) -> &str {
        "TestEuclidean"
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn is_point_on_manifold(&self, point: &DVector<T>, _tolerance: T) -> bool {
        point.len() == self.dim && point.iter().all(|x| Float::is_finite(*x))
    }

    fn random_uniform<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n_samples: usize,
    ) -> Result<Batch<DVector<T>>> {
        let uniform = Uniform::new(-1.0, 1.0);
        sample_batch(rng, n_samples, |rng| {
            Ok(DVector::from_fn(self.dim, |_, _| {
                <T as Scalar>::from_f64(rng.sample(uniform))
            }))
        })
    }
}

impl<T: Scalar> RiemannianManifold<T> for TestEuclideanManifold<T> {
    type Metric = TestEuclideanMetric<T>;

    fn metric(&self) -> &Self::Metric {
        &self.metric
    }
}
