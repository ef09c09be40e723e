//! Euclidean space R^n with its flat metric.
//!
//! Every finite vector is a point and every vector is a tangent vector. The
//! exponential map is vector addition and the logarithm map is subtraction,
//! which makes this space the natural ambient for landmark sets in the plane.

use nalgebra::DVector;
use num_traits::Float;
use rand::{distributions::Uniform, Rng};
use riemgeom_core::{
    batch::Batch,
    error::{ManifoldError, Result},
    manifold::{sample_batch, Manifold, RiemannianManifold},
    metric::RiemannianMetric,
    types::Scalar,
};
use std::marker::PhantomData;

use crate::utils::{check_vector_len, validate_tolerance};

/// The flat metric `⟨u, v⟩ = uᵀv`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EuclideanMetric<T> {
    dim: usize,
    #[cfg_attr(feature = "serde", serde(skip))]
    _scalar: PhantomData<T>,
}

impl<T: Scalar> EuclideanMetric<T> {
    /// Flat metric on R^dim.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            _scalar: PhantomData,
        }
    }
}

impl<T: Scalar> RiemannianMetric<T> for EuclideanMetric<T> {
    type Point = DVector<T>;

    fn inner_product_at(
        &self,
        tangent_vec_a: &DVector<T>,
        tangent_vec_b: &DVector<T>,
        base_point: &DVector<T>,
    ) -> Result<T> {
        check_vector_len(tangent_vec_a, self.dim)?;
        check_vector_len(tangent_vec_b, self.dim)?;
        check_vector_len(base_point, self.dim)?;
        Ok(tangent_vec_a.dot(tangent_vec_b))
    }

    fn exp_at(&self, tangent_vec: &DVector<T>, base_point: &DVector<T>) -> Result<DVector<T>> {
        check_vector_len(tangent_vec, self.dim)?;
        check_vector_len(base_point, self.dim)?;
        Ok(base_point + tangent_vec)
    }

    fn log_at(&self, point: &DVector<T>, base_point: &DVector<T>) -> Result<DVector<T>> {
        check_vector_len(point, self.dim)?;
        check_vector_len(base_point, self.dim)?;
        Ok(point - base_point)
    }

    fn squared_dist_at(&self, point_a: &DVector<T>, point_b: &DVector<T>) -> Result<T> {
        check_vector_len(point_a, self.dim)?;
        check_vector_len(point_b, self.dim)?;
        Ok((point_b - point_a).norm_squared())
    }
}

/// Euclidean space R^dim.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Euclidean<T> {
    dim: usize,
    tolerance: T,
    metric: EuclideanMetric<T>,
}

impl<T: Scalar> Euclidean<T> {
    /// Creates R^dim.
    ///
    /// # Errors
    /// Returns an error if `dim` is zero.
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(ManifoldError::invalid_parameter(
                "Euclidean space requires dimension >= 1",
            ));
        }
        Ok(Self {
            dim,
            tolerance: T::BELONGS_TOLERANCE,
            metric: EuclideanMetric::new(dim),
        })
    }

    /// Sets the membership tolerance.
    pub fn with_tolerance(mut self, tolerance: T) -> Result<Self> {
        self.tolerance = validate_tolerance(tolerance)?;
        Ok(self)
    }
}

impl<T: Scalar> Manifold<T> for Euclidean<T> {
    type Point = DVector<T>;

    fn name(&self) -> &str {
        "Euclidean"
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn tolerance(&self) -> T {
        self.tolerance
    }

    fn is_point_on_manifold(&self, point: &DVector<T>, _tolerance: T) -> bool {
        point.len() == self.dim && point.iter().all(|x| Float::is_finite(*x))
    }

    /// Samples uniformly in the cube `[-1, 1]^dim`.
    fn random_uniform<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n_samples: usize,
    ) -> Result<Batch<DVector<T>>> {
        let uniform = Uniform::new_inclusive(-1.0, 1.0);
        sample_batch(rng, n_samples, |rng| {
            Ok(DVector::from_fn(self.dim, |_, _| {
                <T as Scalar>::from_f64(rng.sample(uniform))
            }))
        })
    }
}

impl<T: Scalar> RiemannianManifold<T> for Euclidean<T> {
    type Metric = EuclideanMetric<T>;

    fn metric(&self) -> &EuclideanMetric<T> {
        &self.metric
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use riemgeom_core::test_utils::seeded_rng;

    #[test]
    fn test_euclidean_creation() {
        let space = Euclidean::<f64>::new(3).unwrap();
        assert_eq!(space.dimension(), 3);
        assert!(Euclidean::<f64>::new(0).is_err());
        assert!(space.clone().with_tolerance(0.0).is_err());
        assert!(space.with_tolerance(1e-3).is_ok());
    }

    #[test]
    fn test_exp_log_are_translations() {
        let space = Euclidean::<f64>::new(2).unwrap();
        let metric = space.metric();
        let p = Batch::single(DVector::from_vec(vec![1.0, 2.0]));
        let q = Batch::single(DVector::from_vec(vec![4.0, 6.0]));

        let v = metric.log(&q, &p).unwrap();
        assert_relative_eq!(v[0], DVector::from_vec(vec![3.0, 4.0]));
        assert_relative_eq!(metric.exp(&v, &p).unwrap()[0], q[0]);
        assert_relative_eq!(metric.dist(&p, &q).unwrap()[0], 5.0);
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let space = Euclidean::<f64>::new(2).unwrap();
        let p = Batch::single(DVector::from_vec(vec![1.0, 2.0, 3.0]));
        assert!(!space.belongs(&p)[0]);
        assert!(matches!(
            space.metric().squared_norm(&p, &p),
            Err(ManifoldError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_random_uniform_stays_in_cube() {
        let space = Euclidean::<f32>::new(5).unwrap();
        let points = space.random_uniform(&mut seeded_rng(11), 20).unwrap();
        assert!(space.belongs(&points).iter().all(|&b| b));
        assert!(points.iter().all(|p| p.amax() <= 1.0));
    }
}
