//! Hypersphere S^dim = {x in R^{dim+1} : ||x|| = 1}
//!
//! The hypersphere is embedded in R^{dim+1} and carries the metric induced by
//! the ambient dot product. Geodesics are great circles, so the exponential
//! and logarithm maps have closed forms. Their trigonometric coefficients are
//! replaced by Taylor expansions near zero so that both maps stay accurate
//! for very short tangent vectors.

use nalgebra::DVector;
use num_traits::Float;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use riemgeom_core::{
    batch::Batch,
    error::{ManifoldError, Result},
    manifold::{sample_batch, Manifold, RiemannianManifold},
    metric::RiemannianMetric,
    types::Scalar,
};
use std::marker::PhantomData;

use crate::utils::{check_vector_len, validate_tolerance};

/// Projects `vector` onto the tangent space at `base_point`.
fn tangent_component<T: Scalar>(vector: &DVector<T>, base_point: &DVector<T>) -> DVector<T> {
    vector - base_point * vector.dot(base_point)
}

/// Great-circle angle between two unit vectors.
///
/// Computed from the chord length, which stays accurate for nearby points
/// where `acos` of the dot product does not.
fn angle<T: Scalar>(point_a: &DVector<T>, point_b: &DVector<T>) -> T {
    let half_chord = (point_b - point_a).norm() * <T as Scalar>::from_f64(0.5);
    <T as Scalar>::from_f64(2.0) * <T as Float>::asin(Float::min(half_chord, T::one()))
}

/// The metric induced on the hypersphere by the ambient dot product.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HypersphereMetric<T> {
    dim: usize,
    #[cfg_attr(feature = "serde", serde(skip))]
    _scalar: PhantomData<T>,
}

impl<T: Scalar> HypersphereMetric<T> {
    /// Metric on S^dim.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            _scalar: PhantomData,
        }
    }

    fn embedding_dim(&self) -> usize {
        self.dim + 1
    }
}

impl<T: Scalar> RiemannianMetric<T> for HypersphereMetric<T> {
    type Point = DVector<T>;

    fn inner_product_at(
        &self,
        tangent_vec_a: &DVector<T>,
        tangent_vec_b: &DVector<T>,
        base_point: &DVector<T>,
    ) -> Result<T> {
        check_vector_len(tangent_vec_a, self.embedding_dim())?;
        check_vector_len(tangent_vec_b, self.embedding_dim())?;
        check_vector_len(base_point, self.embedding_dim())?;
        Ok(tangent_vec_a.dot(tangent_vec_b))
    }

    /// exp_x(v) = cos(||v||) x + sin(||v||) v/||v||, after projecting `v` onto
    /// the tangent space at `x`.
    fn exp_at(&self, tangent_vec: &DVector<T>, base_point: &DVector<T>) -> Result<DVector<T>> {
        check_vector_len(tangent_vec, self.embedding_dim())?;
        check_vector_len(base_point, self.embedding_dim())?;

        let proj = tangent_component(tangent_vec, base_point);
        let norm = proj.norm();
        let norm_sq = norm * norm;

        // sin(t)/t
        let sinc = if norm < T::TAYLOR_THRESHOLD {
            T::one() - norm_sq / <T as Scalar>::from_f64(6.0)
        } else {
            <T as Float>::sin(norm) / norm
        };

        let exp = base_point * <T as Float>::cos(norm) + proj * sinc;
        let exp_norm = exp.norm();
        if exp_norm <= T::zero() || !Float::is_finite(exp_norm) {
            return Err(ManifoldError::numerical_error(
                "exponential map left the hypersphere",
            ));
        }
        Ok(exp / exp_norm)
    }

    /// log_x(y) = θ (y - cos(θ)x) / sin(θ).
    ///
    /// # Errors
    /// Returns a `NumericalError` for antipodal points, where the logarithm is
    /// not unique.
    fn log_at(&self, point: &DVector<T>, base_point: &DVector<T>) -> Result<DVector<T>> {
        check_vector_len(point, self.embedding_dim())?;
        check_vector_len(base_point, self.embedding_dim())?;

        let theta = angle(base_point, point);
        let pi = <T as Scalar>::from_f64(std::f64::consts::PI);
        if pi - theta < <T as Float>::sqrt(<T as Scalar>::EPSILON) {
            return Err(ManifoldError::numerical_error(
                "logarithm is not unique for antipodal points",
            ));
        }

        // θ / sin(θ)
        let coef = if theta < T::TAYLOR_THRESHOLD {
            T::one() + theta * theta / <T as Scalar>::from_f64(6.0)
        } else {
            theta / <T as Float>::sin(theta)
        };

        Ok(tangent_component(point, base_point) * coef)
    }

    fn squared_dist_at(&self, point_a: &DVector<T>, point_b: &DVector<T>) -> Result<T> {
        check_vector_len(point_a, self.embedding_dim())?;
        check_vector_len(point_b, self.embedding_dim())?;
        let theta = angle(point_a, point_b);
        Ok(theta * theta)
    }
}

/// The unit hypersphere S^dim embedded in R^{dim+1}.
///
/// # Mathematical Properties
///
/// - **Dimension**: dim
/// - **Tangent space**: T_x S^dim = {v in R^{dim+1} : x^T v = 0}
/// - **Riemannian metric**: Inherited from Euclidean space (canonical metric)
/// - **Distance**: d(x, y) = arccos(x^T y)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hypersphere<T> {
    dim: usize,
    tolerance: T,
    metric: HypersphereMetric<T>,
}

impl<T: Scalar> Hypersphere<T> {
    /// Creates the hypersphere S^dim.
    ///
    /// # Errors
    /// Returns an error if `dim` is zero.
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(ManifoldError::invalid_parameter(
                "Hypersphere requires dimension >= 1",
            ));
        }
        Ok(Self {
            dim,
            tolerance: T::BELONGS_TOLERANCE,
            metric: HypersphereMetric::new(dim),
        })
    }

    /// Sets the membership tolerance.
    pub fn with_tolerance(mut self, tolerance: T) -> Result<Self> {
        self.tolerance = validate_tolerance(tolerance)?;
        Ok(self)
    }

    /// Dimension of the embedding space, `dim + 1`.
    pub fn embedding_dimension(&self) -> usize {
        self.dim + 1
    }

    /// Projects a non-zero vector of the embedding space onto the sphere.
    pub fn projection(&self, point: &DVector<T>) -> Result<DVector<T>> {
        check_vector_len(point, self.embedding_dimension())?;
        let norm = point.norm();
        if norm <= <T as Scalar>::EPSILON {
            return Err(ManifoldError::invalid_point(
                "cannot project the zero vector onto the hypersphere",
            ));
        }
        Ok(point / norm)
    }

    /// Projects a vector onto the tangent space at `base_point`.
    pub fn to_tangent(&self, vector: &DVector<T>, base_point: &DVector<T>) -> Result<DVector<T>> {
        check_vector_len(vector, self.embedding_dimension())?;
        check_vector_len(base_point, self.embedding_dimension())?;
        Ok(tangent_component(vector, base_point))
    }
}

impl<T: Scalar> Manifold<T> for Hypersphere<T> {
    type Point = DVector<T>;

    fn name(&self) -> &str {
        "Hypersphere"
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn tolerance(&self) -> T {
        self.tolerance
    }

    fn is_point_on_manifold(&self, point: &DVector<T>, tolerance: T) -> bool {
        point.len() == self.embedding_dimension()
            && <T as Float>::abs(point.norm_squared() - T::one()) <= tolerance
    }

    /// Samples the uniform distribution on the sphere by normalizing
    /// standard Gaussian vectors.
    fn random_uniform<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n_samples: usize,
    ) -> Result<Batch<DVector<T>>> {
        let n = self.embedding_dimension();
        sample_batch(rng, n_samples, |rng| loop {
            let gaussian = DVector::from_fn(n, |_, _| {
                let z: f64 = StandardNormal.sample(rng);
                <T as Scalar>::from_f64(z)
            });
            if let Ok(point) = self.projection(&gaussian) {
                return Ok(point);
            }
        })
    }
}

impl<T: Scalar> RiemannianManifold<T> for Hypersphere<T> {
    type Metric = HypersphereMetric<T>;

    fn metric(&self) -> &HypersphereMetric<T> {
        &self.metric
    }
}
