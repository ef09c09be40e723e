//! Symmetric Positive Definite (SPD) matrices manifold.
//!
//! The manifold of n×n symmetric positive definite matrices is an open subset
//! of the space of symmetric matrices:
//!
//! SPD(n) = {P ∈ ℝⁿˣⁿ : P = Pᵀ, xᵀPx > 0 ∀x ≠ 0}
//!
//! # Mathematical Properties
//!
//! - **Dimension**: n(n+1)/2
//! - **Tangent space**: the symmetric matrices
//! - **Metrics**: affine-invariant (with power deformation), Euclidean (with
//!   power deformation), log-Euclidean and Procrustes/Bures-Wasserstein, see
//!   the `spd_*` modules
//!
//! # Matrix function differentials
//!
//! The power-deformed and log-Euclidean metrics are pullbacks through the
//! matrix functions `P ↦ P^p`, `P ↦ log P` and `P ↦ exp P`. Their
//! differentials, and the inverses of those differentials, are provided here
//! both pointwise (`*_at` functions) and batched (associated functions of
//! [`SPDMatrices`]). Batched versions broadcast the tangent vectors against
//! the base points.
//!
//! Operations assume their inputs belong to the manifold. Use
//! [`Manifold::belongs`] to check.

use nalgebra::{DMatrix, DVector};
use num_traits::Float;
use rand::{distributions::Uniform, Rng};
use riemgeom_core::{
    batch::{broadcast_len, broadcast_map2, Batch},
    error::{ManifoldError, Result},
    linalg::{self, Direction},
    manifold::{sample_batch, Manifold, RiemannianManifold},
    types::Scalar,
};

use crate::{
    spd_affine::SPDMetricAffine,
    utils::{check_square, check_vector_len, validate_tolerance},
};

/// Rejects a zero power, for which `P ↦ P^p` is not a diffeomorphism.
pub(crate) fn check_power<T: Scalar>(power: T) -> Result<()> {
    if power == T::zero() || !Float::is_finite(power) {
        return Err(ManifoldError::invalid_parameter(format!(
            "power must be finite and non-zero, got {power}"
        )));
    }
    Ok(())
}

fn is_unit_power<T: Scalar>(power: T) -> bool {
    power == T::one()
}

/// Differential of `P ↦ P^p` at `base_point`, applied to `tangent_vec`.
pub fn differential_power_at<T: Scalar>(
    power: T,
    tangent_vec: &DMatrix<T>,
    base_point: &DMatrix<T>,
) -> Result<DMatrix<T>> {
    check_power(power)?;
    if is_unit_power(power) {
        linalg::ensure_symmetric_tangent(tangent_vec, base_point)?;
        return Ok(tangent_vec.clone());
    }
    linalg::spectral_differential(
        tangent_vec,
        base_point,
        |l| <T as Float>::powf(l, power),
        |l| power * <T as Float>::powf(l, power - T::one()),
        Direction::Forward,
    )
}

/// Inverse of [`differential_power_at`].
pub fn inverse_differential_power_at<T: Scalar>(
    power: T,
    tangent_vec: &DMatrix<T>,
    base_point: &DMatrix<T>,
) -> Result<DMatrix<T>> {
    check_power(power)?;
    if is_unit_power(power) {
        linalg::ensure_symmetric_tangent(tangent_vec, base_point)?;
        return Ok(tangent_vec.clone());
    }
    linalg::spectral_differential(
        tangent_vec,
        base_point,
        |l| <T as Float>::powf(l, power),
        |l| power * <T as Float>::powf(l, power - T::one()),
        Direction::Inverse,
    )
}

/// Differential of the matrix logarithm at `base_point`.
pub fn differential_log_at<T: Scalar>(
    tangent_vec: &DMatrix<T>,
    base_point: &DMatrix<T>,
) -> Result<DMatrix<T>> {
    linalg::spectral_differential(
        tangent_vec,
        base_point,
        <T as Float>::ln,
        <T as Float>::recip,
        Direction::Forward,
    )
}

/// Inverse of [`differential_log_at`].
pub fn inverse_differential_log_at<T: Scalar>(
    tangent_vec: &DMatrix<T>,
    base_point: &DMatrix<T>,
) -> Result<DMatrix<T>> {
    linalg::spectral_differential(
        tangent_vec,
        base_point,
        <T as Float>::ln,
        <T as Float>::recip,
        Direction::Inverse,
    )
}

/// Differential of the matrix exponential at a symmetric `base_point`.
pub fn differential_exp_at<T: Scalar>(
    tangent_vec: &DMatrix<T>,
    base_point: &DMatrix<T>,
) -> Result<DMatrix<T>> {
    linalg::spectral_differential(
        tangent_vec,
        base_point,
        <T as Float>::exp,
        <T as Float>::exp,
        Direction::Forward,
    )
}

/// Inverse of [`differential_exp_at`].
pub fn inverse_differential_exp_at<T: Scalar>(
    tangent_vec: &DMatrix<T>,
    base_point: &DMatrix<T>,
) -> Result<DMatrix<T>> {
    linalg::spectral_differential(
        tangent_vec,
        base_point,
        <T as Float>::exp,
        <T as Float>::exp,
        Direction::Inverse,
    )
}

/// The manifold of n×n symmetric positive definite matrices.
///
/// Its default metric is the affine-invariant metric.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SPDMatrices<T> {
    /// Size of the matrices (n×n)
    n: usize,
    tolerance: T,
    metric: SPDMetricAffine<T>,
}

impl<T: Scalar> SPDMatrices<T> {
    /// Creates the manifold of n×n SPD matrices.
    ///
    /// # Errors
    /// Returns an error if `n` is zero.
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(ManifoldError::invalid_parameter(
                "SPD manifold requires n >= 1",
            ));
        }
        Ok(Self {
            n,
            tolerance: T::BELONGS_TOLERANCE,
            metric: SPDMetricAffine::new(n, T::one())?,
        })
    }

    /// Sets the membership tolerance.
    pub fn with_tolerance(mut self, tolerance: T) -> Result<Self> {
        self.tolerance = validate_tolerance(tolerance)?;
        Ok(self)
    }

    /// Returns the matrix size (n)
    pub fn matrix_size(&self) -> usize {
        self.n
    }

    /// Projects square matrices onto the manifold by symmetrizing them and
    /// flooring their eigenvalues at the membership tolerance.
    pub fn projection(&self, points: &Batch<DMatrix<T>>) -> Result<Batch<DMatrix<T>>> {
        let floor = self.tolerance;
        points.map(|point| {
            check_square(point, self.n)?;
            linalg::apply_spectral(&linalg::symmetrize(point), |l| Float::max(l, floor))
        })
    }

    /// Samples tangent vectors `P^{1/2} (B + Bᵀ) P^{1/2}` with `B` uniform in
    /// `[-1, 1]`.
    ///
    /// `base_point` holds either one point, shared by every sample, or
    /// `n_samples` points.
    pub fn random_tangent_vec_uniform<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n_samples: usize,
        base_point: &Batch<DMatrix<T>>,
    ) -> Result<Batch<DMatrix<T>>> {
        if base_point.len() != 1 && base_point.len() != n_samples {
            return Err(ManifoldError::broadcast_mismatch(n_samples, base_point.len()));
        }
        let sqrt_base = base_point.map(|p| {
            check_square(p, self.n)?;
            linalg::sqrtm(p)
        })?;
        let uniform = Uniform::new_inclusive(-1.0, 1.0);
        let mut index = 0;
        sample_batch(rng, n_samples, |rng| {
            let b = DMatrix::from_fn(self.n, self.n, |_, _| {
                <T as Scalar>::from_f64(rng.sample(uniform))
            });
            let sqrt_p = sqrt_base.broadcast_get(index);
            index += 1;
            Ok(linalg::symmetrize(&(sqrt_p * (&b + b.transpose()) * sqrt_p)))
        })
    }

    /// Length of the vector representation of a symmetric matrix,
    /// `n(n+1)/2`.
    pub fn vector_len(&self) -> usize {
        self.n * (self.n + 1) / 2
    }

    /// Flattens symmetric matrices into vectors of length `n(n+1)/2`.
    ///
    /// Entries of the lower triangle are listed row by row:
    /// `(0,0), (1,0), (1,1), (2,0), ...`.
    pub fn vector_from_symmetric_matrix(
        &self,
        matrices: &Batch<DMatrix<T>>,
    ) -> Result<Batch<DVector<T>>> {
        matrices.map(|matrix| {
            check_square(matrix, self.n)?;
            let mut values = Vec::with_capacity(self.vector_len());
            for i in 0..self.n {
                for j in 0..=i {
                    values.push(matrix[(i, j)]);
                }
            }
            Ok(DVector::from_vec(values))
        })
    }

    /// Inverse of [`vector_from_symmetric_matrix`](Self::vector_from_symmetric_matrix).
    pub fn symmetric_matrix_from_vector(
        &self,
        vectors: &Batch<DVector<T>>,
    ) -> Result<Batch<DMatrix<T>>> {
        vectors.map(|vector| {
            check_vector_len(vector, self.vector_len())?;
            let mut matrix = DMatrix::zeros(self.n, self.n);
            let mut k = 0;
            for i in 0..self.n {
                for j in 0..=i {
                    matrix[(i, j)] = vector[k];
                    matrix[(j, i)] = vector[k];
                    k += 1;
                }
            }
            Ok(matrix)
        })
    }

    /// Matrix logarithm of every point.
    pub fn logm(points: &Batch<DMatrix<T>>) -> Result<Batch<DMatrix<T>>> {
        points.map(linalg::logm)
    }

    /// Matrix exponential of every symmetric matrix.
    pub fn expm(matrices: &Batch<DMatrix<T>>) -> Result<Batch<DMatrix<T>>> {
        matrices.map(linalg::expm)
    }

    /// Differential of `P ↦ P^power`.
    ///
    /// # Errors
    /// `InvalidParameter` if `power` is zero, `BroadcastMismatch` if the
    /// batches do not broadcast.
    pub fn differential_power(
        power: T,
        tangent_vec: &Batch<DMatrix<T>>,
        base_point: &Batch<DMatrix<T>>,
    ) -> Result<Batch<DMatrix<T>>> {
        check_power(power)?;
        broadcast_map2(tangent_vec, base_point, |v, p| {
            differential_power_at(power, v, p)
        })
    }

    /// Inverse of [`differential_power`](Self::differential_power).
    pub fn inverse_differential_power(
        power: T,
        tangent_vec: &Batch<DMatrix<T>>,
        base_point: &Batch<DMatrix<T>>,
    ) -> Result<Batch<DMatrix<T>>> {
        check_power(power)?;
        broadcast_map2(tangent_vec, base_point, |v, p| {
            inverse_differential_power_at(power, v, p)
        })
    }

    /// Differential of the matrix logarithm.
    pub fn differential_log(
        tangent_vec: &Batch<DMatrix<T>>,
        base_point: &Batch<DMatrix<T>>,
    ) -> Result<Batch<DMatrix<T>>> {
        broadcast_map2(tangent_vec, base_point, differential_log_at)
    }

    /// Inverse of [`differential_log`](Self::differential_log).
    pub fn inverse_differential_log(
        tangent_vec: &Batch<DMatrix<T>>,
        base_point: &Batch<DMatrix<T>>,
    ) -> Result<Batch<DMatrix<T>>> {
        broadcast_map2(tangent_vec, base_point, inverse_differential_log_at)
    }

    /// Differential of the matrix exponential at symmetric base points.
    pub fn differential_exp(
        tangent_vec: &Batch<DMatrix<T>>,
        base_point: &Batch<DMatrix<T>>,
    ) -> Result<Batch<DMatrix<T>>> {
        broadcast_map2(tangent_vec, base_point, differential_exp_at)
    }

    /// Inverse of [`differential_exp`](Self::differential_exp).
    pub fn inverse_differential_exp(
        tangent_vec: &Batch<DMatrix<T>>,
        base_point: &Batch<DMatrix<T>>,
    ) -> Result<Batch<DMatrix<T>>> {
        broadcast_map2(tangent_vec, base_point, inverse_differential_exp_at)
    }
}

impl<T: Scalar> Manifold<T> for SPDMatrices<T> {
    type Point = DMatrix<T>;

    fn name(&self) -> &str {
        "SPDMatrices"
    }

    fn dimension(&self) -> usize {
        self.n * (self.n + 1) / 2
    }

    fn tolerance(&self) -> T {
        self.tolerance
    }

    fn is_point_on_manifold(&self, point: &DMatrix<T>, tolerance: T) -> bool {
        if point.shape() != (self.n, self.n) || !linalg::is_symmetric(point, tolerance) {
            return false;
        }
        match linalg::eigh(point) {
            Ok(eig) => eig.eigenvalues.iter().all(|&l| l > T::zero()),
            Err(_) => false,
        }
    }

    /// Samples `expm(A + Aᵀ)` with `A` uniform in `[-1, 1]`.
    fn random_uniform<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n_samples: usize,
    ) -> Result<Batch<DMatrix<T>>> {
        let uniform = Uniform::new_inclusive(-1.0, 1.0);
        sample_batch(rng, n_samples, |rng| {
            let a = DMatrix::from_fn(self.n, self.n, |_, _| {
                <T as Scalar>::from_f64(rng.sample(uniform))
            });
            linalg::expm(&(&a + a.transpose()))
        })
    }
}

impl<T: Scalar> RiemannianManifold<T> for SPDMatrices<T> {
    type Metric = SPDMetricAffine<T>;

    fn metric(&self) -> &SPDMetricAffine<T> {
        &self.metric
    }
}

/// Checks the broadcast rule for a tangent/base pair before a metric-level
/// batched operation that builds a non-`Batch` output.
pub(crate) fn paired_len<T: Scalar>(
    tangent_vec: &Batch<DMatrix<T>>,
    base_point: &Batch<DMatrix<T>>,
) -> Result<usize> {
    broadcast_len(&[tangent_vec.len(), base_point.len()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use riemgeom_core::test_utils::{assert_batches_close, seeded_rng};

    fn diag(values: &[f64]) -> DMatrix<f64> {
        DMatrix::from_diagonal(&DVector::from_row_slice(values))
    }

    #[test]
    fn test_spd_creation() {
        let spd = SPDMatrices::<f64>::new(3).unwrap();
        assert_eq!(spd.dimension(), 6);
        assert_eq!(spd.matrix_size(), 3);
        assert!(SPDMatrices::<f64>::new(0).is_err());
    }

    #[test]
    fn test_belongs() {
        let spd = SPDMatrices::<f64>::new(2).unwrap();
        let points = Batch::new(vec![
            DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 2.0]),
            DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]),
            DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 0.0, 2.0]),
            DMatrix::identity(3, 3),
        ])
        .unwrap();
        assert_eq!(spd.belongs(&points).as_slice(), &[true, false, false, false]);
    }

    #[test]
    fn test_random_uniform_and_tangent_shapes() {
        let spd = SPDMatrices::<f64>::new(3).unwrap();
        let mut rng = seeded_rng(1);
        let points = spd.random_uniform(&mut rng, 5).unwrap();
        assert_eq!(points.len(), 5);
        assert!(spd.belongs(&points).iter().all(|&b| b));

        let one_base = spd.random_tangent_vec_uniform(&mut rng, 4, &Batch::single(points[0].clone()));
        assert_eq!(one_base.unwrap().len(), 4);

        let per_sample = spd.random_tangent_vec_uniform(&mut rng, 5, &points).unwrap();
        assert!(per_sample.iter().all(|v| v == &v.transpose()));

        assert!(matches!(
            spd.random_tangent_vec_uniform(&mut rng, 3, &points),
            Err(ManifoldError::BroadcastMismatch { .. })
        ));
    }

    #[test]
    fn test_vector_ordering() {
        let spd = SPDMatrices::<f64>::new(3).unwrap();
        let vector = Batch::single(DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
        let matrix = spd.symmetric_matrix_from_vector(&vector).unwrap();
        let expected = DMatrix::from_row_slice(3, 3, &[1.0, 2.0, 4.0, 2.0, 3.0, 5.0, 4.0, 5.0, 6.0]);
        assert_eq!(matrix[0], expected);
        assert_eq!(spd.vector_from_symmetric_matrix(&matrix).unwrap(), vector);

        let short = Batch::single(DVector::from_vec(vec![1.0, 2.0]));
        assert!(matches!(
            spd.symmetric_matrix_from_vector(&short),
            Err(ManifoldError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_zero_power_is_rejected() {
        let p = Batch::single(diag(&[1.0, 2.0]));
        assert!(matches!(
            SPDMatrices::differential_power(0.0, &p, &p),
            Err(ManifoldError::InvalidParameter { .. })
        ));
        assert!(matches!(
            SPDMatrices::inverse_differential_power(0.0, &p, &p),
            Err(ManifoldError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_differential_power_on_diagonal_base() {
        let base = Batch::single(diag(&[1.0, 4.0]));
        let tangent = Batch::single(DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]));
        let result = SPDMatrices::differential_power(0.5, &tangent, &base).unwrap();
        // (sqrt(1) - sqrt(4)) / (1 - 4) = 1/3, d/dx sqrt(x) = 1/(2 sqrt(x))
        let expected = DMatrix::from_row_slice(2, 2, &[0.5, 1.0 / 3.0, 1.0 / 3.0, 0.25]);
        assert_relative_eq!(result[0], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_differential_exp_accepts_symmetric_base() {
        let base = Batch::single(diag(&[1.0, 1.0, -1.0]));
        let tangent = Batch::single(DMatrix::from_row_slice(
            3,
            3,
            &[1.0, 1.0, 3.0, 1.0, 1.0, 3.0, 3.0, 3.0, 4.0],
        ));
        let result = SPDMatrices::differential_exp(&tangent, &base).unwrap();

        let e = std::f64::consts::E;
        let x = e - 1.0 / e;
        let expected = DMatrix::from_row_slice(
            3,
            3,
            &[e, e, 1.5 * x, e, e, 1.5 * x, 1.5 * x, 1.5 * x, 4.0 / e],
        );
        assert_relative_eq!(result[0], expected, epsilon = 1e-10);

        let back = SPDMatrices::inverse_differential_exp(&result, &base).unwrap();
        assert_batches_close(&back, &tangent, 1e-10);
    }

    #[test]
    fn test_projection_makes_points_belong() {
        let spd = SPDMatrices::<f64>::new(2).unwrap();
        let almost = Batch::single(DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]));
        let projected = spd.projection(&almost).unwrap();
        assert!(spd.belongs(&projected)[0]);
    }

    #[test]
    fn test_logm_expm() {
        let p = Batch::single(diag(&[1.0, std::f64::consts::E]));
        let log = SPDMatrices::logm(&p).unwrap();
        assert_relative_eq!(log[0], diag(&[0.0, 1.0]), epsilon = 1e-12);
        assert_batches_close(&SPDMatrices::expm(&log).unwrap(), &p, 1e-12);
    }
}
