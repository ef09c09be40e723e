//! Affine-invariant metric on SPD matrices, with power deformation.
//!
//! For `p = 1` this is the classical affine-invariant metric
//!
//! ⟨A, B⟩_P = tr(P⁻¹ A P⁻¹ B)
//!
//! which is invariant under congruences `P ↦ G P Gᵀ`. For `p ≠ 0` it is
//! pulled back through `P ↦ P^p` and scaled by `1/p²`, so that the deformed
//! metric tends to the log-Euclidean metric as `p → 0`.

use nalgebra::DMatrix;
use num_traits::Float;
use riemgeom_core::{
    error::{ManifoldError, Result},
    linalg,
    metric::RiemannianMetric,
    types::Scalar,
};

use crate::{
    spd::{check_power, differential_power_at, inverse_differential_power_at},
    utils::check_square,
};

/// Affine-invariant metric with power deformation `power_affine`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SPDMetricAffine<T> {
    n: usize,
    power_affine: T,
}

impl<T: Scalar> SPDMetricAffine<T> {
    /// Creates the metric on n×n SPD matrices.
    ///
    /// # Errors
    /// `InvalidParameter` if `n` or `power_affine` is zero.
    pub fn new(n: usize, power_affine: T) -> Result<Self> {
        if n == 0 {
            return Err(ManifoldError::invalid_parameter(
                "SPD metric requires n >= 1",
            ));
        }
        check_power(power_affine)?;
        Ok(Self { n, power_affine })
    }

    /// The power deformation parameter.
    pub fn power_affine(&self) -> T {
        self.power_affine
    }

    fn is_unit_power(&self) -> bool {
        self.power_affine == T::one()
    }

    /// `(P^{p/2}, P^{-p/2})`
    fn half_powers(&self, base_point: &DMatrix<T>) -> Result<(DMatrix<T>, DMatrix<T>)> {
        let half = self.power_affine * <T as Scalar>::from_f64(0.5);
        Ok((
            linalg::powerm(base_point, half)?,
            linalg::powerm(base_point, -half)?,
        ))
    }

    /// `P^{-p/2} Q^p P^{-p/2}`, the point `Q` seen from `P` in the deformed
    /// coordinates.
    fn reduced_point(&self, point: &DMatrix<T>, inv_sqrt_base: &DMatrix<T>) -> Result<DMatrix<T>> {
        let point_power = if self.is_unit_power() {
            point.clone()
        } else {
            linalg::powerm(point, self.power_affine)?
        };
        Ok(linalg::symmetrize(
            &(inv_sqrt_base * point_power * inv_sqrt_base),
        ))
    }

    fn check_shapes(&self, matrices: &[&DMatrix<T>]) -> Result<()> {
        matrices.iter().try_for_each(|m| check_square(m, self.n))
    }
}

impl<T: Scalar> RiemannianMetric<T> for SPDMetricAffine<T> {
    type Point = DMatrix<T>;

    /// tr(P^{-p} dA P^{-p} dB) / p², with dA, dB the images of the tangent
    /// vectors under the differential of `P ↦ P^p`.
    fn inner_product_at(
        &self,
        tangent_vec_a: &DMatrix<T>,
        tangent_vec_b: &DMatrix<T>,
        base_point: &DMatrix<T>,
    ) -> Result<T> {
        self.check_shapes(&[tangent_vec_a, tangent_vec_b, base_point])?;
        let p = self.power_affine;

        if self.is_unit_power() {
            let inv_base = linalg::inverse(base_point)?;
            return Ok(linalg::trace_product(
                &(&inv_base * tangent_vec_a),
                &(&inv_base * tangent_vec_b),
            ));
        }

        let modified_a = differential_power_at(p, tangent_vec_a, base_point)?;
        let modified_b = differential_power_at(p, tangent_vec_b, base_point)?;
        let inv_power = linalg::powerm(base_point, -p)?;
        let product = linalg::trace_product(&(&inv_power * modified_a), &(&inv_power * modified_b));
        Ok(product / (p * p))
    }

    /// (P^{p/2} expm(P^{-p/2} dV P^{-p/2}) P^{p/2})^{1/p}
    fn exp_at(&self, tangent_vec: &DMatrix<T>, base_point: &DMatrix<T>) -> Result<DMatrix<T>> {
        self.check_shapes(&[tangent_vec, base_point])?;
        let p = self.power_affine;
        let (sqrt_base, inv_sqrt_base) = self.half_powers(base_point)?;

        let modified = differential_power_at(p, tangent_vec, base_point)?;
        let reduced = linalg::symmetrize(&(&inv_sqrt_base * modified * &inv_sqrt_base));
        let exp = linalg::symmetrize(&(&sqrt_base * linalg::expm(&reduced)? * &sqrt_base));

        if self.is_unit_power() {
            Ok(exp)
        } else {
            linalg::powerm(&exp, T::one() / p)
        }
    }

    /// (d pow_P)⁻¹ (P^{p/2} logm(P^{-p/2} Q^p P^{-p/2}) P^{p/2})
    fn log_at(&self, point: &DMatrix<T>, base_point: &DMatrix<T>) -> Result<DMatrix<T>> {
        self.check_shapes(&[point, base_point])?;
        let (sqrt_base, inv_sqrt_base) = self.half_powers(base_point)?;

        let reduced = self.reduced_point(point, &inv_sqrt_base)?;
        let log = linalg::symmetrize(&(&sqrt_base * linalg::logm(&reduced)? * &sqrt_base));
        inverse_differential_power_at(self.power_affine, &log, base_point)
    }

    /// ‖logm(P^{-p/2} Q^p P^{-p/2})‖²_F / p²
    fn squared_dist_at(&self, point_a: &DMatrix<T>, point_b: &DMatrix<T>) -> Result<T> {
        self.check_shapes(&[point_a, point_b])?;
        let p = self.power_affine;
        let (_, inv_sqrt_a) = self.half_powers(point_a)?;
        let reduced = self.reduced_point(point_b, &inv_sqrt_a)?;

        let eig = linalg::eigh(&reduced)?;
        if eig.eigenvalues.iter().any(|&l| l <= T::zero()) {
            return Err(ManifoldError::numerical_error(
                "matrix logarithm requires a positive-definite matrix",
            ));
        }
        let sum = eig.eigenvalues.iter().fold(T::zero(), |acc, &l| {
            let log = <T as Float>::ln(l);
            acc + log * log
        });
        Ok(sum / (p * p))
    }
}
