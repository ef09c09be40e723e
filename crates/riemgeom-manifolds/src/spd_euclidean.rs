//! Euclidean metric on SPD matrices, with power deformation.
//!
//! For `p = 1` the metric is the Frobenius inner product `tr(A B)` and
//! geodesics are straight lines `P + tV`. Straight lines leave the SPD cone,
//! so the exponential map is only defined on the interval returned by
//! [`SPDMetricEuclidean::exp_domain`]; `exp` itself does not check it.
//!
//! For `p ≠ 0` the metric is pulled back through `P ↦ P^p` and scaled by
//! `1/p²`.

use nalgebra::DMatrix;
use num_traits::Float;
use riemgeom_core::{
    batch::{broadcast_map2, Batch},
    error::{ManifoldError, Result},
    linalg,
    metric::RiemannianMetric,
    types::Scalar,
};

use crate::{
    spd::{check_power, differential_power_at, inverse_differential_power_at, paired_len},
    utils::check_square,
};

/// Euclidean metric with power deformation `power_euclidean`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SPDMetricEuclidean<T> {
    n: usize,
    power_euclidean: T,
}

impl<T: Scalar> SPDMetricEuclidean<T> {
    /// Creates the metric on n×n SPD matrices.
    ///
    /// # Errors
    /// `InvalidParameter` if `n` or `power_euclidean` is zero.
    pub fn new(n: usize, power_euclidean: T) -> Result<Self> {
        if n == 0 {
            return Err(ManifoldError::invalid_parameter(
                "SPD metric requires n >= 1",
            ));
        }
        check_power(power_euclidean)?;
        Ok(Self { n, power_euclidean })
    }

    /// The power deformation parameter.
    pub fn power_euclidean(&self) -> T {
        self.power_euclidean
    }

    fn is_unit_power(&self) -> bool {
        self.power_euclidean == T::one()
    }

    fn point_power(&self, point: &DMatrix<T>) -> Result<DMatrix<T>> {
        if self.is_unit_power() {
            Ok(point.clone())
        } else {
            linalg::powerm(point, self.power_euclidean)
        }
    }

    fn check_shapes(&self, matrices: &[&DMatrix<T>]) -> Result<()> {
        matrices.iter().try_for_each(|m| check_square(m, self.n))
    }

    /// Interval `(t_min, t_max)` of times for which `P^p + t dV` stays
    /// positive definite.
    pub fn exp_domain_at(
        &self,
        tangent_vec: &DMatrix<T>,
        base_point: &DMatrix<T>,
    ) -> Result<(T, T)> {
        self.check_shapes(&[tangent_vec, base_point])?;
        let half = self.power_euclidean * <T as Scalar>::from_f64(0.5);
        let inv_sqrt_base = linalg::powerm(base_point, -half)?;
        let modified = differential_power_at(self.power_euclidean, tangent_vec, base_point)?;
        let reduced = linalg::symmetrize(&(&inv_sqrt_base * modified * &inv_sqrt_base));

        let eigenvalues = linalg::eigh(&reduced)?.eigenvalues;
        let min_eig = eigenvalues.iter().copied().fold(T::infinity(), Float::min);
        let max_eig = eigenvalues.iter().copied().fold(T::neg_infinity(), Float::max);

        let t_min = if max_eig <= T::zero() {
            T::neg_infinity()
        } else {
            -T::one() / max_eig
        };
        let t_max = if min_eig >= T::zero() {
            T::infinity()
        } else {
            -T::one() / min_eig
        };
        Ok((t_min, t_max))
    }

    /// Batched [`exp_domain_at`](Self::exp_domain_at).
    ///
    /// Returns an `(n, 2)` matrix whose rows are `[t_min, t_max]`.
    pub fn exp_domain(
        &self,
        tangent_vec: &Batch<DMatrix<T>>,
        base_point: &Batch<DMatrix<T>>,
    ) -> Result<DMatrix<T>> {
        let n = paired_len(tangent_vec, base_point)?;
        let bounds = broadcast_map2(tangent_vec, base_point, |v, p| self.exp_domain_at(v, p))?;
        Ok(DMatrix::from_fn(n, 2, |i, j| {
            let (t_min, t_max) = bounds[i];
            if j == 0 {
                t_min
            } else {
                t_max
            }
        }))
    }
}

impl<T: Scalar> RiemannianMetric<T> for SPDMetricEuclidean<T> {
    type Point = DMatrix<T>;

    /// tr(dA dB) / p²
    fn inner_product_at(
        &self,
        tangent_vec_a: &DMatrix<T>,
        tangent_vec_b: &DMatrix<T>,
        base_point: &DMatrix<T>,
    ) -> Result<T> {
        self.check_shapes(&[tangent_vec_a, tangent_vec_b, base_point])?;
        let p = self.power_euclidean;
        if self.is_unit_power() {
            return Ok(linalg::trace_product(tangent_vec_a, tangent_vec_b));
        }
        let modified_a = differential_power_at(p, tangent_vec_a, base_point)?;
        let modified_b = differential_power_at(p, tangent_vec_b, base_point)?;
        Ok(linalg::trace_product(&modified_a, &modified_b) / (p * p))
    }

    /// (P^p + dV)^{1/p}; `P + V` when `p = 1`.
    fn exp_at(&self, tangent_vec: &DMatrix<T>, base_point: &DMatrix<T>) -> Result<DMatrix<T>> {
        self.check_shapes(&[tangent_vec, base_point])?;
        if self.is_unit_power() {
            return Ok(base_point + tangent_vec);
        }
        let p = self.power_euclidean;
        let modified = differential_power_at(p, tangent_vec, base_point)?;
        let moved = linalg::symmetrize(&(self.point_power(base_point)? + modified));
        linalg::powerm(&moved, T::one() / p)
    }

    /// (d pow_P)⁻¹ (Q^p − P^p)
    fn log_at(&self, point: &DMatrix<T>, base_point: &DMatrix<T>) -> Result<DMatrix<T>> {
        self.check_shapes(&[point, base_point])?;
        if self.is_unit_power() {
            return Ok(point - base_point);
        }
        let difference = self.point_power(point)? - self.point_power(base_point)?;
        inverse_differential_power_at(self.power_euclidean, &difference, base_point)
    }

    /// ‖Q^p − P^p‖²_F / p²
    fn squared_dist_at(&self, point_a: &DMatrix<T>, point_b: &DMatrix<T>) -> Result<T> {
        self.check_shapes(&[point_a, point_b])?;
        let p = self.power_euclidean;
        let difference = self.point_power(point_b)? - self.point_power(point_a)?;
        Ok(difference.norm_squared() / (p * p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::DVector;

    fn diag(values: &[f64]) -> DMatrix<f64> {
        DMatrix::from_diagonal(&DVector::from_row_slice(values))
    }

    #[test]
    fn test_exp_domain_interval() {
        let metric = SPDMetricEuclidean::<f64>::new(3, 1.0).unwrap();
        let base = Batch::single(diag(&[1.0, 2.0, 3.0]));
        let tangent = Batch::single(diag(&[-1.0, -0.5, 1.0]));

        let domain = metric.exp_domain(&tangent, &base).unwrap();
        assert_eq!(domain.shape(), (1, 2));
        assert_relative_eq!(domain[(0, 0)], -3.0, epsilon = 1e-12);
        assert_relative_eq!(domain[(0, 1)], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_exp_domain_is_unbounded_for_definite_directions() {
        let metric = SPDMetricEuclidean::<f64>::new(2, 1.0).unwrap();
        let base = Batch::single(diag(&[1.0, 1.0]));
        let tangents = Batch::new(vec![diag(&[1.0, 2.0]), diag(&[-1.0, -2.0])]).unwrap();

        let domain = metric.exp_domain(&tangents, &base).unwrap();
        assert_eq!(domain.shape(), (2, 2));
        assert_relative_eq!(domain[(0, 0)], -0.5, epsilon = 1e-12);
        assert_eq!(domain[(0, 1)], f64::INFINITY);
        assert_eq!(domain[(1, 0)], f64::NEG_INFINITY);
        assert_relative_eq!(domain[(1, 1)], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_exp_is_unguarded_for_unit_power() {
        let metric = SPDMetricEuclidean::<f64>::new(2, 1.0).unwrap();
        let base = Batch::single(diag(&[1.0, 1.0]));
        let tangent = Batch::single(diag(&[-2.0, 0.0]));
        let result = metric.exp(&tangent, &base).unwrap();
        assert_relative_eq!(result[0], diag(&[-1.0, 1.0]));
    }

    #[test]
    fn test_power_two_distance() {
        let metric = SPDMetricEuclidean::<f64>::new(1, 2.0).unwrap();
        let a = Batch::single(DMatrix::from_element(1, 1, 1.0));
        let b = Batch::single(DMatrix::from_element(1, 1, 3.0));
        // |3² − 1²| / 2
        assert_relative_eq!(metric.dist(&a, &b).unwrap()[0], 4.0, epsilon = 1e-12);

        let log = metric.log(&b, &a).unwrap();
        assert_relative_eq!(metric.norm(&log, &a).unwrap()[0], 4.0, epsilon = 1e-10);
    }
}
