//! Procrustes (Bures-Wasserstein) metric on SPD matrices.
//!
//! Seen as covariance matrices of centered Gaussians, the geodesic distance is
//! the 2-Wasserstein distance
//!
//! d²(P, Q) = tr P + tr Q − 2 tr (P^{½} Q P^{½})^{½}
//!
//! Tangent vectors are mapped to the solution `L` of the Lyapunov equation
//! `L P + P L = V`, which is solved in the eigenbasis of `P`.

use std::marker::PhantomData;

use nalgebra::DMatrix;
use num_traits::Float;
use riemgeom_core::{
    error::{ManifoldError, Result},
    linalg,
    metric::RiemannianMetric,
    types::Scalar,
};

use crate::utils::check_square;

/// Procrustes metric on n×n SPD matrices.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SPDMetricProcrustes<T> {
    n: usize,
    #[cfg_attr(feature = "serde", serde(skip))]
    _phantom: PhantomData<T>,
}

impl<T: Scalar> SPDMetricProcrustes<T> {
    /// Creates the metric on n×n SPD matrices.
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(ManifoldError::invalid_parameter(
                "SPD metric requires n >= 1",
            ));
        }
        Ok(Self {
            n,
            _phantom: PhantomData,
        })
    }

    fn check_shapes(&self, matrices: &[&DMatrix<T>]) -> Result<()> {
        matrices.iter().try_for_each(|m| check_square(m, self.n))
    }

    /// Solves `L P + P L = V` for symmetric `V` and SPD `P`.
    fn solve_lyapunov(tangent_vec: &DMatrix<T>, base_point: &DMatrix<T>) -> Result<DMatrix<T>> {
        let eig = linalg::eigh(base_point)?;
        if eig.eigenvalues.iter().any(|&l| l <= T::zero()) {
            return Err(ManifoldError::numerical_error(
                "Lyapunov equation requires a positive-definite base point",
            ));
        }
        let u = &eig.eigenvectors;
        let rotated = u.transpose() * tangent_vec * u;
        let solved = DMatrix::from_fn(rotated.nrows(), rotated.ncols(), |i, j| {
            rotated[(i, j)] / (eig.eigenvalues[i] + eig.eigenvalues[j])
        });
        Ok(linalg::symmetrize(&(u * solved * u.transpose())))
    }

    /// `(P^{½} Q P^{½})^{½}` together with `P^{½}`.
    fn mixed_sqrt(point: &DMatrix<T>, base_point: &DMatrix<T>) -> Result<(DMatrix<T>, DMatrix<T>)> {
        let sqrt_base = linalg::sqrtm(base_point)?;
        let congruence = linalg::symmetrize(&(&sqrt_base * point * &sqrt_base));
        Ok((linalg::sqrtm(&congruence)?, sqrt_base))
    }
}

impl<T: Scalar> RiemannianMetric<T> for SPDMetricProcrustes<T> {
    type Point = DMatrix<T>;

    /// ½ tr(L_A B) where `L_A P + P L_A = A`.
    fn inner_product_at(
        &self,
        tangent_vec_a: &DMatrix<T>,
        tangent_vec_b: &DMatrix<T>,
        base_point: &DMatrix<T>,
    ) -> Result<T> {
        self.check_shapes(&[tangent_vec_a, tangent_vec_b, base_point])?;
        let lyapunov = Self::solve_lyapunov(tangent_vec_a, base_point)?;
        Ok(linalg::trace_product(&lyapunov, tangent_vec_b) * <T as Scalar>::from_f64(0.5))
    }

    /// P + V + L P L where `L P + P L = V`.
    fn exp_at(&self, tangent_vec: &DMatrix<T>, base_point: &DMatrix<T>) -> Result<DMatrix<T>> {
        self.check_shapes(&[tangent_vec, base_point])?;
        let lyapunov = Self::solve_lyapunov(tangent_vec, base_point)?;
        let result = base_point + tangent_vec + &lyapunov * base_point * &lyapunov;
        Ok(linalg::symmetrize(&result))
    }

    /// (P Q)^{½} + (Q P)^{½} − 2P
    fn log_at(&self, point: &DMatrix<T>, base_point: &DMatrix<T>) -> Result<DMatrix<T>> {
        self.check_shapes(&[point, base_point])?;
        let (mixed, sqrt_base) = Self::mixed_sqrt(point, base_point)?;
        let inv_sqrt_base = linalg::inverse(&sqrt_base)?;
        let product_sqrt = &sqrt_base * mixed * inv_sqrt_base;
        let two = <T as Scalar>::from_f64(2.0);
        Ok(linalg::symmetrize(
            &(&product_sqrt + product_sqrt.transpose() - base_point * two),
        ))
    }

    fn squared_dist_at(&self, point_a: &DMatrix<T>, point_b: &DMatrix<T>) -> Result<T> {
        self.check_shapes(&[point_a, point_b])?;
        let (mixed, _) = Self::mixed_sqrt(point_b, point_a)?;
        let two = <T as Scalar>::from_f64(2.0);
        let squared = point_a.trace() + point_b.trace() - two * mixed.trace();
        Ok(Float::max(squared, T::zero()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use riemgeom_core::batch::Batch;

    fn base_point() -> DMatrix<f64> {
        DMatrix::from_row_slice(3, 3, &[1.0, 0.0, 0.0, 0.0, 1.5, 0.5, 0.0, 0.5, 1.5])
    }

    #[test]
    fn test_inner_product() {
        let metric = SPDMetricProcrustes::<f64>::new(3).unwrap();
        let base = Batch::single(base_point());
        let a = Batch::single(DMatrix::from_row_slice(
            3,
            3,
            &[2.0, 1.0, 1.0, 1.0, 0.5, 0.5, 1.0, 0.5, 0.5],
        ));
        let b = Batch::single(DMatrix::from_row_slice(
            3,
            3,
            &[1.0, 2.0, 4.0, 2.0, 3.0, 8.0, 4.0, 8.0, 5.0],
        ));
        let result = metric.inner_product(&a, &b, &base).unwrap();
        assert_relative_eq!(result[0], 4.0, epsilon = 1e-10);
    }

    #[test]
    fn test_one_dimensional_distance() {
        let metric = SPDMetricProcrustes::<f64>::new(1).unwrap();
        let a = Batch::single(DMatrix::from_element(1, 1, 1.0));
        let b = Batch::single(DMatrix::from_element(1, 1, 4.0));
        assert_relative_eq!(metric.dist(&a, &b).unwrap()[0], 1.0, epsilon = 1e-12);

        let log = metric.log(&b, &a).unwrap();
        assert_relative_eq!(log[0][(0, 0)], 2.0, epsilon = 1e-12);
        assert_relative_eq!(metric.norm(&log, &a).unwrap()[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_exp_inverts_log() {
        let metric = SPDMetricProcrustes::<f64>::new(3).unwrap();
        let base = Batch::single(base_point());
        let point = Batch::single(DMatrix::from_row_slice(
            3,
            3,
            &[2.0, 0.3, 0.1, 0.3, 1.0, 0.2, 0.1, 0.2, 0.8],
        ));
        let log = metric.log(&point, &base).unwrap();
        let back = metric.exp(&log, &base).unwrap();
        assert_relative_eq!(back[0], point[0], epsilon = 1e-9);
    }
}
