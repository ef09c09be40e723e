//! Log-Euclidean metric on SPD matrices.
//!
//! The metric pulled back from the Frobenius inner product on symmetric
//! matrices through the matrix logarithm, so that `logm` is an isometry
//! onto a flat space.

use std::marker::PhantomData;

use nalgebra::DMatrix;
use riemgeom_core::{
    error::{ManifoldError, Result},
    linalg,
    metric::RiemannianMetric,
    types::Scalar,
};

use crate::{
    spd::{differential_log_at, inverse_differential_log_at},
    utils::check_square,
};

/// Log-Euclidean metric on n×n SPD matrices.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SPDMetricLogEuclidean<T> {
    n: usize,
    #[cfg_attr(feature = "serde", serde(skip))]
    _phantom: PhantomData<T>,
}

impl<T: Scalar> SPDMetricLogEuclidean<T> {
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
}

impl<T: Scalar> RiemannianMetric<T> for SPDMetricLogEuclidean<T> {
    type Point = DMatrix<T>;

    fn inner_product_at(
        &self,
        tangent_vec_a: &DMatrix<T>,
        tangent_vec_b: &DMatrix<T>,
        base_point: &DMatrix<T>,
    ) -> Result<T> {
        self.check_shapes(&[tangent_vec_a, tangent_vec_b, base_point])?;
        let log_a = differential_log_at(tangent_vec_a, base_point)?;
        let log_b = differential_log_at(tangent_vec_b, base_point)?;
        Ok(linalg::trace_product(&log_a, &log_b))
    }

    fn exp_at(&self, tangent_vec: &DMatrix<T>, base_point: &DMatrix<T>) -> Result<DMatrix<T>> {
        self.check_shapes(&[tangent_vec, base_point])?;
        let log_base = linalg::logm(base_point)?;
        let dlog = differential_log_at(tangent_vec, base_point)?;
        linalg::expm(&linalg::symmetrize(&(log_base + dlog)))
    }

    fn log_at(&self, point: &DMatrix<T>, base_point: &DMatrix<T>) -> Result<DMatrix<T>> {
        self.check_shapes(&[point, base_point])?;
        let difference = linalg::logm(point)? - linalg::logm(base_point)?;
        inverse_differential_log_at(&difference, base_point)
    }

    fn squared_dist_at(&self, point_a: &DMatrix<T>, point_b: &DMatrix<T>) -> Result<T> {
        self.check_shapes(&[point_a, point_b])?;
        let difference = linalg::logm(point_b)? - linalg::logm(point_a)?;
        Ok(difference.norm_squared())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::DVector;
    use riemgeom_core::batch::Batch;

    #[test]
    fn test_inner_product() {
        let metric = SPDMetricLogEuclidean::<f64>::new(3).unwrap();
        let base = Batch::single(DMatrix::from_diagonal(&DVector::from_vec(vec![
            1.0, 1.0, 4.0,
        ])));
        let tangent = Batch::single(DMatrix::from_row_slice(
            3,
            3,
            &[1.0, 1.0, 3.0, 1.0, 1.0, 3.0, 3.0, 3.0, 4.0],
        ));

        let result = metric.inner_product(&tangent, &tangent, &base).unwrap();
        let x = 2.0 * 2.0_f64.ln();
        assert_relative_eq!(result[0], 5.0 + 4.0 * x * x, epsilon = 1e-10);
    }

    #[test]
    fn test_distance_between_commuting_points() {
        let metric = SPDMetricLogEuclidean::<f64>::new(2).unwrap();
        let a = Batch::single(DMatrix::from_diagonal(&DVector::from_vec(vec![1.0, 2.0])));
        let b = Batch::single(DMatrix::from_diagonal(&DVector::from_vec(vec![4.0, 2.0])));
        let dist = metric.dist(&a, &b).unwrap();
        assert_relative_eq!(dist[0], 4.0_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_exp_inverts_log() {
        let metric = SPDMetricLogEuclidean::<f64>::new(2).unwrap();
        let base = Batch::single(DMatrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5, 1.0]));
        let point = Batch::single(DMatrix::from_row_slice(2, 2, &[1.0, -0.2, -0.2, 3.0]));
        let log = metric.log(&point, &base).unwrap();
        let back = metric.exp(&log, &base).unwrap();
        assert_relative_eq!(back[0], point[0], epsilon = 1e-10);
    }
}
