//! Tests for Riemannian metric properties.
//!
//! This test module verifies the batched operations provided on top of a
//! metric's pointwise kernels: broadcasting, symmetry of distances and the
//! consistency between norms, distances and geodesics.

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use riemgeom_core::{
    batch::Batch,
    error::{ManifoldError, Result},
    metric::RiemannianMetric,
    types::DVector,
};

/// Flat metric with a constant diagonal weight matrix.
#[derive(Debug)]
struct WeightedMetric {
    weights: DVector<f64>,
}

impl WeightedMetric {
    fn new(weights: Vec<f64>) -> Self {
        Self {
            weights: DVector::from_vec(weights),
        }
    }
}

impl RiemannianMetric<f64> for WeightedMetric {
    type Point = DVector<f64>;

    fn inner_product_at(
        &self,
        a: &DVector<f64>,
        b: &DVector<f64>,
        _base: &DVector<f64>,
    ) -> Result<f64> {
        if a.len() != self.weights.len() || b.len() != self.weights.len() {
            return Err(ManifoldError::dimension_mismatch(self.weights.len(), a.len()));
        }
        Ok(a.component_mul(&self.weights).dot(b))
    }

    fn exp_at(&self, v: &DVector<f64>, p: &DVector<f64>) -> Result<DVector<f64>> {
        Ok(p + v)
    }

    fn log_at(&self, q: &DVector<f64>, p: &DVector<f64>) -> Result<DVector<f64>> {
        Ok(q - p)
    }
}

fn batch(rows: &[Vec<f64>]) -> Batch<DVector<f64>> {
    Batch::new(rows.iter().map(|r| DVector::from_vec(r.clone())).collect()).unwrap()
}

#[test]
fn test_weighted_inner_product() {
    let metric = WeightedMetric::new(vec![1.0, 4.0]);
    let v = batch(&[vec![1.0, 1.0], vec![2.0, 0.5]]);
    let base = batch(&[vec![0.0, 0.0]]);

    let result = metric.inner_product(&v, &v, &base).unwrap();
    assert_eq!(result.shape(), (2, 1));
    assert_relative_eq!(result[0], 5.0);
    assert_relative_eq!(result[1], 5.0);

    let norms = metric.norm(&v, &base).unwrap();
    assert_relative_eq!(norms[0], 5.0_f64.sqrt());
}

#[test]
fn test_dimension_errors_propagate_from_kernels() {
    let metric = WeightedMetric::new(vec![1.0, 1.0, 1.0]);
    let v = batch(&[vec![1.0, 1.0]]);
    assert!(matches!(
        metric.squared_norm(&v, &v),
        Err(ManifoldError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_one_vs_many_distances() {
    let metric = WeightedMetric::new(vec![1.0, 1.0]);
    let origin = batch(&[vec![0.0, 0.0]]);
    let many = batch(&[vec![3.0, 4.0], vec![0.0, 1.0], vec![6.0, 8.0], vec![1.0, 0.0]]);

    let forward = metric.dist(&origin, &many).unwrap();
    let backward = metric.dist(&many, &origin).unwrap();
    assert_eq!(forward.shape(), (4, 1));
    assert_relative_eq!(forward, backward);
    assert_relative_eq!(forward[2], 10.0);
}

#[test]
fn test_geodesic_through_batched_metric() {
    let metric = WeightedMetric::new(vec![2.0, 1.0]);
    let start = batch(&[vec![0.0, 0.0], vec![1.0, 1.0]]);
    let end = batch(&[vec![2.0, 2.0]]);

    let geodesic = metric.geodesic(&start, Some(&end), None).unwrap();
    assert_eq!(geodesic.n_geodesics(), 2);

    let midpoints = geodesic.point_at(0.5).unwrap();
    assert_relative_eq!(midpoints[0], DVector::from_vec(vec![1.0, 1.0]));
    assert_relative_eq!(midpoints[1], DVector::from_vec(vec![1.5, 1.5]));
}

fn arb_vector(dim: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-10.0..10.0f64, dim)
}

proptest! {
    #[test]
    fn prop_squared_dist_is_symmetric(
        a in prop::collection::vec(arb_vector(3), 1..6),
        b in arb_vector(3),
    ) {
        let metric = WeightedMetric::new(vec![0.5, 1.0, 2.0]);
        let many = batch(&a);
        let one = batch(&[b]);

        let ab = metric.squared_dist(&many, &one).unwrap();
        let ba = metric.squared_dist(&one, &many).unwrap();
        prop_assert_eq!(ab.len(), a.len());
        for i in 0..ab.len() {
            prop_assert!((ab[i] - ba[i]).abs() <= 1e-9 * (1.0 + ab[i]));
        }
    }

    #[test]
    fn prop_squared_norm_of_log_is_squared_dist(
        a in arb_vector(3),
        b in arb_vector(3),
    ) {
        let metric = WeightedMetric::new(vec![0.5, 1.0, 2.0]);
        let pa = batch(&[a]);
        let pb = batch(&[b]);

        let log = metric.log(&pb, &pa).unwrap();
        let sq_norm = metric.squared_norm(&log, &pa).unwrap();
        let dist = metric.dist(&pa, &pb).unwrap();
        prop_assert!((sq_norm[0] - dist[0] * dist[0]).abs() <= 1e-9 * (1.0 + sq_norm[0]));
    }

    #[test]
    fn prop_mismatched_batches_fail(n in 2usize..6, m in 2usize..6) {
        prop_assume!(n != m);
        let metric = WeightedMetric::new(vec![1.0]);
        let a = batch(&vec![vec![0.0]; n]);
        let b = batch(&vec![vec![1.0]; m]);
        let is_broadcast_error = matches!(
            metric.squared_dist(&a, &b),
            Err(ManifoldError::BroadcastMismatch { .. })
        );
        prop_assert!(is_broadcast_error);
    }
}
