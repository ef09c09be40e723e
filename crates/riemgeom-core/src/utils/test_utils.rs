//! Test utilities for checking geometric identities on batches.
//!
//! These helpers are shared by the unit tests of this crate and, behind the
//! `test-utils` feature, by the integration tests of the manifold crates.

#![cfg(any(test, feature = "test-utils"))]

use crate::{
    batch::{broadcast_len, Batch},
    error::Result,
    linalg::symmetrize,
    types::{DMatrix, PointArray, Scalar},
};
use num_traits::Float;
use rand::{distributions::Uniform, rngs::StdRng, Rng, SeedableRng};

// Re-export test manifolds for use in other crates
pub use crate::utils::test_manifolds::{TestEuclideanManifold, TestEuclideanMetric};

/// Deterministic generator for reproducible tests.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Largest entrywise absolute difference between two broadcast batches.
///
/// Elements of different shapes compare as infinitely far apart.
pub fn max_abs_difference<T, E>(a: &Batch<E>, b: &Batch<E>) -> Result<T>
where
    T: Scalar,
    E: PointArray<T>,
{
    let n = broadcast_len(&[a.len(), b.len()])?;
    let mut max_error = T::zero();
    for i in 0..n {
        let (x, y) = (a.broadcast_get(i), b.broadcast_get(i));
        if x.shape() != y.shape() {
            return Ok(T::infinity());
        }
        for (&u, &v) in x.values().iter().zip(y.values()) {
            max_error = Float::max(max_error, <T as Float>::abs(u - v));
        }
    }
    Ok(max_error)
}

/// Panics unless two batches agree entrywise within `tolerance`.
pub fn assert_batches_close<T, E>(actual: &Batch<E>, expected: &Batch<E>, tolerance: T)
where
    T: Scalar,
    E: PointArray<T>,
{
    match max_abs_difference(actual, expected) {
        Ok(error) => assert!(
            error <= tolerance,
            "batches differ: max error = {} > tolerance = {}\nactual: {:?}\nexpected: {:?}",
            error,
            tolerance,
            actual,
            expected
        ),
        Err(e) => panic!("batches cannot be compared: {}", e),
    }
}

/// Random symmetric `n × n` matrix with entries of `B + Bᵀ`, `B` uniform in
/// `[-scale, scale]`.
pub fn random_symmetric<T: Scalar, R: Rng + ?Sized>(rng: &mut R, n: usize, scale: f64) -> DMatrix<T> {
    let uniform = Uniform::new_inclusive(-scale, scale);
    let b = DMatrix::from_fn(n, n, |_, _| <T as Scalar>::from_f64(rng.sample(uniform)));
    symmetrize(&b) * <T as Scalar>::from_f64(2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DVector;

    #[test]
    fn test_max_abs_difference_broadcasts() {
        let a = Batch::single(DVector::from_vec(vec![1.0, 2.0]));
        let b = Batch::new(vec![
            DVector::from_vec(vec![1.0, 2.5]),
            DVector::from_vec(vec![0.0, 2.0]),
        ])
        .unwrap();
        let error: f64 = max_abs_difference(&a, &b).unwrap();
        assert_eq!(error, 1.0);
    }

    #[test]
    fn test_random_symmetric_is_symmetric() {
        let mut rng = seeded_rng(3);
        let m: DMatrix<f64> = random_symmetric(&mut rng, 4, 1.0);
        assert_eq!(m, m.transpose());
    }
}
