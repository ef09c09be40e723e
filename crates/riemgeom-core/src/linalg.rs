//! Dense symmetric linear algebra over `nalgebra`.
//!
//! Every matrix function used by the matrix manifolds is a spectral function
//! of a symmetric matrix: it is evaluated through one symmetric
//! eigendecomposition `P = U diag(λ) Uᵀ` as `U diag(f(λ)) Uᵀ`. The Fréchet
//! derivative of such a function has the same structure, with the
//! divided-difference matrix `(f(λi) − f(λj)) / (λi − λj)` acting entrywise in
//! the eigenbasis (see [`spectral_differential`]).
//!
//! Inputs are assumed symmetric; only their lower triangle is read by the
//! eigendecomposition.

use crate::{
    error::{ManifoldError, Result},
    types::{DMatrix, DVector, Scalar},
};
use nalgebra::{Dyn, SymmetricEigen};
use num_traits::Float;

/// Direction of a spectral differential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Apply the differential `df_P`.
    Forward,
    /// Apply the inverse differential `(df_P)⁻¹`.
    Inverse,
}

/// Checks that `matrix` has shape `(rows, cols)`.
pub fn ensure_shape<T: Scalar>(matrix: &DMatrix<T>, rows: usize, cols: usize) -> Result<()> {
    if matrix.shape() == (rows, cols) {
        Ok(())
    } else {
        Err(ManifoldError::dimension_mismatch(
            format!("({rows}, {cols})"),
            format!("({}, {})", matrix.nrows(), matrix.ncols()),
        ))
    }
}

fn ensure_square<T: Scalar>(matrix: &DMatrix<T>) -> Result<()> {
    ensure_shape(matrix, matrix.nrows(), matrix.nrows())
}

/// Symmetric eigendecomposition.
///
/// # Errors
///
/// `NumericalError` if the matrix has non-finite entries or the iteration does
/// not converge; `DimensionMismatch` if it is not square.
pub fn eigh<T: Scalar>(matrix: &DMatrix<T>) -> Result<SymmetricEigen<T, Dyn>> {
    ensure_square(matrix)?;
    if matrix.iter().any(|x| !Float::is_finite(*x)) {
        return Err(ManifoldError::numerical_error(
            "cannot decompose a matrix with non-finite entries",
        ));
    }
    matrix
        .clone()
        .try_symmetric_eigen(<T as Scalar>::EPSILON, T::MAX_EIGEN_ITERATIONS)
        .ok_or_else(|| {
            tracing::debug!(
                n = matrix.nrows(),
                max_iterations = T::MAX_EIGEN_ITERATIONS,
                "symmetric eigendecomposition did not converge"
            );
            ManifoldError::numerical_error("symmetric eigendecomposition did not converge")
        })
}

/// Returns `U diag(values) Uᵀ`, symmetrized.
fn reconstruct<T: Scalar>(eigenvectors: &DMatrix<T>, values: &DVector<T>) -> DMatrix<T> {
    let mut scaled = eigenvectors.clone();
    for (j, mut column) in scaled.column_iter_mut().enumerate() {
        column *= values[j];
    }
    symmetrize(&(scaled * eigenvectors.transpose()))
}

fn require_positive<T: Scalar>(eigenvalues: &DVector<T>, operation: &str) -> Result<()> {
    if eigenvalues.iter().all(|&l| l > T::zero()) {
        Ok(())
    } else {
        Err(ManifoldError::numerical_error(format!(
            "{operation} requires a positive-definite matrix"
        )))
    }
}

/// Applies a scalar function to the spectrum of a symmetric matrix.
pub fn apply_spectral<T, F>(matrix: &DMatrix<T>, f: F) -> Result<DMatrix<T>>
where
    T: Scalar,
    F: Fn(T) -> T,
{
    let eig = eigh(matrix)?;
    let values = eig.eigenvalues.map(|l| f(l));
    Ok(reconstruct(&eig.eigenvectors, &values))
}

/// Matrix exponential of a symmetric matrix.
pub fn expm<T: Scalar>(matrix: &DMatrix<T>) -> Result<DMatrix<T>> {
    apply_spectral(matrix, <T as Float>::exp)
}

/// Principal matrix logarithm of an SPD matrix.
pub fn logm<T: Scalar>(matrix: &DMatrix<T>) -> Result<DMatrix<T>> {
    let eig = eigh(matrix)?;
    require_positive(&eig.eigenvalues, "matrix logarithm")?;
    Ok(reconstruct(
        &eig.eigenvectors,
        &eig.eigenvalues.map(<T as Float>::ln),
    ))
}

/// Principal square root of an SPD matrix.
pub fn sqrtm<T: Scalar>(matrix: &DMatrix<T>) -> Result<DMatrix<T>> {
    powerm(matrix, <T as Scalar>::from_f64(0.5))
}

/// Inverse principal square root of an SPD matrix.
pub fn inv_sqrtm<T: Scalar>(matrix: &DMatrix<T>) -> Result<DMatrix<T>> {
    powerm(matrix, <T as Scalar>::from_f64(-0.5))
}

/// Real power of a symmetric matrix.
///
/// Integer powers accept any invertible symmetric matrix (any symmetric matrix
/// for non-negative integers); other powers require positive eigenvalues.
pub fn powerm<T: Scalar>(matrix: &DMatrix<T>, power: T) -> Result<DMatrix<T>> {
    let eig = eigh(matrix)?;
    let integer_power = <T as Float>::fract(power) == T::zero();
    if !integer_power {
        require_positive(&eig.eigenvalues, "a non-integer matrix power")?;
    }
    let values = eig.eigenvalues.map(|l| <T as Float>::powf(l, power));
    if values.iter().any(|v| !Float::is_finite(*v)) {
        return Err(ManifoldError::numerical_error(
            "matrix power of a singular matrix",
        ));
    }
    Ok(reconstruct(&eig.eigenvectors, &values))
}

/// Matrix inverse.
pub fn inverse<T: Scalar>(matrix: &DMatrix<T>) -> Result<DMatrix<T>> {
    ensure_square(matrix)?;
    matrix
        .clone()
        .try_inverse()
        .ok_or_else(|| ManifoldError::numerical_error("matrix is singular"))
}

/// `tr(AB)`.
pub fn trace_product<T: Scalar>(a: &DMatrix<T>, b: &DMatrix<T>) -> T {
    a.iter()
        .zip(b.transpose().iter())
        .fold(T::zero(), |acc, (&x, &y)| acc + x * y)
}

/// `(M + Mᵀ) / 2`.
pub fn symmetrize<T: Scalar>(matrix: &DMatrix<T>) -> DMatrix<T> {
    (matrix + matrix.transpose()) * <T as Scalar>::from_f64(0.5)
}

/// Whether `matrix` is symmetric up to a tolerance relative to its norm.
pub fn is_symmetric<T: Scalar>(matrix: &DMatrix<T>, tolerance: T) -> bool {
    if !matrix.is_square() {
        return false;
    }
    let scale = Float::max(matrix.norm(), T::one());
    (matrix - matrix.transpose()).norm() <= tolerance * scale
}

/// Checks that `tangent` is a symmetric matrix shaped like `base`.
///
/// # Errors
///
/// `DimensionMismatch` on a shape mismatch, `InvalidTangent` if `tangent` is
/// not symmetric to [`Scalar::BELONGS_TOLERANCE`].
pub fn ensure_symmetric_tangent<T: Scalar>(tangent: &DMatrix<T>, base: &DMatrix<T>) -> Result<()> {
    ensure_shape(tangent, base.nrows(), base.ncols())?;
    if !is_symmetric(tangent, T::BELONGS_TOLERANCE) {
        return Err(ManifoldError::invalid_tangent(
            "tangent vector must be a symmetric matrix",
        ));
    }
    Ok(())
}

/// Divided difference `(f(a) − f(b)) / (a − b)`, or `f'` at the midpoint when
/// `a` and `b` coincide to [`Scalar::EIGEN_GAP_TOLERANCE`].
fn divided_difference<T, DF>(a: T, b: T, fa: T, fb: T, df: &DF) -> T
where
    T: Scalar,
    DF: Fn(T) -> T,
{
    let scale = Float::max(
        Float::max(<T as Float>::abs(a), <T as Float>::abs(b)),
        T::one(),
    );
    if <T as Float>::abs(a - b) <= T::EIGEN_GAP_TOLERANCE * scale {
        df((a + b) * <T as Scalar>::from_f64(0.5))
    } else {
        (fa - fb) / (a - b)
    }
}

/// Differential of the spectral function `f` at `base`, applied to `tangent`.
///
/// `tangent` is rotated into the eigenbasis of `base`, multiplied
/// ([`Direction::Forward`]) or divided ([`Direction::Inverse`]) entrywise by
/// the divided-difference matrix of `f`, and rotated back. `df` is the scalar
/// derivative of `f`.
///
/// # Errors
///
/// `DimensionMismatch` if the shapes differ, `InvalidTangent` if `tangent` is
/// not symmetric, `NumericalError` if the decomposition fails or, for the
/// inverse, if the differential is singular.
pub fn spectral_differential<T, F, DF>(
    tangent: &DMatrix<T>,
    base: &DMatrix<T>,
    f: F,
    df: DF,
    direction: Direction,
) -> Result<DMatrix<T>>
where
    T: Scalar,
    F: Fn(T) -> T,
    DF: Fn(T) -> T,
{
    ensure_symmetric_tangent(tangent, base)?;
    let eig = eigh(base)?;
    let lambda = &eig.eigenvalues;
    let u = &eig.eigenvectors;
    let values = lambda.map(|l| f(l));
    let n = lambda.len();

    let kernel = DMatrix::from_fn(n, n, |i, j| {
        divided_difference(lambda[i], lambda[j], values[i], values[j], &df)
    });

    let rotated = u.transpose() * tangent * u;
    let scaled = match direction {
        Direction::Forward => rotated.component_mul(&kernel),
        Direction::Inverse => {
            if kernel
                .iter()
                .any(|&k| k == T::zero() || !Float::is_finite(k))
            {
                return Err(ManifoldError::numerical_error(
                    "differential is not invertible at this base point",
                ));
            }
            rotated.component_div(&kernel)
        }
    };
    Ok(symmetrize(&(u * scaled * u.transpose())))
}
