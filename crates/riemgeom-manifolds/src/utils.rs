//! Shape checks and row/vector conversions shared by the manifolds.

use nalgebra::{DMatrix, DVector};
use riemgeom_core::{
    error::{ManifoldError, Result},
    types::Scalar,
};

/// Checks that a vector has length `len`.
#[inline]
pub fn check_vector_len<T: Scalar>(vector: &DVector<T>, len: usize) -> Result<()> {
    if vector.len() == len {
        Ok(())
    } else {
        Err(ManifoldError::dimension_mismatch(
            format!("vector of length {len}"),
            format!("vector of length {}", vector.len()),
        ))
    }
}

/// Checks that a matrix is `n × n`.
#[inline]
pub fn check_square<T: Scalar>(matrix: &DMatrix<T>, n: usize) -> Result<()> {
    riemgeom_core::linalg::ensure_shape(matrix, n, n)
}

/// Validates a membership tolerance, which must lie in `(0, 1)`.
pub fn validate_tolerance<T: Scalar>(tolerance: T) -> Result<T> {
    if tolerance > T::zero() && tolerance < T::one() {
        Ok(tolerance)
    } else {
        Err(ManifoldError::invalid_parameter(format!(
            "tolerance must be in (0, 1), got {tolerance}"
        )))
    }
}

/// Row `k` of a matrix as a column vector.
#[inline]
pub fn row_vector<T: Scalar>(matrix: &DMatrix<T>, k: usize) -> DVector<T> {
    matrix.row(k).transpose()
}

/// Stacks column vectors as the rows of a matrix.
pub fn stack_rows<T: Scalar>(rows: &[DVector<T>]) -> Result<DMatrix<T>> {
    let Some(first) = rows.first() else {
        return Err(ManifoldError::invalid_parameter(
            "cannot stack an empty sequence of rows",
        ));
    };
    for row in rows {
        check_vector_len(row, first.len())?;
    }
    Ok(DMatrix::from_fn(rows.len(), first.len(), |i, j| rows[i][j]))
}
