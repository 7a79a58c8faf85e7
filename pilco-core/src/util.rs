//! Utilities for small dense matrices.
use crate::PilcoError;
use anyhow::Result;
use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Returns `(a + a^T) / 2`.
pub fn symmetrize(a: &Array2<f64>) -> Array2<f64> {
    (a + &a.t()) * 0.5
}

/// Returns the outer product `x y^T`.
pub fn outer(x: &ArrayView1<f64>, y: &ArrayView1<f64>) -> Array2<f64> {
    Array2::from_shape_fn((x.len(), y.len()), |(i, j)| x[i] * y[j])
}

/// Converts a 2-D array into a matrix of `nalgebra`.
pub fn to_dmatrix(a: &ArrayView2<f64>) -> DMatrix<f64> {
    let (r, c) = a.dim();
    DMatrix::from_fn(r, c, |i, j| a[[i, j]])
}

/// Converts a matrix of `nalgebra` into a 2-D array.
pub fn from_dmatrix(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

/// Solves `a x = b` with LU decomposition and returns `(x, det(a))`.
pub fn solve_with_det(a: &Array2<f64>, b: &Array2<f64>) -> Result<(Array2<f64>, f64)> {
    if !a.is_square() || a.nrows() != b.nrows() {
        return Err(PilcoError::dimension("linear solve", &[a.nrows(), a.nrows()], a.shape()).into());
    }
    let lu = to_dmatrix(&a.view()).lu();
    let det = lu.determinant();
    let x = lu
        .solve(&to_dmatrix(&b.view()))
        .ok_or_else(|| PilcoError::Numerical("singular matrix in linear solve".to_string()))?;
    Ok((from_dmatrix(&x), det))
}

/// Inverts a symmetric positive-definite matrix with Cholesky decomposition.
pub fn spd_inverse(a: &Array2<f64>) -> Result<Array2<f64>> {
    let chol = to_dmatrix(&a.view())
        .cholesky()
        .ok_or_else(|| PilcoError::Numerical("matrix is not positive definite".to_string()))?;
    Ok(from_dmatrix(&chol.inverse()))
}

/// Returns the diagonal of a square matrix as a vector.
pub fn diag_part(a: &Array2<f64>) -> Array1<f64> {
    a.diag().to_owned()
}
