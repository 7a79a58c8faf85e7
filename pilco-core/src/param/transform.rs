//! Bijections between unconstrained and constrained parameter values.
use crate::{
    util::{from_dmatrix, to_dmatrix},
    PilcoError,
};
use anyhow::Result;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Default lower bound of positive transforms.
pub const DEFAULT_LOWER: f64 = 1e-6;

/// Map from the unconstrained representation of a [`Param`](super::Param)
/// to its constrained value.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum Transform {
    /// No constraint.
    Identity,

    /// Elementwise `exp(x)`.
    Exp,

    /// Elementwise `softplus(x) + lower`.
    Positive {
        /// Lower bound of the value.
        lower: f64,
    },

    /// Symmetric positive-definite matrix `L L^T`.
    ///
    /// The unconstrained value is a lower-triangular matrix whose diagonal
    /// holds the logarithm of the diagonal of `L`. The upper triangle is ignored.
    PositiveDefinite,

    /// Diagonal matrix with `softplus(x_ii) + lower` on the diagonal.
    ///
    /// Off-diagonal entries of the unconstrained value are ignored.
    DiagPositive {
        /// Lower bound of the diagonal.
        lower: f64,
    },
}

impl Default for Transform {
    fn default() -> Self {
        Self::Identity
    }
}

fn softplus(x: f64) -> f64 {
    x.max(0.0) + (-x.abs()).exp().ln_1p()
}

fn softplus_inv(y: f64) -> f64 {
    y + (-(-y).exp()).ln_1p()
}

fn check_square(x: &Array2<f64>, context: &str) -> Result<()> {
    if !x.is_square() {
        let n = x.nrows();
        return Err(PilcoError::dimension(context, &[n, n], x.shape()).into());
    }
    Ok(())
}

impl Transform {
    /// Softplus transform with the default lower bound.
    pub fn positive() -> Self {
        Self::Positive {
            lower: DEFAULT_LOWER,
        }
    }

    /// Diagonal softplus transform with the default lower bound.
    pub fn diag_positive() -> Self {
        Self::DiagPositive {
            lower: DEFAULT_LOWER,
        }
    }

    /// Maps an unconstrained value to the constrained value.
    pub fn forward(&self, x: &Array2<f64>) -> Array2<f64> {
        match self {
            Self::Identity => x.clone(),
            Self::Exp => x.mapv(f64::exp),
            Self::Positive { lower } => x.mapv(|v| softplus(v) + lower),
            Self::PositiveDefinite => {
                let n = x.nrows();
                let l = Array2::from_shape_fn((n, n), |(i, j)| match i.cmp(&j) {
                    std::cmp::Ordering::Less => 0.0,
                    std::cmp::Ordering::Equal => x[[i, i]].exp(),
                    std::cmp::Ordering::Greater => x[[i, j]],
                });
                l.dot(&l.t())
            }
            Self::DiagPositive { lower } => {
                let n = x.nrows();
                Array2::from_shape_fn((n, n), |(i, j)| match i == j {
                    true => softplus(x[[i, i]]) + lower,
                    false => 0.0,
                })
            }
        }
    }

    /// Maps a constrained value back to the unconstrained representation.
    pub fn inverse(&self, y: &Array2<f64>) -> Result<Array2<f64>> {
        match self {
            Self::Identity => Ok(y.clone()),
            Self::Exp => {
                if y.iter().any(|v| *v <= 0.0) {
                    return Err(PilcoError::InvalidValue(format!(
                        "exp transform requires positive values: {:?}",
                        y
                    ))
                    .into());
                }
                Ok(y.mapv(f64::ln))
            }
            Self::Positive { lower } => {
                if y.iter().any(|v| *v <= *lower) {
                    return Err(PilcoError::InvalidValue(format!(
                        "positive transform requires values above {}: {:?}",
                        lower, y
                    ))
                    .into());
                }
                Ok(y.mapv(|v| softplus_inv(v - lower)))
            }
            Self::PositiveDefinite => {
                check_square(y, "positive-definite transform")?;
                let chol = to_dmatrix(&y.view()).cholesky().ok_or_else(|| {
                    PilcoError::InvalidValue(format!("matrix is not positive definite: {:?}", y))
                })?;
                let mut x = from_dmatrix(&chol.l());
                for i in 0..x.nrows() {
                    x[[i, i]] = x[[i, i]].ln();
                }
                Ok(x)
            }
            Self::DiagPositive { lower } => {
                check_square(y, "diagonal transform")?;
                let n = y.nrows();
                let mut x = Array2::zeros((n, n));
                for i in 0..n {
                    for j in 0..n {
                        let v = y[[i, j]];
                        if i == j && v <= *lower {
                            return Err(PilcoError::InvalidValue(format!(
                                "diagonal must be above {}: {:?}",
                                lower, y
                            ))
                            .into());
                        }
                        if i != j && v != 0.0 {
                            return Err(PilcoError::InvalidValue(format!(
                                "matrix is not diagonal: {:?}",
                                y
                            ))
                            .into());
                        }
                    }
                    x[[i, i]] = softplus_inv(y[[i, i]] - lower);
                }
                Ok(x)
            }
        }
    }
}
