use crate::{util::symmetrize, Precision};
use ndarray::{Array1, Array2};

/// Moments of a Gaussian output of a controller.
#[derive(Clone, Debug, PartialEq)]
pub struct Moments {
    /// Mean of the output, of length `k`.
    pub mean: Array1<f64>,

    /// Covariance of the output, `k x k`.
    pub cov: Array2<f64>,

    /// Input-output covariance, `n x k` where `n` is the input dimension.
    ///
    /// For a squashed output this is the covariance between the input and
    /// the output premultiplied by the inverse input covariance, as the
    /// planner consumes it.
    pub cross_cov: Array2<f64>,
}

impl Moments {
    /// Constructs [`Moments`], symmetrizing the covariance.
    pub fn new(mean: Array1<f64>, cov: Array2<f64>, cross_cov: Array2<f64>) -> Self {
        Self {
            mean,
            cov: symmetrize(&cov),
            cross_cov,
        }
    }

    /// Dimension of the output.
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Rounds all entries to the given precision.
    pub fn with_precision(self, precision: Precision) -> Self {
        Self {
            mean: precision.cast_array(self.mean),
            cov: precision.cast_array(self.cov),
            cross_cov: precision.cast_array(self.cross_cov),
        }
    }
}
