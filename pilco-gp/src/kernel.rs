//! Squared-exponential kernel with automatic relevance determination.
use anyhow::Result;
use ndarray::{Array1, Array2};
use pilco_core::{Param, PilcoError, Transform};

/// Squared-exponential kernel `k(x, y) = v exp(-|(x - y) / l|^2 / 2)`,
/// with one length-scale per input dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct RbfKernel {
    lengthscales: Param,
    variance: Param,
}

impl RbfKernel {
    /// Unit length-scales and unit variance.
    pub fn new(input_dim: usize) -> Result<Self> {
        Ok(Self {
            lengthscales: Param::new(Array2::ones((1, input_dim)), Transform::positive())?,
            variance: Param::new(Array2::ones((1, 1)), Transform::positive())?,
        })
    }

    /// Input dimension.
    pub fn input_dim(&self) -> usize {
        self.lengthscales.shape().1
    }

    /// Length-scales.
    pub fn lengthscales(&self) -> Array1<f64> {
        self.lengthscales.value().row(0).to_owned()
    }

    /// Signal variance.
    pub fn variance(&self) -> f64 {
        self.variance.value()[[0, 0]]
    }

    /// Length-scale parameter, `1 x input_dim`.
    pub fn lengthscales_param(&self) -> &Param {
        &self.lengthscales
    }

    /// Length-scale parameter, mutably.
    pub fn lengthscales_param_mut(&mut self) -> &mut Param {
        &mut self.lengthscales
    }

    /// Signal variance parameter, `1 x 1`.
    pub fn variance_param(&self) -> &Param {
        &self.variance
    }

    /// Signal variance parameter, mutably.
    pub fn variance_param_mut(&mut self) -> &mut Param {
        &mut self.variance
    }

    /// Length-scale and variance parameters, mutably.
    pub fn params_pair_mut(&mut self) -> (&mut Param, &mut Param) {
        (&mut self.lengthscales, &mut self.variance)
    }

    /// Gram matrix between the rows of `x1` and `x2`.
    pub fn k(&self, x1: &Array2<f64>, x2: &Array2<f64>) -> Result<Array2<f64>> {
        let d = self.input_dim();
        if x1.ncols() != d || x2.ncols() != d {
            return Err(PilcoError::dimension(
                "kernel inputs",
                &[x1.nrows(), d],
                &[x1.ncols(), x2.ncols()],
            )
            .into());
        }
        let l = self.lengthscales();
        let v = self.variance();
        let x1 = x1 / &l;
        let x2 = x2 / &l;

        Ok(Array2::from_shape_fn((x1.nrows(), x2.nrows()), |(i, j)| {
            let r2: f64 = x1
                .row(i)
                .iter()
                .zip(x2.row(j).iter())
                .map(|(a, b)| (a - b) * (a - b))
                .sum();
            v * (-r2 / 2.0).exp()
        }))
    }
}
