//! Sampling of parameter values.
use anyhow::Result;
use ndarray::Array2;
use pilco_core::PilcoError;
use rand::{rngs::SmallRng, Rng};
use rand_distr::{Distribution, Normal};

/// Samples a matrix from `N(mean, std^2)` elementwise.
pub(crate) fn sample_normal(
    rng: &mut SmallRng,
    shape: (usize, usize),
    mean: f64,
    std: f64,
) -> Result<Array2<f64>> {
    let normal = Normal::new(mean, std).map_err(|e| PilcoError::InvalidValue(e.to_string()))?;
    Ok(Array2::from_shape_fn(shape, |_| normal.sample(rng)))
}

/// Samples a matrix from `U[0, 1)` elementwise.
pub(crate) fn sample_uniform(rng: &mut SmallRng, shape: (usize, usize)) -> Array2<f64> {
    Array2::from_shape_fn(shape, |_| rng.gen::<f64>())
}
