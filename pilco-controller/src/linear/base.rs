//! Affine controller.
use super::LinearControllerConfig;
use crate::util::{sample_normal, sample_uniform};
use anyhow::Result;
use log::{info, trace};
use ndarray::{Array1, Array2};
use pilco_core::{
    Configurable, Controller, MaxAction, Moments, Param, Parameterized, PilcoError, Precision,
};
use rand::{rngs::SmallRng, SeedableRng};

/// Affine controller `u = W x + b`.
///
/// For a Gaussian state `N(m, s)` the unsquashed action is Gaussian with mean
/// `W m + b` and covariance `W s W^T`; the input-output covariance is `W^T`.
#[derive(Clone, Debug)]
pub struct LinearController {
    w: Param,
    b: Param,
    max_action: Option<MaxAction>,
    precision: Precision,
    rng: SmallRng,
}

impl LinearController {
    /// Gain matrix `W`, `control_dim x state_dim`.
    pub fn w(&self) -> Array2<f64> {
        self.w.value()
    }

    /// Bias `b`.
    pub fn b(&self) -> Array1<f64> {
        self.b.value().row(0).to_owned()
    }

    /// Overwrites the gain matrix, e.g. with a gain designed by LQR.
    pub fn set_gain(&mut self, gain: Array2<f64>, trainable: bool) -> Result<()> {
        self.w.assign(self.precision.cast_array(gain))?;
        self.w.set_trainable(trainable);
        Ok(())
    }

    /// Overwrites the bias.
    pub fn set_bias(&mut self, bias: Array1<f64>) -> Result<()> {
        let n = bias.len();
        let bias = bias.into_shape((1, n))?;
        self.b.assign(self.precision.cast_array(bias))
    }

    /// Saturation limit used when squashing.
    pub fn max_action(&self) -> Option<&MaxAction> {
        self.max_action.as_ref()
    }
}

impl Configurable for LinearController {
    type Config = LinearControllerConfig;

    fn build(config: Self::Config) -> Result<Self> {
        let (n, k) = (config.state_dim, config.control_dim);
        let precision = config.precision;
        let mut rng = SmallRng::seed_from_u64(config.seed);
        if let Some(max_action) = &config.max_action {
            max_action.broadcast(k)?;
        }

        let (w, b) = match config.gain {
            Some(gain) => {
                if gain.dim() != (k, n) {
                    return Err(PilcoError::dimension("gain", &[k, n], gain.shape()).into());
                }
                (gain, Array2::zeros((1, k)))
            }
            None => {
                let w = sample_uniform(&mut rng, (k, n));
                let b = sample_uniform(&mut rng, (1, k));
                (w, b)
            }
        };
        info!(
            "Build linear controller: state_dim = {}, control_dim = {}, trainable = {}",
            n, k, config.trainable
        );

        Ok(Self {
            w: Param::free(precision.cast_array(w)).with_trainable(config.trainable),
            b: Param::free(precision.cast_array(b)).with_trainable(config.trainable),
            max_action: config.max_action,
            precision,
            rng,
        })
    }
}

impl Parameterized for LinearController {
    fn params(&self) -> Vec<(String, &Param)> {
        vec![("W".to_string(), &self.w), ("b".to_string(), &self.b)]
    }

    fn params_mut(&mut self) -> Vec<(String, &mut Param)> {
        vec![("W".to_string(), &mut self.w), ("b".to_string(), &mut self.b)]
    }

    fn precision(&self) -> Precision {
        self.precision
    }
}

impl Controller for LinearController {
    fn state_dim(&self) -> usize {
        self.w.shape().1
    }

    fn control_dim(&self) -> usize {
        self.w.shape().0
    }

    fn compute_action(
        &self,
        mean: &Array1<f64>,
        cov: &Array2<f64>,
        squash: bool,
    ) -> Result<Moments> {
        self.check_belief(mean, cov)?;
        let w = self.w.value();

        let m = w.dot(mean) + self.b();
        let s = w.dot(cov).dot(&w.t());
        let v = w.t().to_owned();
        trace!("Linear controller: mean = {:?}, cov = {:?}", m, s);

        let out = Moments::new(m, s, v);
        let out = match squash {
            true => out.squashed(self.max_action.as_ref())?,
            false => out,
        };
        Ok(out.with_precision(self.precision))
    }

    fn randomize(&mut self) -> Result<()> {
        info!("Randomize linear controller");
        let w = sample_normal(&mut self.rng, self.w.shape(), 0.0, 1.0)?;
        let b = sample_normal(&mut self.rng, self.b.shape(), 0.0, 1.0)?;
        self.w.assign(self.precision.cast_array(w))?;
        self.b.assign(self.precision.cast_array(b))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::{arr1, arr2};
    use pilco_core::NamedParams;
    use test_log::test;

    fn controller() -> Result<LinearController> {
        let config = LinearControllerConfig::new(2, 1)
            .gain(arr2(&[[1.0, 0.0]]))
            .max_action(2.0);
        LinearController::build(config)
    }

    #[test]
    fn test_unsquashed() -> Result<()> {
        let c = controller()?;
        let out = c.compute_action(&arr1(&[0.0, 0.0]), &Array2::eye(2), false)?;
        assert_eq!(out.mean, arr1(&[0.0]));
        assert_eq!(out.cov, arr2(&[[1.0]]));
        assert_eq!(out.cross_cov, arr2(&[[1.0], [0.0]]));
        Ok(())
    }

    #[test]
    fn test_squashed() -> Result<()> {
        let c = controller()?;
        let out = c.compute_action(&arr1(&[0.0, 0.0]), &Array2::eye(2), true)?;
        assert_eq!(out.mean, arr1(&[0.0]));
        assert!((out.cov[[0, 0]] - 1.729_329_433_526_766_4).abs() < 1e-12);
        assert!((out.cross_cov[[0, 0]] - 1.213_061_319_425_267).abs() < 1e-12);
        assert_eq!(out.cross_cov[[1, 0]], 0.0);
        Ok(())
    }

    #[test]
    fn test_deterministic_state() -> Result<()> {
        let mut c = controller()?;
        c.set_gain(arr2(&[[0.3, -1.2]]), true)?;
        c.set_bias(arr1(&[0.5]))?;
        let out = c.compute_action(&arr1(&[1.0, 2.0]), &Array2::zeros((2, 2)), false)?;
        assert!((out.mean[0] - (0.3 - 2.4 + 0.5)).abs() < 1e-12);
        assert_eq!(out.cov, arr2(&[[0.0]]));
        Ok(())
    }

    #[test]
    fn test_dimension_error() -> Result<()> {
        let c = controller()?;
        let err = c
            .compute_action(&arr1(&[0.0, 0.0, 0.0]), &Array2::eye(3), false)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PilcoError>(),
            Some(PilcoError::Dimension { .. })
        ));

        let err = c
            .compute_action(&arr1(&[0.0, 0.0]), &Array2::eye(3), false)
            .unwrap_err();
        assert!(err.downcast_ref::<PilcoError>().is_some());
        Ok(())
    }

    #[test]
    fn test_randomize() -> Result<()> {
        let mut c = controller()?;
        let w = c.w();
        c.randomize()?;
        assert_ne!(c.w(), w);
        assert_eq!(c.w().dim(), (1, 2));
        assert_eq!(c.b().len(), 1);
        Ok(())
    }

    #[test]
    fn test_gain_shape() {
        let config = LinearControllerConfig::new(2, 1).gain(arr2(&[[1.0], [0.0]]));
        assert!(LinearController::build(config).is_err());
    }

    #[test]
    fn test_precision() -> Result<()> {
        let config = LinearControllerConfig::new(2, 1).precision(Precision::F32);
        let c = LinearController::build(config)?;
        let out = c.compute_action(&arr1(&[0.1, 0.2]), &(Array2::eye(2) * 0.3), true)?;
        assert_eq!(out.mean[0], out.mean[0] as f32 as f64);
        assert_eq!(out.cov[[0, 0]], out.cov[[0, 0]] as f32 as f64);
        assert!(c.w().iter().all(|v| *v == *v as f32 as f64));
        Ok(())
    }

    #[test]
    fn test_set_named_params_precision() -> Result<()> {
        let config = LinearControllerConfig::new(2, 1).precision(Precision::F32);
        let mut c = LinearController::build(config)?;
        let mut src = NamedParams::default();
        src.insert("W", arr2(&[[0.1, 0.7]]));
        c.set_named_params(&src)?;
        assert_eq!(c.w(), arr2(&[[0.1f32 as f64, 0.7f32 as f64]]));
        Ok(())
    }
}
