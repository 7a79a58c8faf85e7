//! RBF controller.
use super::RbfControllerConfig;
use crate::util::sample_normal;
use anyhow::Result;
use log::{info, trace};
use ndarray::{Array1, Array2};
use pilco_core::{
    Configurable, Controller, MaxAction, Moments, Param, Parameterized, PilcoError, Precision,
};
use pilco_gp::Mgpr;
use rand::{rngs::SmallRng, SeedableRng};

/// Jitter kept on the diagonal of the action covariance.
const VARIANCE_JITTER: f64 = 1e-6;

/// Controller represented by a deterministic GP.
///
/// The control law is the posterior mean of a GP over a small set of
/// pseudo-training points, with unit signal variance per output.
#[derive(Clone, Debug)]
pub struct RbfController {
    model: Mgpr,
    max_action: Option<MaxAction>,
    precision: Precision,
    rng: SmallRng,
}

impl RbfController {
    /// The underlying GP.
    pub fn model(&self) -> &Mgpr {
        &self.model
    }

    /// The underlying GP, mutably.
    pub fn model_mut(&mut self) -> &mut Mgpr {
        &mut self.model
    }

    /// Number of pseudo-training points.
    pub fn num_basis_functions(&self) -> usize {
        self.model.num_data()
    }

    /// Saturation limit used when squashing.
    pub fn max_action(&self) -> Option<&MaxAction> {
        self.max_action.as_ref()
    }
}

impl Configurable for RbfController {
    type Config = RbfControllerConfig;

    fn build(config: Self::Config) -> Result<Self> {
        let (n, k, nb) = (
            config.state_dim,
            config.control_dim,
            config.num_basis_functions,
        );
        let precision = config.precision;
        if nb == 0 {
            let msg = "num_basis_functions must be positive".to_string();
            return Err(PilcoError::InvalidValue(msg).into());
        }
        if let Some(max_action) = &config.max_action {
            max_action.broadcast(k)?;
        }

        let mut rng = SmallRng::seed_from_u64(config.seed);
        let x = precision.cast_array(sample_normal(&mut rng, (nb, n), 0.0, 1.0)?);
        let y = precision.cast_array(sample_normal(&mut rng, (nb, k), 0.0, 0.1)?);
        let mut model = Mgpr::new(x, y)?;
        for kern in model.kernels_mut() {
            let variance = kern.variance_param_mut();
            variance.assign(Array2::ones((1, 1)))?;
            variance.set_trainable(false);
        }
        model
            .noise_variance_mut()
            .assign(Array2::from_elem((1, k), config.noise_variance))?;
        info!(
            "Build RBF controller: state_dim = {}, control_dim = {}, num_basis_functions = {}",
            n, k, nb
        );

        Ok(Self {
            model,
            max_action: config.max_action,
            precision,
            rng,
        })
    }
}

impl Parameterized for RbfController {
    fn params(&self) -> Vec<(String, &Param)> {
        self.model.params()
    }

    fn params_mut(&mut self) -> Vec<(String, &mut Param)> {
        self.model.params_mut()
    }

    fn precision(&self) -> Precision {
        self.precision
    }
}

impl Controller for RbfController {
    fn state_dim(&self) -> usize {
        self.model.num_dims()
    }

    fn control_dim(&self) -> usize {
        self.model.num_outputs()
    }

    fn compute_action(
        &self,
        mean: &Array1<f64>,
        cov: &Array2<f64>,
        squash: bool,
    ) -> Result<Moments> {
        self.check_belief(mean, cov)?;

        // The function is known exactly at the pseudo-inputs, so the data
        // term of the predictive variance is dropped.
        let f = self.model.calculate_factorizations()?.zeroed();
        let out = self.model.predict_given_factorizations(mean, cov, &f)?;

        // Removes the prior variance added by the GP prediction.
        let correction = self.model.variance().mapv(|v| v - VARIANCE_JITTER);
        let s = out.cov - Array2::from_diag(&correction);
        trace!("RBF controller: mean = {:?}, cov = {:?}", out.mean, s);

        let out = Moments::new(out.mean, s, out.cross_cov);
        let out = match squash {
            true => out.squashed(self.max_action.as_ref())?,
            false => out,
        };
        Ok(out.with_precision(self.precision))
    }

    fn randomize(&mut self) -> Result<()> {
        info!("Randomize RBF controller");
        let precision = self.precision;
        let x = sample_normal(&mut self.rng, self.model.inputs().shape(), 0.0, 0.1)?;
        let y = sample_normal(&mut self.rng, self.model.targets().shape(), 0.0, 0.1)?;
        self.model.inputs_mut().assign(precision.cast_array(x))?;
        self.model.targets_mut().assign(precision.cast_array(y))?;

        for i in 0..self.model.num_outputs() {
            let shape = self.model.kernels()[i].lengthscales_param().shape();
            let l = sample_normal(&mut self.rng, shape, 1.0, 0.1)?;
            self.model.kernels_mut()[i]
                .lengthscales_param_mut()
                .assign(precision.cast_array(l))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::{arr1, arr2};
    use test_log::test;

    fn controller() -> Result<RbfController> {
        RbfController::build(RbfControllerConfig::new(3, 2, 8).max_action(vec![1.0, 2.0]))
    }

    #[test]
    fn test_shapes() -> Result<()> {
        let c = controller()?;
        assert_eq!(c.state_dim(), 3);
        assert_eq!(c.control_dim(), 2);
        assert_eq!(c.num_basis_functions(), 8);

        let mean = arr1(&[0.1, -0.3, 0.2]);
        let cov = arr2(&[[0.1, 0.0, 0.02], [0.0, 0.2, 0.0], [0.02, 0.0, 0.05]]);
        for squash in [false, true].iter() {
            let out = c.compute_action(&mean, &cov, *squash)?;
            assert_eq!(out.mean.len(), 2);
            assert_eq!(out.cov.dim(), (2, 2));
            assert_eq!(out.cross_cov.dim(), (3, 2));
            assert_eq!(out.cov[[0, 1]], out.cov[[1, 0]]);
        }
        Ok(())
    }

    #[test]
    fn test_deterministic_state() -> Result<()> {
        // A point state gives the GP posterior mean and only the jitter as variance.
        let c = controller()?;
        let mean = arr1(&[0.1, -0.3, 0.2]);
        let out = c.compute_action(&mean, &Array2::zeros((3, 3)), false)?;

        let f = c.model().calculate_factorizations()?;
        let x = c.model().inputs().value();
        let xs = mean.clone().insert_axis(ndarray::Axis(0));
        for i in 0..2 {
            let ks = c.model().kernels()[i].k(&xs, &x)?.row(0).to_owned();
            assert!((out.mean[i] - ks.dot(&f.beta.row(i))).abs() < 1e-10);
        }
        assert!((out.cov[[0, 0]] - VARIANCE_JITTER).abs() < 1e-10);
        assert!((out.cov[[1, 1]] - VARIANCE_JITTER).abs() < 1e-10);
        Ok(())
    }

    #[test]
    fn test_squashed_bound() -> Result<()> {
        let c = controller()?;
        let out = c.compute_action(&arr1(&[1.0, 2.0, -1.0]), &Array2::eye(3), true)?;
        assert!(out.mean[0].abs() <= 1.0);
        assert!(out.mean[1].abs() <= 2.0);
        Ok(())
    }

    #[test]
    fn test_randomize_keeps_signal_variance() -> Result<()> {
        let mut c = controller()?;
        let x = c.model().inputs().value();
        let y = c.model().targets().value();
        let l = c.model().kernels()[0].lengthscales();
        let v = c.model().variance();

        c.randomize()?;
        assert_ne!(c.model().inputs().value(), x);
        assert_ne!(c.model().targets().value(), y);
        assert_ne!(c.model().kernels()[0].lengthscales(), l);
        assert_eq!(c.model().variance(), v);
        assert!(c
            .model()
            .kernels()
            .iter()
            .all(|k| !k.variance_param().trainable()));
        Ok(())
    }

    #[test]
    fn test_trainable_params() -> Result<()> {
        let c = controller()?;
        let p = c.trainable_params();
        assert!(p.get("inputs").is_some());
        assert!(p.get("kernel0/lengthscales").is_some());
        assert!(p.get("kernel0/variance").is_none());
        Ok(())
    }

    #[test]
    fn test_zero_basis_functions() {
        assert!(RbfController::build(RbfControllerConfig::new(2, 1, 0)).is_err());
    }
}
