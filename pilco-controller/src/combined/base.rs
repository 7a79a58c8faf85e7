//! Gated mixture of a linear and an RBF controller.
use super::CombinedControllerConfig;
use crate::{LinearController, RbfController};
use anyhow::Result;
use log::{info, trace};
use ndarray::{Array1, Array2};
use pilco_core::{
    util::outer, Configurable, Controller, MaxAction, Moments, Param, Parameterized, PilcoError,
    Precision, Transform,
};
use std::f64::consts::FRAC_1_PI;

/// Mixture of a [`LinearController`] and an [`RbfController`].
///
/// The weight of the RBF part is a smooth function of the quadratic form
/// `r = (m - a) S (m - a)^T` of the state mean around the gate center `a`:
///
/// ```text
/// ratio = -atan2(-r zeta, 1 - r^2) / pi
/// ```
///
/// It is zero at `a`, one half on the level set `r = 1` and approaches one
/// far from `a`. The output covariance is that of the two-component mixture.
#[derive(Clone, Debug)]
pub struct CombinedController {
    linear: LinearController,
    rbf: RbfController,
    location: Param,
    shape: Param,
    zeta: Param,
    max_action: Option<MaxAction>,
    precision: Precision,
}

impl CombinedController {
    /// The linear part.
    pub fn linear(&self) -> &LinearController {
        &self.linear
    }

    /// The linear part, mutably.
    pub fn linear_mut(&mut self) -> &mut LinearController {
        &mut self.linear
    }

    /// The RBF part.
    pub fn rbf(&self) -> &RbfController {
        &self.rbf
    }

    /// The RBF part, mutably.
    pub fn rbf_mut(&mut self) -> &mut RbfController {
        &mut self.rbf
    }

    /// Center of the gate.
    pub fn location(&self) -> Array1<f64> {
        self.location.value().row(0).to_owned()
    }

    /// Shape matrix of the gate.
    pub fn shape(&self) -> Array2<f64> {
        self.shape.value()
    }

    /// Sharpness of the gate.
    pub fn zeta(&self) -> f64 {
        self.zeta.value()[[0, 0]]
    }

    /// Moves the center of the gate.
    pub fn set_location(&mut self, location: Array1<f64>) -> Result<()> {
        let n = location.len();
        let location = location.into_shape((1, n))?;
        self.location.assign(self.precision.cast_array(location))
    }

    /// Weight of the RBF part at the state `mean`.
    pub fn compute_ratio(&self, mean: &Array1<f64>) -> Result<f64> {
        let n = self.state_dim();
        if mean.len() != n {
            return Err(PilcoError::dimension("gate input", &[n], mean.shape()).into());
        }
        let d = mean - &self.location();
        let r = d.dot(&self.shape.value().dot(&d));
        let zeta = self.zeta();
        Ok(-FRAC_1_PI * (-r * zeta).atan2(1.0 - r * r))
    }
}

impl Configurable for CombinedController {
    type Config = CombinedControllerConfig;

    fn build(config: Self::Config) -> Result<Self> {
        let n = config.state_dim;
        let precision = config.precision;
        let linear = LinearController::build(config.linear_config())?;
        let rbf = RbfController::build(config.rbf_config())?;

        let location = match &config.controller_location {
            Some(a) if a.len() != n => {
                return Err(PilcoError::dimension("controller location", &[n], &[a.len()]).into())
            }
            Some(a) => Array2::from_shape_vec((1, n), a.clone())?,
            None => Array2::zeros((1, n)),
        };
        let location = Param::free(precision.cast_array(location)).with_trainable(false);
        let shape = Param::new(Array2::eye(n), config.gate_shape.transform())?;
        let zeta = Param::new(
            Array2::from_elem((1, 1), precision.cast(config.zeta)),
            Transform::positive(),
        )?;
        info!(
            "Build combined controller: gate_shape = {:?}, zeta = {}",
            config.gate_shape, config.zeta
        );

        Ok(Self {
            linear,
            rbf,
            location,
            shape,
            zeta,
            max_action: config.max_action,
            precision,
        })
    }
}

impl Parameterized for CombinedController {
    fn params(&self) -> Vec<(String, &Param)> {
        let mut params: Vec<_> = self
            .linear
            .params()
            .into_iter()
            .map(|(name, p)| (format!("linear/{}", name), p))
            .collect();
        params.extend(
            self.rbf
                .params()
                .into_iter()
                .map(|(name, p)| (format!("rbf/{}", name), p)),
        );
        params.push(("gate/a".to_string(), &self.location));
        params.push(("gate/S".to_string(), &self.shape));
        params.push(("gate/zeta".to_string(), &self.zeta));
        params
    }

    fn params_mut(&mut self) -> Vec<(String, &mut Param)> {
        let mut params: Vec<_> = self
            .linear
            .params_mut()
            .into_iter()
            .map(|(name, p)| (format!("linear/{}", name), p))
            .collect();
        params.extend(
            self.rbf
                .params_mut()
                .into_iter()
                .map(|(name, p)| (format!("rbf/{}", name), p)),
        );
        params.push(("gate/a".to_string(), &mut self.location));
        params.push(("gate/S".to_string(), &mut self.shape));
        params.push(("gate/zeta".to_string(), &mut self.zeta));
        params
    }

    fn precision(&self) -> Precision {
        self.precision
    }
}

impl Controller for CombinedController {
    fn state_dim(&self) -> usize {
        self.linear.state_dim()
    }

    fn control_dim(&self) -> usize {
        self.linear.control_dim()
    }

    fn compute_action(
        &self,
        mean: &Array1<f64>,
        cov: &Array2<f64>,
        squash: bool,
    ) -> Result<Moments> {
        self.check_belief(mean, cov)?;
        let ratio = self.compute_ratio(mean)?;
        let out1 = self.linear.compute_action(mean, cov, false)?;
        let out2 = self.rbf.compute_action(mean, cov, false)?;

        let m = &out1.mean * (1.0 - ratio) + &out2.mean * ratio;
        let d1 = &out1.mean - &m;
        let d2 = &out2.mean - &m;
        let s = &out1.cov * (1.0 - ratio)
            + &out2.cov * ratio
            + outer(&d1.view(), &d1.view()) * (1.0 - ratio)
            + outer(&d2.view(), &d2.view()) * ratio;
        let v = &out1.cross_cov * (1.0 - ratio) + &out2.cross_cov * ratio;
        trace!("Combined controller: ratio = {}, mean = {:?}", ratio, m);

        let out = Moments::new(m, s, v);
        let out = match squash {
            true => out.squashed(self.max_action.as_ref())?,
            false => out,
        };
        Ok(out.with_precision(self.precision))
    }

    fn randomize(&mut self) -> Result<()> {
        self.rbf.randomize()?;
        self.linear.randomize()
    }
}
