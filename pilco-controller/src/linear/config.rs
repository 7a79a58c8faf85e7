//! Configuration of [`LinearController`](super::LinearController).
use crate::control_design::LinearizedSystem;
use anyhow::Result;
use log::info;
use ndarray::Array2;
use pilco_core::{MaxAction, PilcoError, Precision};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`LinearController`](super::LinearController).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct LinearControllerConfig {
    /// Dimension of the state.
    pub state_dim: usize,

    /// Dimension of the control action.
    pub control_dim: usize,

    /// Saturation limit used when squashing.
    pub max_action: Option<MaxAction>,

    /// If `false`, `W` and `b` are excluded from training.
    pub trainable: bool,

    /// Precomputed gain matrix `W`, `control_dim x state_dim`.
    ///
    /// If `None`, `W` and `b` are sampled from `U[0, 1)`; otherwise the bias
    /// starts at zero.
    pub gain: Option<Array2<f64>>,

    /// Seed of the random number generator of the controller.
    pub seed: u64,

    /// Numeric precision of parameters and outputs.
    pub precision: Precision,
}

impl Default for LinearControllerConfig {
    fn default() -> Self {
        Self {
            state_dim: 1,
            control_dim: 1,
            max_action: None,
            trainable: true,
            gain: None,
            seed: 42,
            precision: Precision::F64,
        }
    }
}

impl LinearControllerConfig {
    /// Creates a configuration with the given dimensions.
    pub fn new(state_dim: usize, control_dim: usize) -> Self {
        Self {
            state_dim,
            control_dim,
            ..Default::default()
        }
    }

    /// Sets the saturation limit.
    pub fn max_action(mut self, v: impl Into<MaxAction>) -> Self {
        self.max_action = Some(v.into());
        self
    }

    /// Sets the trainable flag of `W` and `b`.
    pub fn trainable(mut self, v: bool) -> Self {
        self.trainable = v;
        self
    }

    /// Sets a precomputed gain matrix.
    pub fn gain(mut self, v: Array2<f64>) -> Self {
        self.gain = Some(v);
        self
    }

    /// Sets the gain to `-K`, where `K` is the LQR gain of the given system,
    /// so that the controller applies `u = -K x`.
    pub fn lqr(self, system: &impl LinearizedSystem) -> Result<Self> {
        let k = system.lqr()?.gain;
        if k.dim() != (self.control_dim, self.state_dim) {
            return Err(PilcoError::dimension(
                "LQR gain",
                &[self.control_dim, self.state_dim],
                k.shape(),
            )
            .into());
        }
        Ok(self.gain(-k))
    }

    /// Sets the seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the numeric precision.
    pub fn precision(mut self, v: Precision) -> Self {
        self.precision = v;
        self
    }

    /// Constructs [`LinearControllerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of linear controller from {:?}", path_);
        Ok(b)
    }

    /// Saves [`LinearControllerConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of linear controller into {:?}", path_);
        Ok(())
    }
}
