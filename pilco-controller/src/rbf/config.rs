//! Configuration of [`RbfController`](super::RbfController).
use anyhow::Result;
use log::info;
use pilco_core::{MaxAction, Precision};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`RbfController`](super::RbfController).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct RbfControllerConfig {
    /// Dimension of the state.
    pub state_dim: usize,

    /// Dimension of the control action.
    pub control_dim: usize,

    /// Number of pseudo-training points.
    pub num_basis_functions: usize,

    /// Saturation limit used when squashing.
    pub max_action: Option<MaxAction>,

    /// Initial observation-noise variance of the underlying GP.
    pub noise_variance: f64,

    /// Seed of the random number generator of the controller.
    pub seed: u64,

    /// Numeric precision of parameters and outputs.
    pub precision: Precision,
}

impl Default for RbfControllerConfig {
    fn default() -> Self {
        Self {
            state_dim: 1,
            control_dim: 1,
            num_basis_functions: 10,
            max_action: None,
            noise_variance: 1.0,
            seed: 42,
            precision: Precision::F64,
        }
    }
}

impl RbfControllerConfig {
    /// Creates a configuration with the given dimensions.
    pub fn new(state_dim: usize, control_dim: usize, num_basis_functions: usize) -> Self {
        Self {
            state_dim,
            control_dim,
            num_basis_functions,
            ..Default::default()
        }
    }

    /// Sets the saturation limit.
    pub fn max_action(mut self, v: impl Into<MaxAction>) -> Self {
        self.max_action = Some(v.into());
        self
    }

    /// Sets the initial observation-noise variance.
    pub fn noise_variance(mut self, v: f64) -> Self {
        self.noise_variance = v;
        self
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

    /// Constructs [`RbfControllerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of RBF controller from {:?}", path_);
        Ok(b)
    }

    /// Saves [`RbfControllerConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of RBF controller into {:?}", path_);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_rbf_controller_config() -> Result<()> {
        let config = RbfControllerConfig::new(4, 2, 10)
            .max_action(vec![1.0, 3.0])
            .noise_variance(1e-3)
            .seed(11);

        let dir = TempDir::new("rbf_controller_config")?;
        let path = dir.path().join("rbf.yaml");
        config.save(&path)?;
        let config_ = RbfControllerConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
