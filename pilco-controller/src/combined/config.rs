//! Configuration of [`CombinedController`](super::CombinedController).
use crate::{LinearControllerConfig, RbfControllerConfig};
use anyhow::Result;
use log::info;
use ndarray::Array2;
use pilco_core::{MaxAction, Precision, Transform};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Parameterization of the shape matrix `S` of the gate.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
pub enum GateShape {
    /// Full symmetric positive-definite matrix, stored as a Cholesky factor.
    Full,

    /// Diagonal matrix with positive entries.
    Diagonal,
}

impl Default for GateShape {
    fn default() -> Self {
        Self::Diagonal
    }
}

impl GateShape {
    /// Transform of the shape parameter.
    pub fn transform(&self) -> Transform {
        match self {
            Self::Full => Transform::PositiveDefinite,
            Self::Diagonal => Transform::diag_positive(),
        }
    }
}

/// Configuration of [`CombinedController`](super::CombinedController).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct CombinedControllerConfig {
    /// Dimension of the state.
    pub state_dim: usize,

    /// Dimension of the control action.
    pub control_dim: usize,

    /// Number of pseudo-training points of the RBF part.
    pub num_basis_functions: usize,

    /// Saturation limit used when squashing.
    pub max_action: Option<MaxAction>,

    /// Center `a` of the gate. Defaults to the origin.
    pub controller_location: Option<Vec<f64>>,

    /// Precomputed gain of the linear part.
    pub gain: Option<Array2<f64>>,

    /// Initial sharpness of the gate.
    pub zeta: f64,

    /// Parameterization of the shape matrix of the gate.
    pub gate_shape: GateShape,

    /// Seed of the random number generators of the controller.
    pub seed: u64,

    /// Numeric precision of parameters and outputs.
    pub precision: Precision,
}

impl Default for CombinedControllerConfig {
    fn default() -> Self {
        Self {
            state_dim: 1,
            control_dim: 1,
            num_basis_functions: 10,
            max_action: None,
            controller_location: None,
            gain: None,
            zeta: 0.5,
            gate_shape: GateShape::default(),
            seed: 42,
            precision: Precision::F64,
        }
    }
}

impl CombinedControllerConfig {
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

    /// Sets the center of the gate.
    pub fn controller_location(mut self, v: Vec<f64>) -> Self {
        self.controller_location = Some(v);
        self
    }

    /// Sets the gain of the linear part.
    pub fn gain(mut self, v: Array2<f64>) -> Self {
        self.gain = Some(v);
        self
    }

    /// Sets the initial sharpness of the gate.
    pub fn zeta(mut self, v: f64) -> Self {
        self.zeta = v;
        self
    }

    /// Sets the parameterization of the shape matrix.
    pub fn gate_shape(mut self, v: GateShape) -> Self {
        self.gate_shape = v;
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

    /// Configuration of the linear part.
    pub fn linear_config(&self) -> LinearControllerConfig {
        LinearControllerConfig {
            state_dim: self.state_dim,
            control_dim: self.control_dim,
            max_action: self.max_action.clone(),
            trainable: true,
            gain: self.gain.clone(),
            seed: self.seed,
            precision: self.precision,
        }
    }

    /// Configuration of the RBF part.
    pub fn rbf_config(&self) -> RbfControllerConfig {
        RbfControllerConfig {
            state_dim: self.state_dim,
            control_dim: self.control_dim,
            num_basis_functions: self.num_basis_functions,
            max_action: self.max_action.clone(),
            seed: self.seed.wrapping_add(1),
            precision: self.precision,
            ..Default::default()
        }
    }

    /// Constructs [`CombinedControllerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of combined controller from {:?}", path_);
        Ok(b)
    }

    /// Saves [`CombinedControllerConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of combined controller into {:?}", path_);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_combined_controller_config() -> Result<()> {
        let config = CombinedControllerConfig::new(2, 1, 5)
            .max_action(vec![3.0])
            .controller_location(vec![0.5, -0.5])
            .zeta(2.0)
            .gate_shape(GateShape::Full);

        let dir = TempDir::new("combined_controller_config")?;
        let path = dir.path().join("combined.yaml");
        config.save(&path)?;
        let config_ = CombinedControllerConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_sub_configs() {
        let config = CombinedControllerConfig::new(4, 2, 6).seed(10);
        assert_eq!(config.linear_config().seed, 10);
        assert_eq!(config.rbf_config().seed, 11);
        assert_eq!(config.rbf_config().num_basis_functions, 6);
        assert_eq!(config.rbf_config().noise_variance, 1.0);
    }
}
