//! Constrained parameters.
mod named_params;
mod transform;
use crate::PilcoError;
use anyhow::Result;
pub use named_params::NamedParams;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
pub use transform::Transform;

/// A numeric parameter with a constraint.
///
/// The unconstrained representation is stored and the constrained value is
/// obtained with the forward map of the [`Transform`]. Vectors are stored as
/// `1 x n` rows.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Param {
    unconstrained: Array2<f64>,
    transform: Transform,
    trainable: bool,
}

impl Param {
    /// Constructs a trainable parameter from its constrained value.
    pub fn new(value: Array2<f64>, transform: Transform) -> Result<Self> {
        Ok(Self {
            unconstrained: transform.inverse(&value)?,
            transform,
            trainable: true,
        })
    }

    /// Constructs an unconstrained trainable parameter.
    pub fn free(value: Array2<f64>) -> Self {
        Self {
            unconstrained: value,
            transform: Transform::Identity,
            trainable: true,
        }
    }

    /// Returns `true` if an optimizer may update this parameter.
    pub fn trainable(&self) -> bool {
        self.trainable
    }

    /// Builder-style setter of the trainable flag.
    pub fn with_trainable(mut self, trainable: bool) -> Self {
        self.trainable = trainable;
        self
    }

    /// Sets the trainable flag.
    pub fn set_trainable(&mut self, trainable: bool) {
        self.trainable = trainable;
    }

    /// The transform of this parameter.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Shape of the parameter.
    pub fn shape(&self) -> (usize, usize) {
        self.unconstrained.dim()
    }

    /// The constrained value.
    pub fn value(&self) -> Array2<f64> {
        self.transform.forward(&self.unconstrained)
    }

    /// The unconstrained representation.
    pub fn unconstrained(&self) -> &Array2<f64> {
        &self.unconstrained
    }

    /// Overwrites the unconstrained representation.
    pub fn set_unconstrained(&mut self, v: Array2<f64>) -> Result<()> {
        self.check_shape(&v)?;
        self.unconstrained = v;
        Ok(())
    }

    /// Overwrites the constrained value.
    pub fn assign(&mut self, value: Array2<f64>) -> Result<()> {
        self.check_shape(&value)?;
        self.unconstrained = self.transform.inverse(&value)?;
        Ok(())
    }

    /// Checks that `v` has the shape of this parameter.
    pub fn check_shape(&self, v: &Array2<f64>) -> Result<()> {
        if v.shape() != self.unconstrained.shape() {
            return Err(
                PilcoError::dimension("parameter", self.unconstrained.shape(), v.shape()).into(),
            );
        }
        Ok(())
    }
}
