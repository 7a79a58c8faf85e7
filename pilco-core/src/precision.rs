//! Numeric precision of controller parameters and outputs.
use ndarray::{Array, Dimension};
use serde::{Deserialize, Serialize};

/// Numeric precision of a controller.
///
/// Arithmetic is carried out in `f64`; with [`Precision::F32`], parameters and
/// outputs are rounded to single precision.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum Precision {
    /// Single precision.
    F32,

    /// Double precision.
    F64,
}

impl Default for Precision {
    fn default() -> Self {
        Self::F64
    }
}

impl Precision {
    /// Rounds a value to this precision.
    pub fn cast(&self, x: f64) -> f64 {
        match self {
            Self::F32 => x as f32 as f64,
            Self::F64 => x,
        }
    }

    /// Rounds every element of an array to this precision.
    pub fn cast_array<D: Dimension>(&self, a: Array<f64, D>) -> Array<f64, D> {
        match self {
            Self::F32 => a.mapv(|x| x as f32 as f64),
            Self::F64 => a,
        }
    }
}
