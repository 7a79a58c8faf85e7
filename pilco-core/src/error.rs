//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum PilcoError {
    /// Shapes of a mean, a covariance or a parameter do not agree.
    #[error("Dimension error in {context}: expected {expected:?}, got {actual:?}")]
    Dimension {
        /// Where the mismatch was detected.
        context: String,
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        actual: Vec<usize>,
    },

    /// Singular solve, non positive-definite matrix and the like.
    #[error("Numerical error: {0}")]
    Numerical(String),

    /// Unknown or missing parameter name.
    #[error("Parameter key error: {0}")]
    ParamKey(String),

    /// Value outside the domain of a transform.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl PilcoError {
    /// Constructs [`PilcoError::Dimension`].
    pub fn dimension(context: impl Into<String>, expected: &[usize], actual: &[usize]) -> Self {
        Self::Dimension {
            context: context.into(),
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}
