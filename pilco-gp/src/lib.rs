//! Multi-output Gaussian process with moment matching on uncertain inputs.
//!
//! Each output dimension is an independent GP with an ARD squared-exponential
//! kernel; all outputs share the training inputs. Given a Gaussian input
//! `N(m, s)`, [`Mgpr::predict_given_factorizations`] returns the exact mean and
//! covariance of the predictive distribution and the input-output covariance.
mod kernel;
mod mgpr;
pub use kernel::RbfKernel;
pub use mgpr::{Factorizations, Mgpr};
