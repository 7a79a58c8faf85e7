//! Controller.
use super::{Moments, Parameterized};
use crate::PilcoError;
use anyhow::Result;
use ndarray::{Array1, Array2};

/// A controller acting on a Gaussian belief over the state.
///
/// Given the mean and covariance of the state, a controller returns the
/// moments of the control action together with the input-output covariance
/// used by a planner to build the joint state-action distribution.
/// The output is a pure function of the current parameters and the given
/// belief; no state is carried between calls.
pub trait Controller: Parameterized {
    /// Dimension of the state.
    fn state_dim(&self) -> usize;

    /// Dimension of the control action.
    fn control_dim(&self) -> usize;

    /// Propagates the belief `N(mean, cov)` through the controller.
    ///
    /// If `squash` is `true`, the unbounded control distribution is passed
    /// through [`squash_sin`](crate::squash_sin) with the max-action bound
    /// of the controller.
    fn compute_action(&self, mean: &Array1<f64>, cov: &Array2<f64>, squash: bool)
        -> Result<Moments>;

    /// Resamples the trainable parameters in place.
    fn randomize(&mut self) -> Result<()>;

    /// Checks that `mean` and `cov` match [`Controller::state_dim`].
    fn check_belief(&self, mean: &Array1<f64>, cov: &Array2<f64>) -> Result<()> {
        let n = self.state_dim();
        if mean.len() != n {
            return Err(PilcoError::dimension("state mean", &[n], mean.shape()).into());
        }
        if cov.dim() != (n, n) {
            return Err(PilcoError::dimension("state covariance", &[n, n], cov.shape()).into());
        }
        Ok(())
    }
}
