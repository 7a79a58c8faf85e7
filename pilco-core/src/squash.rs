//! Sine squashing of a Gaussian control distribution.
use crate::{util::diag_part, Moments, PilcoError};
use anyhow::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Saturation limit of the control action.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum MaxAction {
    /// Same limit for every dimension.
    Scalar(f64),

    /// One limit per dimension.
    PerDim(Vec<f64>),
}

impl Default for MaxAction {
    fn default() -> Self {
        Self::Scalar(1.0)
    }
}

impl From<f64> for MaxAction {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<Vec<f64>> for MaxAction {
    fn from(v: Vec<f64>) -> Self {
        Self::PerDim(v)
    }
}

impl MaxAction {
    /// Broadcasts the limit to `k` dimensions.
    pub fn broadcast(&self, k: usize) -> Result<Array1<f64>> {
        match self {
            Self::Scalar(v) => Ok(Array1::from_elem(k, *v)),
            Self::PerDim(v) if v.len() == 1 => Ok(Array1::from_elem(k, v[0])),
            Self::PerDim(v) if v.len() == k => Ok(Array1::from(v.clone())),
            Self::PerDim(v) => Err(PilcoError::dimension("max action", &[k], &[v.len()]).into()),
        }
    }
}

/// Squashes `x ~ N(mean, cov)` through `max_action * sin(x)`.
///
/// Returns the exact mean and covariance of the squashed variable, and the
/// diagonal `k x k` input-output factor to be right-multiplied into the
/// cross-covariance of the caller. If `max_action` is `None`, the output
/// lies in `[-1, 1]` per dimension.
pub fn squash_sin(
    mean: &Array1<f64>,
    cov: &Array2<f64>,
    max_action: Option<&MaxAction>,
) -> Result<Moments> {
    let k = mean.len();
    if cov.dim() != (k, k) {
        return Err(PilcoError::dimension("squash covariance", &[k, k], cov.shape()).into());
    }
    let max_action = match max_action {
        Some(max_action) => max_action.broadcast(k)?,
        None => Array1::ones(k),
    };

    let s = diag_part(cov);
    let decay = s.mapv(|v| (-v / 2.0).exp());
    let m = &max_action * &decay * &mean.mapv(f64::sin);

    let out_cov = Array2::from_shape_fn((k, k), |(i, j)| {
        let lq = -(s[i] + s[j]) / 2.0;
        let q = lq.exp();
        let c = cov[[i, j]];
        let v = ((lq + c).exp() - q) * (mean[i] - mean[j]).cos()
            - ((lq - c).exp() - q) * (mean[i] + mean[j]).cos();
        max_action[i] * max_action[j] * v / 2.0
    });

    let cross_cov = Array2::from_diag(&(&max_action * &decay * &mean.mapv(f64::cos)));

    Ok(Moments::new(m, out_cov, cross_cov))
}

impl Moments {
    /// Squashes the output through [`squash_sin`].
    ///
    /// The squashing factor of the cross-covariance is right-multiplied into
    /// the input-output covariance, so the result still relates the original
    /// input to the squashed output.
    pub fn squashed(self, max_action: Option<&MaxAction>) -> Result<Self> {
        let squashed = squash_sin(&self.mean, &self.cov, max_action)?;
        Ok(Self {
            cross_cov: self.cross_cov.dot(&squashed.cross_cov),
            ..squashed
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_standard_normal() -> Result<()> {
        // x ~ N(0, 1): Var[2 sin x] = 2 (1 - exp(-2)).
        let out = squash_sin(&arr1(&[0.0]), &arr2(&[[1.0]]), Some(&2.0.into()))?;
        assert_eq!(out.mean[0], 0.0);
        assert!((out.cov[[0, 0]] - 2.0 * (1.0 - (-2.0f64).exp())).abs() < 1e-12);
        assert!((out.cross_cov[[0, 0]] - 2.0 * (-0.5f64).exp()).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_default_max_action() -> Result<()> {
        let mean = arr1(&[0.3, -1.2]);
        let cov = arr2(&[[0.5, 0.1], [0.1, 0.2]]);
        let out1 = squash_sin(&mean, &cov, None)?;
        let out2 = squash_sin(&mean, &cov, Some(&MaxAction::PerDim(vec![1.0, 1.0])))?;
        assert_eq!(out1, out2);
        Ok(())
    }

    #[test]
    fn test_symmetric_nonnegative() -> Result<()> {
        let mean = arr1(&[0.3, -1.2, 2.5]);
        let cov = arr2(&[[0.5, 0.1, -0.2], [0.1, 0.2, 0.05], [-0.2, 0.05, 1.5]]);
        let max_action = MaxAction::PerDim(vec![1.0, 2.0, 0.5]);
        let out = squash_sin(&mean, &cov, Some(&max_action))?;
        let m = max_action.broadcast(3)?;
        for i in 0..3 {
            assert!(out.cov[[i, i]] >= 0.0);
            assert!(out.mean[i].abs() <= m[i]);
            for j in 0..3 {
                assert_eq!(out.cov[[i, j]], out.cov[[j, i]]);
                if i != j {
                    assert_eq!(out.cross_cov[[i, j]], 0.0);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_vanishing_variance() -> Result<()> {
        let mean = arr1(&[0.7, -2.0]);
        let cov = Array2::eye(2) * 1e-12;
        let out = squash_sin(&mean, &cov, Some(&MaxAction::PerDim(vec![3.0, 0.5])))?;
        assert!((out.mean[0] - 3.0 * 0.7f64.sin()).abs() < 1e-9);
        assert!((out.mean[1] - 0.5 * (-2.0f64).sin()).abs() < 1e-9);
        assert!(out.cov.iter().all(|v| v.abs() < 1e-9));
        assert!((out.cross_cov[[0, 0]] - 3.0 * 0.7f64.cos()).abs() < 1e-9);
        assert!((out.cross_cov[[1, 1]] - 0.5 * (-2.0f64).cos()).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_squashed_chains_cross_cov() -> Result<()> {
        let mean = arr1(&[0.4]);
        let cov = arr2(&[[0.3]]);
        let unsquashed = Moments::new(mean.clone(), cov.clone(), arr2(&[[2.0], [-1.0]]));
        let out = unsquashed.squashed(Some(&MaxAction::Scalar(1.5)))?;
        let c = 1.5 * (-0.15f64).exp() * 0.4f64.cos();
        assert!((out.cross_cov[[0, 0]] - 2.0 * c).abs() < 1e-12);
        assert!((out.cross_cov[[1, 0]] + c).abs() < 1e-12);
        assert_eq!(out.mean, squash_sin(&mean, &cov, Some(&MaxAction::Scalar(1.5)))?.mean);
        Ok(())
    }

    #[test]
    fn test_dimension_error() {
        let err = squash_sin(&arr1(&[0.0, 1.0]), &arr2(&[[1.0]]), None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PilcoError>(),
            Some(PilcoError::Dimension { .. })
        ));

        let max_action = MaxAction::PerDim(vec![1.0, 2.0, 3.0]);
        assert!(squash_sin(&arr1(&[0.0, 1.0]), &Array2::eye(2), Some(&max_action)).is_err());
    }

    #[test]
    fn test_max_action_yaml() -> Result<()> {
        let m: MaxAction = serde_yaml::from_str("2.0")?;
        assert_eq!(m, MaxAction::Scalar(2.0));
        let m: MaxAction = serde_yaml::from_str("[1.0, 2.0]")?;
        assert_eq!(m, MaxAction::PerDim(vec![1.0, 2.0]));
        Ok(())
    }
}
