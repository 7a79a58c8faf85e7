//! Multi-output GP regression.
use crate::RbfKernel;
use anyhow::Result;
use log::trace;
use ndarray::{Array1, Array2, Axis};
use pilco_core::{
    util::{outer, solve_with_det, spd_inverse},
    Moments, Param, Parameterized, PilcoError, Transform,
};

/// Cached quantities of the training data, one entry per output.
#[derive(Clone, Debug, PartialEq)]
pub struct Factorizations {
    /// Inverse of the noisy Gram matrix, `n x n` per output.
    pub ik: Vec<Array2<f64>>,

    /// `ik * y` per output, `num_outputs x n`.
    pub beta: Array2<f64>,
}

impl Factorizations {
    /// The same factorizations with the inverse Gram matrices set to zero.
    ///
    /// Used by a deterministic GP, where the function is known exactly at the
    /// training inputs and the predictive variance loses its data term.
    pub fn zeroed(&self) -> Self {
        Self {
            ik: self.ik.iter().map(|ik| Array2::zeros(ik.raw_dim())).collect(),
            beta: self.beta.clone(),
        }
    }
}

/// GP regression with independent outputs sharing training inputs.
#[derive(Clone, Debug, PartialEq)]
pub struct Mgpr {
    inputs: Param,
    targets: Param,
    kernels: Vec<RbfKernel>,
    noise_variance: Param,
}

impl Mgpr {
    /// Constructs a GP from inputs `x` (`n x d`) and targets `y` (`n x e`).
    ///
    /// Kernels start with unit length-scales and unit variance; the noise
    /// variance of every output starts at one.
    pub fn new(x: Array2<f64>, y: Array2<f64>) -> Result<Self> {
        if x.nrows() != y.nrows() {
            return Err(PilcoError::dimension("GP targets", &[x.nrows(), y.ncols()], y.shape()).into());
        }
        let (d, e) = (x.ncols(), y.ncols());
        let kernels = (0..e).map(|_| RbfKernel::new(d)).collect::<Result<Vec<_>>>()?;

        Ok(Self {
            inputs: Param::free(x),
            targets: Param::free(y),
            kernels,
            noise_variance: Param::new(Array2::ones((1, e)), Transform::positive())?,
        })
    }

    /// Replaces the training data, keeping the shapes.
    pub fn set_data(&mut self, x: Array2<f64>, y: Array2<f64>) -> Result<()> {
        self.inputs.assign(x)?;
        self.targets.assign(y)
    }

    /// Number of outputs.
    pub fn num_outputs(&self) -> usize {
        self.kernels.len()
    }

    /// Input dimension.
    pub fn num_dims(&self) -> usize {
        self.inputs.shape().1
    }

    /// Number of training points.
    pub fn num_data(&self) -> usize {
        self.inputs.shape().0
    }

    /// Training inputs.
    pub fn inputs(&self) -> &Param {
        &self.inputs
    }

    /// Training inputs, mutably.
    pub fn inputs_mut(&mut self) -> &mut Param {
        &mut self.inputs
    }

    /// Training targets.
    pub fn targets(&self) -> &Param {
        &self.targets
    }

    /// Training targets, mutably.
    pub fn targets_mut(&mut self) -> &mut Param {
        &mut self.targets
    }

    /// Kernels, one per output.
    pub fn kernels(&self) -> &[RbfKernel] {
        &self.kernels
    }

    /// Kernels, mutably.
    pub fn kernels_mut(&mut self) -> &mut [RbfKernel] {
        &mut self.kernels
    }

    /// Observation-noise variance parameter, `1 x num_outputs`.
    pub fn noise_variance(&self) -> &Param {
        &self.noise_variance
    }

    /// Observation-noise variance parameter, mutably.
    pub fn noise_variance_mut(&mut self) -> &mut Param {
        &mut self.noise_variance
    }

    /// Signal variances of the kernels.
    pub fn variance(&self) -> Array1<f64> {
        self.kernels.iter().map(|k| k.variance()).collect()
    }

    /// Computes the inverse noisy Gram matrix and `beta = K^-1 y` per output.
    pub fn calculate_factorizations(&self) -> Result<Factorizations> {
        let x = self.inputs.value();
        let y = self.targets.value();
        let noise = self.noise_variance.value();
        let n = self.num_data();
        let mut ik = Vec::with_capacity(self.num_outputs());
        let mut beta = Array2::<f64>::zeros((self.num_outputs(), n));

        for (i, kern) in self.kernels.iter().enumerate() {
            let k = kern.k(&x, &x)? + Array2::<f64>::eye(n) * noise[[0, i]];
            let ik_i = spd_inverse(&k)?;
            beta.row_mut(i).assign(&ik_i.dot(&y.column(i)));
            ik.push(ik_i);
        }

        Ok(Factorizations { ik, beta })
    }

    /// Predictive moments for the uncertain input `N(m, s)`.
    pub fn predict_on_noisy_inputs(&self, m: &Array1<f64>, s: &Array2<f64>) -> Result<Moments> {
        let f = self.calculate_factorizations()?;
        self.predict_given_factorizations(m, s, &f)
    }

    /// Predictive moments for the uncertain input `N(m, s)` given cached
    /// factorizations.
    ///
    /// The returned cross-covariance is `s^-1 Cov[x, f(x)]`, `d x e`.
    pub fn predict_given_factorizations(
        &self,
        m: &Array1<f64>,
        s: &Array2<f64>,
        f: &Factorizations,
    ) -> Result<Moments> {
        let (n, d, e) = (self.num_data(), self.num_dims(), self.num_outputs());
        self.check_inputs(m, s, f)?;

        let inp = &self.inputs.value() - m;
        let lengthscales: Vec<Array1<f64>> = self.kernels.iter().map(|k| k.lengthscales()).collect();
        let variance = self.variance();
        let eye = Array2::<f64>::eye(d);

        // Mean and input-output covariance
        let mut mean = Array1::<f64>::zeros(e);
        let mut cross_cov = Array2::<f64>::zeros((d, e));
        let mut log_k = Array2::<f64>::zeros((e, n));
        for i in 0..e {
            let il = lengthscales[i].mapv(|v| 1.0 / v);
            let i_n = &inp * &il;
            let b = Array2::from_shape_fn((d, d), |(p, q)| il[p] * s[[p, q]] * il[q]) + &eye;
            let (t, det_b) = solve_with_det(&b, &i_n.t().to_owned())?;
            let t = t.reversed_axes();
            check_det(det_b)?;

            let lb = Array1::from_shape_fn(n, |j| {
                (-i_n.row(j).dot(&t.row(j)) / 2.0).exp() * f.beta[[i, j]]
            });
            let c = variance[i] / det_b.sqrt();
            mean[i] = c * lb.sum();
            let til = &t * &il;
            cross_cov.column_mut(i).assign(&(til.t().dot(&lb) * c));

            let sq = i_n.mapv(|v| v * v).sum_axis(Axis(1));
            log_k
                .row_mut(i)
                .assign(&sq.mapv(|v| variance[i].ln() - v / 2.0));
        }

        // Predictive covariance
        let mut cov = Array2::<f64>::zeros((e, e));
        for i in 0..e {
            let li2 = lengthscales[i].mapv(|v| v.powi(-2));
            let xa = &inp * &li2;
            for j in 0..=i {
                let lj2 = lengthscales[j].mapv(|v| v.powi(-2));
                let lam = &li2 + &lj2;
                let r = Array2::from_shape_fn((d, d), |(p, q)| s[[p, q]] * lam[q]) + &eye;
                let (q, det_r) = solve_with_det(&r, s)?;
                check_det(det_r)?;
                let q = q / 2.0;

                let xb = (&inp * &lj2).mapv(|v| -v);
                let xa_q = xa.dot(&q);
                let xb_q = xb.dot(&q);
                let xs = (&xa_q * &xa).sum_axis(Axis(1));
                let x2s = (&xb_q * &xb).sum_axis(Axis(1));
                let cross = xa_q.dot(&xb.t());
                let l = Array2::from_shape_fn((n, n), |(a, b)| {
                    (log_k[[i, a]] + log_k[[j, b]] - 2.0 * cross[[a, b]] + xs[a] + x2s[b]).exp()
                });

                let mut v = f.beta.row(i).dot(&l.dot(&f.beta.row(j)));
                if i == j {
                    v -= (&f.ik[i] * &l).sum();
                }
                v /= det_r.sqrt();
                cov[[i, j]] = v;
                cov[[j, i]] = v;
            }
        }
        let cov = cov + Array2::from_diag(&variance) - outer(&mean.view(), &mean.view());
        trace!("GP prediction: mean = {:?}, cov = {:?}", mean, cov);

        Ok(Moments::new(mean, cov, cross_cov))
    }

    fn check_inputs(&self, m: &Array1<f64>, s: &Array2<f64>, f: &Factorizations) -> Result<()> {
        let (n, d, e) = (self.num_data(), self.num_dims(), self.num_outputs());
        if m.len() != d {
            return Err(PilcoError::dimension("GP input mean", &[d], m.shape()).into());
        }
        if s.dim() != (d, d) {
            return Err(PilcoError::dimension("GP input covariance", &[d, d], s.shape()).into());
        }
        if f.beta.dim() != (e, n) {
            return Err(PilcoError::dimension("GP beta", &[e, n], f.beta.shape()).into());
        }
        if f.ik.len() != e || f.ik.iter().any(|ik| ik.dim() != (n, n)) {
            return Err(PilcoError::dimension("GP inverse Gram matrices", &[e, n, n], &[f.ik.len()]).into());
        }
        Ok(())
    }
}

fn check_det(det: f64) -> Result<()> {
    match det > 0.0 && det.is_finite() {
        true => Ok(()),
        false => Err(PilcoError::Numerical(format!("non-positive determinant: {}", det)).into()),
    }
}

impl Parameterized for Mgpr {
    fn params(&self) -> Vec<(String, &Param)> {
        let mut params = vec![
            ("inputs".to_string(), &self.inputs),
            ("targets".to_string(), &self.targets),
            ("noise_variance".to_string(), &self.noise_variance),
        ];
        for (i, k) in self.kernels.iter().enumerate() {
            params.push((format!("kernel{}/lengthscales", i), k.lengthscales_param()));
            params.push((format!("kernel{}/variance", i), k.variance_param()));
        }
        params
    }

    fn params_mut(&mut self) -> Vec<(String, &mut Param)> {
        let mut params = vec![
            ("inputs".to_string(), &mut self.inputs),
            ("targets".to_string(), &mut self.targets),
            ("noise_variance".to_string(), &mut self.noise_variance),
        ];
        for (i, k) in self.kernels.iter_mut().enumerate() {
            let (lengthscales, variance) = k.params_pair_mut();
            params.push((format!("kernel{}/lengthscales", i), lengthscales));
            params.push((format!("kernel{}/variance", i), variance));
        }
        params
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::{arr1, arr2};

    fn gp() -> Result<Mgpr> {
        let x = arr2(&[[-1.0, 0.5], [0.0, 0.0], [0.7, -0.3], [1.5, 1.0]]);
        let y = arr2(&[[0.2, -1.0], [0.0, 0.5], [-0.4, 0.3], [1.0, 0.1]]);
        let mut gp = Mgpr::new(x, y)?;
        gp.kernels_mut()[0]
            .lengthscales_param_mut()
            .assign(arr2(&[[0.8, 1.3]]))?;
        gp.kernels_mut()[1]
            .variance_param_mut()
            .assign(arr2(&[[2.0]]))?;
        gp.noise_variance_mut().assign(arr2(&[[0.01, 0.05]]))?;
        Ok(gp)
    }

    #[test]
    fn test_deterministic_input() -> Result<()> {
        // With a point input the moments reduce to the usual GP posterior.
        let gp = gp()?;
        let m = arr1(&[0.3, -0.2]);
        let s = Array2::zeros((2, 2));
        let out = gp.predict_on_noisy_inputs(&m, &s)?;
        let f = gp.calculate_factorizations()?;

        let x = gp.inputs().value();
        let xs = m.clone().insert_axis(Axis(0));
        for i in 0..2 {
            let kern = &gp.kernels()[i];
            let ks = kern.k(&xs, &x)?.row(0).to_owned();
            let mu = ks.dot(&f.beta.row(i));
            let var = kern.variance() - ks.dot(&f.ik[i].dot(&ks));
            assert!((out.mean[i] - mu).abs() < 1e-10);
            assert!((out.cov[[i, i]] - var).abs() < 1e-10);
        }
        Ok(())
    }

    #[test]
    fn test_cross_cov_is_gradient() -> Result<()> {
        // At a point input, s^-1 Cov[x, f(x)] is the gradient of the mean.
        let gp = gp()?;
        let m = arr1(&[0.3, -0.2]);
        let s = Array2::zeros((2, 2));
        let out = gp.predict_on_noisy_inputs(&m, &s)?;

        let h = 1e-6;
        for p in 0..2 {
            let mut mp = m.clone();
            mp[p] += h;
            let mut mm = m.clone();
            mm[p] -= h;
            let fp = gp.predict_on_noisy_inputs(&mp, &s)?.mean;
            let fm = gp.predict_on_noisy_inputs(&mm, &s)?.mean;
            for i in 0..2 {
                let g = (fp[i] - fm[i]) / (2.0 * h);
                assert!((out.cross_cov[[p, i]] - g).abs() < 1e-6);
            }
        }
        Ok(())
    }

    #[test]
    fn test_uncertain_input() -> Result<()> {
        let gp = gp()?;
        let m = arr1(&[0.3, -0.2]);
        let s = arr2(&[[0.2, 0.05], [0.05, 0.1]]);
        let out = gp.predict_on_noisy_inputs(&m, &s)?;
        assert_eq!(out.mean.len(), 2);
        assert_eq!(out.cross_cov.dim(), (2, 2));
        assert_eq!(out.cov[[0, 1]], out.cov[[1, 0]]);
        assert!(out.cov[[0, 0]] > 0.0);
        assert!(out.cov[[1, 1]] > 0.0);
        assert!(out.cov[[0, 0]] * out.cov[[1, 1]] >= out.cov[[0, 1]] * out.cov[[0, 1]]);
        Ok(())
    }

    #[test]
    fn test_zeroed_factorizations() -> Result<()> {
        let gp = gp()?;
        let f = gp.calculate_factorizations()?.zeroed();
        assert!(f.ik.iter().all(|ik| ik.iter().all(|v| *v == 0.0)));

        let m = arr1(&[0.0, 0.0]);
        let s = Array2::eye(2) * 0.1;
        let full = gp.predict_on_noisy_inputs(&m, &s)?;
        let det = gp.predict_given_factorizations(&m, &s, &f)?;
        // Dropping the data term can only increase the variance.
        assert_eq!(full.mean, det.mean);
        assert!(det.cov[[0, 0]] > full.cov[[0, 0]]);
        Ok(())
    }

    #[test]
    fn test_dimension_error() -> Result<()> {
        let gp = gp()?;
        let f = gp.calculate_factorizations()?;
        let err = gp
            .predict_given_factorizations(&arr1(&[0.0]), &Array2::eye(1), &f)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PilcoError>(),
            Some(PilcoError::Dimension { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_param_names() -> Result<()> {
        let gp = gp()?;
        let names: Vec<String> = gp.params().into_iter().map(|(k, _)| k).collect();
        assert!(names.contains(&"kernel1/lengthscales".to_string()));
        assert_eq!(names.len(), 3 + 2 * 2);
        Ok(())
    }
}
