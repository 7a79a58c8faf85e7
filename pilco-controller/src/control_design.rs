//! Linear-quadratic regulator design for seeding a [`LinearController`](crate::LinearController).
//!
//! The continuous-time algebraic Riccati equation
//!
//! ```text
//! A^T P + P A - P B R^-1 B^T P + Q = 0
//! ```
//!
//! is solved with the matrix sign function of the Hamiltonian matrix. The
//! optimal control law is `u = -K x` with `K = R^-1 B^T P`.
use anyhow::Result;
use log::debug;
use nalgebra::DMatrix;
use ndarray::{arr1, arr2, Array2};
use pilco_core::{
    util::{from_dmatrix, spd_inverse, symmetrize, to_dmatrix},
    PilcoError,
};
use serde::{Deserialize, Serialize};

const MAX_ITERS: usize = 100;
const TOLERANCE: f64 = 1e-10;
const SVD_EPS: f64 = 1e-14;

/// Solution of an LQR problem.
#[derive(Clone, Debug, PartialEq)]
pub struct Lqr {
    /// Feedback gain `K`, `control_dim x state_dim`.
    pub gain: Array2<f64>,

    /// Stabilizing solution `P` of the Riccati equation.
    pub riccati: Array2<f64>,
}

/// Computes the LQR gain of `dx/dt = A x + B u` with cost `x^T Q x + u^T R u`.
pub fn lqr(a: &Array2<f64>, b: &Array2<f64>, q: &Array2<f64>, r: &Array2<f64>) -> Result<Lqr> {
    let (n, m) = b.dim();
    if a.dim() != (n, n) {
        return Err(PilcoError::dimension("LQR A", &[n, n], a.shape()).into());
    }
    if q.dim() != (n, n) {
        return Err(PilcoError::dimension("LQR Q", &[n, n], q.shape()).into());
    }
    if r.dim() != (m, m) {
        return Err(PilcoError::dimension("LQR R", &[m, m], r.shape()).into());
    }

    let ir = spd_inverse(r)?;
    let g = b.dot(&ir).dot(&b.t());
    let a_ = to_dmatrix(&a.view());

    let mut h = DMatrix::<f64>::zeros(2 * n, 2 * n);
    h.view_mut((0, 0), (n, n)).copy_from(&a_);
    h.view_mut((0, n), (n, n)).copy_from(&(-to_dmatrix(&g.view())));
    h.view_mut((n, 0), (n, n)).copy_from(&(-to_dmatrix(&q.view())));
    h.view_mut((n, n), (n, n)).copy_from(&(-a_.transpose()));
    let w = matrix_sign(h)?;

    // [W12; W22 + I] P = -[W11 + I; W21]
    let eye = DMatrix::<f64>::identity(n, n);
    let mut lhs = DMatrix::<f64>::zeros(2 * n, n);
    lhs.view_mut((0, 0), (n, n))
        .copy_from(&w.view((0, n), (n, n)));
    lhs.view_mut((n, 0), (n, n))
        .copy_from(&(w.view((n, n), (n, n)).clone_owned() + &eye));
    let mut rhs = DMatrix::<f64>::zeros(2 * n, n);
    rhs.view_mut((0, 0), (n, n))
        .copy_from(&(-(w.view((0, 0), (n, n)).clone_owned() + &eye)));
    rhs.view_mut((n, 0), (n, n))
        .copy_from(&(-w.view((n, 0), (n, n)).clone_owned()));

    let p = lhs
        .svd(true, true)
        .solve(&rhs, SVD_EPS)
        .map_err(|e| PilcoError::Numerical(e.to_string()))?;
    let p = symmetrize(&from_dmatrix(&p));
    let k = ir.dot(&b.t()).dot(&p);
    debug!("LQR gain: {:?}", k);

    Ok(Lqr {
        gain: k,
        riccati: p,
    })
}

/// Newton iteration for the matrix sign function with determinant scaling.
fn matrix_sign(mut z: DMatrix<f64>) -> Result<DMatrix<f64>> {
    let dim = z.nrows() as f64;
    for i in 0..MAX_ITERS {
        let lu = z.clone().lu();
        let det = lu.determinant();
        let iz = lu.try_inverse().ok_or_else(|| {
            PilcoError::Numerical("Hamiltonian matrix has eigenvalues on the imaginary axis".into())
        })?;
        let c = (det.abs().ln() / dim).exp();
        let next = (&z / c + iz * c) * 0.5;
        let delta = (&next - &z).norm();
        z = next;
        if delta <= TOLERANCE * z.norm() {
            debug!("Matrix sign converged after {} iterations", i + 1);
            return Ok(z);
        }
    }
    Err(PilcoError::Numerical("matrix sign iteration did not converge".into()).into())
}

/// A plant with a linearization around its operating point.
pub trait LinearizedSystem {
    /// Returns `(A, B)` of `dx/dt = A x + B u`.
    fn linearize(&self) -> (Array2<f64>, Array2<f64>);

    /// State cost `Q`.
    fn state_cost(&self) -> Array2<f64>;

    /// Control cost `R`.
    fn control_cost(&self) -> Array2<f64> {
        let (_, b) = self.linearize();
        Array2::eye(b.ncols())
    }

    /// LQR solution for this system.
    fn lqr(&self) -> Result<Lqr> {
        let (a, b) = self.linearize();
        lqr(&a, &b, &self.state_cost(), &self.control_cost())
    }
}

/// Cart-pole balancing around the upright position.
///
/// The state is `[x, dx/dt, theta, dtheta/dt]` and the control is the force
/// applied to the cart. The pole is a uniform rod pivoting at its end.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct InvertedPendulum {
    /// Mass of the cart.
    pub cart_mass: f64,

    /// Mass of the pole.
    pub pole_mass: f64,

    /// Length of the pole.
    pub length: f64,

    /// Friction coefficient of the cart.
    pub friction: f64,

    /// Gravitational acceleration.
    pub gravity: f64,
}

impl Default for InvertedPendulum {
    fn default() -> Self {
        Self {
            cart_mass: 0.5,
            pole_mass: 0.5,
            length: 0.6,
            friction: 0.1,
            gravity: 9.82,
        }
    }
}

impl LinearizedSystem for InvertedPendulum {
    fn linearize(&self) -> (Array2<f64>, Array2<f64>) {
        let (mc, m, b, g) = (self.cart_mass, self.pole_mass, self.friction, self.gravity);
        let inertia = m * self.length.powi(2) / 12.0;
        let r = self.length / 2.0;
        let p = inertia * (mc + m) + mc * m * r * r;

        let a = arr2(&[
            [0.0, 1.0, 0.0, 0.0],
            [0.0, -(inertia + m * r * r) * b / p, m * m * g * r * r / p, 0.0],
            [0.0, 0.0, 0.0, 1.0],
            [0.0, -m * r * b / p, m * g * r * (mc + m) / p, 0.0],
        ]);
        let b = arr2(&[[0.0], [(inertia + m * r * r) / p], [0.0], [m * r / p]]);
        (a, b)
    }

    fn state_cost(&self) -> Array2<f64> {
        Array2::from_diag(&arr1(&[1.0, 0.0, 1.0, 0.0]))
    }
}

/// Pendulum swinging around its lower rest position.
///
/// The state is `[dtheta/dt, theta]` with `sin(theta)` approximated by
/// `theta`, and the control is the applied torque.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SwingUpPendulum {
    /// Mass of the pendulum.
    pub mass: f64,

    /// Length of the pendulum.
    pub length: f64,

    /// Friction coefficient at the pivot.
    pub friction: f64,

    /// Gravitational acceleration.
    pub gravity: f64,
}

impl Default for SwingUpPendulum {
    fn default() -> Self {
        Self {
            mass: 1.0,
            length: 1.0,
            friction: 0.1,
            gravity: 9.82,
        }
    }
}

impl LinearizedSystem for SwingUpPendulum {
    fn linearize(&self) -> (Array2<f64>, Array2<f64>) {
        let (m, l) = (self.mass, self.length);
        let inertia = m * l * l / 12.0;
        let p = m * l * l / 4.0 + inertia;
        let a = arr2(&[[-self.friction / p, -m * l * self.gravity / 2.0], [1.0, 0.0]]);
        let b = arr2(&[[1.0 / p], [0.0]]);
        (a, b)
    }

    fn state_cost(&self) -> Array2<f64> {
        Array2::from_diag(&arr1(&[1.0, 0.0]))
    }
}
