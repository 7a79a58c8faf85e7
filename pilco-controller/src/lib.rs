//! Controllers propagating a Gaussian state belief analytically.
//!
//! * [`LinearController`] - affine map `W x + b`.
//! * [`RbfController`] - deterministic GP over a set of pseudo-training points.
//! * [`CombinedController`] - smooth state-dependent mixture of the two.
//!
//! Every controller implements [`Controller`](pilco_core::Controller) and can
//! squash its output into a bounded range with
//! [`squash_sin`](pilco_core::squash_sin).
pub mod combined;
pub mod control_design;
pub mod linear;
pub mod rbf;
mod util;
pub use combined::{CombinedController, CombinedControllerConfig, GateShape};
pub use linear::{LinearController, LinearControllerConfig};
pub use rbf::{RbfController, RbfControllerConfig};
