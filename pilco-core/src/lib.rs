#![warn(missing_docs)]
//! Core traits and moment transforms for PILCO controllers.
//!
//! A controller maps a Gaussian belief over the state, given as a mean vector
//! and a covariance matrix, to the moments of the resulting control action.
//! This crate holds what every controller shares: the [`Controller`] and
//! [`Parameterized`] traits, constrained parameters ([`Param`]), the
//! sine squashing transform ([`squash_sin`]) and the error type.
pub mod error;
pub mod param;
pub mod util;

mod base;
pub use base::{Configurable, Controller, Moments, Parameterized};

mod precision;
pub use precision::Precision;

mod squash;
pub use squash::{squash_sin, MaxAction};

pub use error::PilcoError;
pub use param::{NamedParams, Param, Transform};
