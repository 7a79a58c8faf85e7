//! Gated mixture of a linear and an RBF controller.
mod base;
mod config;
pub use base::CombinedController;
pub use config::{CombinedControllerConfig, GateShape};
