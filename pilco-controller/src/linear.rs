//! Affine controller.
mod base;
mod config;
pub use base::LinearController;
pub use config::LinearControllerConfig;
