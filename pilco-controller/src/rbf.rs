//! Controller represented by a deterministic Gaussian process.
mod base;
mod config;
pub use base::RbfController;
pub use config::RbfControllerConfig;
