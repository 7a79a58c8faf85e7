//! Core functionalities.
mod configurable;
mod controller;
mod moments;
mod parameterized;
pub use configurable::Configurable;
pub use controller::Controller;
pub use moments::Moments;
pub use parameterized::Parameterized;
