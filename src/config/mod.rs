//! Configuration module for stepper-drive.
//!
//! Provides the controller tunables with serde defaults, TOML loading
//! (with the `std` feature) and validation.

mod controller;
#[cfg(feature = "std")]
mod loader;
pub mod units;
mod validation;

pub use controller::ControllerConfig;
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Steps, StepsPerMm};
