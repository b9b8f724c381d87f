//! # stepper-drive
//!
//! Supervisory firmware core for a linear stepper actuator: driver chip
//! calibration, interrupt-driven homing, move execution and fault recovery,
//! with all hardware injected behind traits.
//!
//! ## Features
//!
//! - **Self-calibrating**: Automatic current-gradient calibration against
//!   the home switch, persisted for fast re-initialization
//! - **Interrupt-safe homing**: Home switch and diagnostic edges latch
//!   atomic signals consumed by the next scheduler tick
//! - **Fault recovery**: Driver brown-outs and power loss are detected,
//!   reported once and recovered without a reboot
//! - **Structured events**: Every state transition becomes exactly one
//!   serializable event for the transport layer
//! - **no_std compatible**: Core library works without standard library
//! - **Hardware-agnostic**: Driver chip, pulse generator and pins are
//!   injected behind traits; `embedded-hal` 1.0 digital pins
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_drive::{Command, ControllerConfig, MotorController, Signals, StatusSignal};
//!
//! static READY: StatusSignal = StatusSignal::new();
//! static HOME: StatusSignal = StatusSignal::new();
//! static DIAG: StatusSignal = StatusSignal::new();
//!
//! let config: ControllerConfig = stepper_drive::load_config("drive.toml")?;
//! let mut controller = MotorController::new(
//!     driver, motion, home_switch, enable_pin, store, events, indicator,
//!     config,
//!     Signals { ready: &READY, home: &HOME, diagnostic: &DIAG },
//! );
//!
//! // Scheduler loop: tick, then dispatch queued commands.
//! loop {
//!     controller.tick(millis());
//!     while let Some(command) = queue.pop() {
//!         let _ = controller.handle_command(millis(), command);
//!     }
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

mod fmt;

// Core modules
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod hal;
pub mod settings;
pub mod signal;
pub mod state;

// Re-exports for ergonomic API
pub use command::Command;
pub use config::{validate_config, ControllerConfig};
pub use controller::{Millis, MotorController, Parts, Signals};
pub use error::{CommandError, ConfigError, DriverError, Error, MotionError, Result};
pub use event::{Destination, Event, EventSink, IndicatorMode, IndicatorSink, MoveSnapshot};
pub use hal::{DriverInterface, MotionDriver, StandstillMode};
pub use settings::{MemoryStore, PersistentSettings, SettingsStore};
pub use signal::StatusSignal;
pub use state::{
    DriverComState, HomingState, InitializationState, MotorState, MovementDirection,
};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Steps, StepsPerMm};
