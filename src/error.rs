//! Error types for stepper-drive.
//!
//! Command-validation faults are surfaced once via an outbound event and
//! otherwise left for the caller to correct; hardware faults are absorbed by
//! the fault monitor. Nothing here is fatal to the process.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-drive operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Command rejected during validation
    Command(CommandError),
    /// Motion driver rejected a parameter
    Motion(MotionError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Steps-per-millimeter must be > 0
    InvalidStepsPerMm(u32),
    /// Invalid microstep value (must be power of 2: 1, 2, 4, 8, 16, 32, 64, 128, 256)
    InvalidMicrosteps(u16),
    /// Homing speed must be > 0
    InvalidHomingSpeed(i32),
    /// Convergence threshold must be > 0
    InvalidConvergenceThreshold(u16),
    /// A poll or settle interval must be > 0
    InvalidInterval {
        /// Name of the offending field
        field: &'static str,
        /// Configured value in milliseconds
        millis: u64,
    },
    /// RMS current must be > 0
    InvalidRmsCurrent(u16),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Command validation errors.
///
/// These are all surfaced as `Warning` events and never mutate motor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Command arrived in a state that forbids it
    DisallowedTransition {
        /// Motor state at the time of the command
        state: &'static str,
    },
    /// Requested speed is zero
    UnplausibleSpeed(i32),
    /// Unrecognized command type
    UnknownCommand,
}

/// Motion driver parameter rejections.
///
/// Fatal for the current command: the motor transitions to `Error` and stays
/// there until the fault monitor observes a driver recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionError {
    /// Acceleration rejected by the motion driver
    InvalidAcceleration(i32),
    /// Speed rejected by the motion driver
    InvalidSpeed(i32),
    /// Target position rejected by the motion driver
    InvalidTarget(i32),
}

/// Driver fault codes carried in outbound `error` event fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// Unclassified driver fault
    Unknown,
    /// Motor power lost (driver chip unresponsive)
    Power,
    /// Over-temperature
    Temperature,
    /// Coil A open or shorted
    CoilA,
    /// Coil B open or shorted
    CoilB,
}

impl DriverError {
    /// Human-readable error string for outbound events.
    pub fn as_str(self) -> &'static str {
        match self {
            DriverError::Unknown => "Unknown Error",
            DriverError::Power => "Power Failed",
            DriverError::Temperature => "Temperature",
            DriverError::CoilA => "Coil A",
            DriverError::CoilB => "Coil B",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Command(e) => write!(f, "Command error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidStepsPerMm(v) => {
                write!(f, "Invalid steps per mm: {}. Must be > 0", v)
            }
            ConfigError::InvalidMicrosteps(v) => {
                write!(f, "Invalid microsteps: {}. Valid values: 1, 2, 4, 8, 16, 32, 64, 128, 256", v)
            }
            ConfigError::InvalidHomingSpeed(v) => {
                write!(f, "Invalid homing speed: {}. Must be > 0", v)
            }
            ConfigError::InvalidConvergenceThreshold(v) => {
                write!(f, "Invalid convergence threshold: {}. Must be > 0", v)
            }
            ConfigError::InvalidInterval { field, millis } => {
                write!(f, "Invalid interval {} = {} ms. Must be > 0", field, millis)
            }
            ConfigError::InvalidRmsCurrent(v) => {
                write!(f, "Invalid RMS current: {} mA. Must be > 0", v)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::DisallowedTransition { state } => {
                write!(f, "Command not allowed in state {}", state)
            }
            CommandError::UnplausibleSpeed(v) => write!(f, "Unplausible speed: {}", v),
            CommandError::UnknownCommand => write!(f, "Unknown command"),
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::InvalidAcceleration(v) => {
                write!(f, "Motion driver rejected acceleration {}", v)
            }
            MotionError::InvalidSpeed(v) => write!(f, "Motion driver rejected speed {}", v),
            MotionError::InvalidTarget(v) => {
                write!(f, "Motion driver rejected target position {}", v)
            }
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Error::Command(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for CommandError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}
