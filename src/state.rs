//! Controller state enums.
//!
//! Every enum-to-string or enum-to-enum mapping is an exhaustive match so
//! that adding a state is a compile error until every consumer handles it.

use crate::event::IndicatorMode;

/// Motor supervision state.
///
/// Owned exclusively by the motor controller and mutated only inside tick
/// bodies, never in interrupt context. `Homed`, `Arrived`, `Stopped` and
/// `Warning` are transient: they appear in outbound events but are
/// immediately superseded and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotorState {
    /// Power-on state, nothing known yet.
    #[default]
    Unknown,
    /// Driver chip present but not configured.
    Uninitialized,
    /// Calibrated and ready for commands.
    Idle,
    /// Homing run toward the limit switch in progress.
    Homing,
    /// Home switch reached (transient, event-only).
    Homed,
    /// Executing a position move.
    Driving,
    /// Move destination reached (transient, event-only).
    Arrived,
    /// Move ended, possibly prematurely (transient, event-only).
    Stopped,
    /// Command rejected (transient, event-only).
    Warning,
    /// Driver fault or rejected motion parameter.
    Error,
}

impl MotorState {
    /// Wire string for outbound `motor_state` events.
    pub fn as_str(self) -> &'static str {
        match self {
            MotorState::Unknown => "UNKNOWN",
            MotorState::Uninitialized => "UNINITIALIZED",
            MotorState::Idle => "IDLE",
            MotorState::Homing => "HOMING",
            MotorState::Homed => "HOMED",
            MotorState::Driving => "DRIVING",
            MotorState::Arrived => "ARRIVED",
            MotorState::Stopped => "STOPPED",
            MotorState::Warning => "WARNING",
            MotorState::Error => "ERROR",
        }
    }

    /// Indicator mode shown while in this state.
    pub fn indicator_mode(self) -> IndicatorMode {
        match self {
            MotorState::Unknown | MotorState::Uninitialized => IndicatorMode::Initializing,
            MotorState::Homing => IndicatorMode::Homing,
            MotorState::Driving => IndicatorMode::Driving,
            MotorState::Error => IndicatorMode::Error,
            MotorState::Idle
            | MotorState::Homed
            | MotorState::Arrived
            | MotorState::Stopped
            | MotorState::Warning => IndicatorMode::Idle,
        }
    }
}

/// Live communication health with the driver chip.
///
/// Polled by the fault monitor, never set directly by commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverComState {
    /// Not yet probed.
    #[default]
    Unknown,
    /// Chip answers but lost its configuration.
    Uninitialized,
    /// Chip answers and is fully configured.
    Ok,
    /// Chip does not answer.
    Error,
}

impl DriverComState {
    /// Human-readable name.
    pub fn as_str(self) -> &'static str {
        match self {
            DriverComState::Unknown => "UNKNOWN",
            DriverComState::Uninitialized => "UNINITIALIZED",
            DriverComState::Ok => "OK",
            DriverComState::Error => "ERROR",
        }
    }
}

/// Progress of the driver calibration sequence.
///
/// Terminal state [`InitializationState::Ok`] unlocks motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitializationState {
    /// No configuration applied yet.
    #[default]
    Uninitialized,
    /// Gradient calibration moving toward the home switch.
    GradientHoming,
    /// Gradient calibration hit the home switch.
    GradientHome,
    /// Gradient calibration moving away from the home switch.
    GradientDehoming,
    /// Calibration converged, driver validated.
    Ok,
}

/// Current or intended travel direction.
///
/// A single shared token: the homing subsystem's deferred interrupt
/// consumer reads it to decide whether a home hit is relevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementDirection {
    /// Away from the home switch (increasing position).
    Forward,
    /// Toward the home switch (decreasing position).
    Backward,
    /// Not moving.
    #[default]
    Standstill,
}

/// Homing progress reported by [`homing_state`](crate::MotorController::homing_state).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomingState {
    /// Zero reference established this session.
    Ok,
    /// Homing run in progress.
    Homing,
    /// No zero reference yet.
    Unhomed,
}

impl HomingState {
    /// Human-readable name.
    pub fn as_str(self) -> &'static str {
        match self {
            HomingState::Ok => "OK",
            HomingState::Homing => "HOMING",
            HomingState::Unhomed => "UNHOMED",
        }
    }
}
