//! Outbound events and one-way collaborator sinks.
//!
//! Every internal state transition is translated into exactly one [`Event`]
//! handed to the injected [`EventSink`]; the transport layer (excluded from
//! this crate) frames and delivers it. Indicator rendering is likewise
//! reduced to a one-way [`IndicatorMode`] signal.

use serde::Serialize;

/// Position/speed snapshot carried in `move_state` payloads (mm, mm/s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveSnapshot {
    /// Position in millimeters.
    pub position: i32,
    /// Speed in millimeters per second.
    pub speed: i32,
}

/// Resolved move target (mm, mm/s, mm/s²).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Destination {
    /// Target position in millimeters.
    pub position: i32,
    /// Travel speed in millimeters per second.
    pub speed: i32,
    /// Acceleration in millimeters per second squared.
    pub acceleration: i32,
}

/// Structured outbound message.
///
/// Serializes to the wire schema with a `type` tag: `motor_state`,
/// `move_state` or `config`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Motor state transition, warning or error.
    MotorState {
        /// Wire name of the (possibly transient) motor state.
        state: &'static str,
        /// Driver error string, when faulted.
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<&'static str>,
        /// Rejection reason, for refused commands.
        #[serde(skip_serializing_if = "Option::is_none")]
        warning: Option<&'static str>,
        /// Position/speed at the time of the transition.
        #[serde(skip_serializing_if = "Option::is_none")]
        move_state: Option<MoveSnapshot>,
        /// Resolved destination, for accepted and finalized moves.
        #[serde(skip_serializing_if = "Option::is_none")]
        destination: Option<Destination>,
        /// Id of the client whose command triggered the transition.
        #[serde(skip_serializing_if = "Option::is_none")]
        origin: Option<i32>,
    },
    /// Periodic progress report while driving.
    MoveState {
        /// Position in millimeters.
        position: i32,
        /// Speed in millimeters per second.
        speed: i32,
    },
    /// Echo of the persisted configuration.
    Config {
        /// Whether power-on homing is enabled.
        #[serde(rename = "autoHome")]
        auto_home: bool,
        /// Id of the client that requested the change.
        origin: i32,
    },
}

impl Event {
    /// A bare `motor_state` event carrying only the state string.
    pub fn state(state: &'static str) -> Self {
        Event::MotorState {
            state,
            error: None,
            warning: None,
            move_state: None,
            destination: None,
            origin: None,
        }
    }

    /// A `motor_state` event with a warning string.
    pub fn warning(state: &'static str, warning: &'static str) -> Self {
        Event::MotorState {
            state,
            error: None,
            warning: Some(warning),
            move_state: None,
            destination: None,
            origin: None,
        }
    }

    /// A `motor_state` event with an error string.
    pub fn error(state: &'static str, error: &'static str) -> Self {
        Event::MotorState {
            state,
            error: Some(error),
            warning: None,
            move_state: None,
            destination: None,
            origin: None,
        }
    }
}

/// Consumer of outbound events.
///
/// One method per exchange: the tagged [`Event`] union keeps the adaptor's
/// match exhaustive when event kinds are added.
pub trait EventSink {
    /// Deliver one event.
    fn emit(&mut self, event: Event);
}

/// Indicator mode, consumed one-way by the excluded light-rendering
/// subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorMode {
    /// Driver setup or calibration in progress.
    Initializing,
    /// Unrecoverable-until-retried fault.
    Error,
    /// Homing run in progress.
    Homing,
    /// Ready for commands.
    Idle,
    /// Move in progress.
    Driving,
}

/// One-way setter for the external indicator.
pub trait IndicatorSink {
    /// Switch the indicator to the given mode.
    fn set_mode(&mut self, mode: IndicatorMode);
}
