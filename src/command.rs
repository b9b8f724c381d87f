//! Inbound commands.
//!
//! The remote transport delivers structured messages tagged by `type`;
//! anything unrecognized deserializes to [`Command::Unknown`] and is
//! answered with a warning event instead of being dropped silently.

use serde::Deserialize;

fn default_origin() -> i32 {
    -1
}

/// Structured inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Move to an absolute position.
    Move {
        /// Target position in millimeters.
        position: i32,
        /// Travel speed in millimeters per second.
        speed: i32,
        /// Acceleration in millimeters per second squared.
        acceleration: i32,
        /// Id of the requesting client, echoed in the response.
        #[serde(default = "default_origin")]
        origin: i32,
    },
    /// Decelerate and stop the current movement.
    Stop,
    /// Run the homing sequence.
    Home,
    /// Persist the auto-home preference.
    UpdateConfig {
        /// Whether to home automatically after power-on calibration.
        #[serde(rename = "autoHome")]
        auto_home: bool,
        /// Id of the requesting client, echoed in the response.
        #[serde(default = "default_origin")]
        origin: i32,
    },
    /// Any unrecognized command type.
    #[serde(other)]
    Unknown,
}
