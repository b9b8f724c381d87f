//! Controller configuration from TOML.

use serde::Deserialize;

use super::units::{Steps, StepsPerMm};

/// Complete controller configuration.
///
/// Every field has a default matching the reference actuator (NEMA 17,
/// 8 mm pitch, TMC-class driver), so `ControllerConfig::default()` is a
/// usable configuration and TOML files only need to override what differs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Linear resolution in steps per millimeter.
    pub steps_per_mm: StepsPerMm,

    /// Homing and calibration travel speed in mm/s.
    pub homing_speed_mm_per_sec: i32,

    /// Acceleration used for homing, calibration moves and forced stops,
    /// in mm/s².
    pub max_acceleration_mm_per_sec2: i32,

    /// Auto-scale feedback magnitude below which current-gradient
    /// calibration is considered converged.
    ///
    /// Observed working values range from 10 to 50; tune per mechanics.
    pub convergence_threshold: u16,

    /// Settle time after each calibration test move before sampling the
    /// auto-scale feedback, in milliseconds.
    pub gradient_settle_ms: u64,

    /// Settle time for the driver's standstill current-offset calibration
    /// after the single blocking step, in milliseconds.
    pub current_scaling_settle_ms: u64,

    /// Back-off before retrying driver initialization when the chip does
    /// not respond, in milliseconds.
    pub retry_backoff_ms: u64,

    /// Delay before re-initializing a driver that reports
    /// communicating-but-not-setup, in milliseconds.
    pub reinit_delay_ms: u64,

    /// Driver communication-health poll interval, in milliseconds.
    pub driver_poll_ms: u64,

    /// Position/speed progress poll interval while driving, in milliseconds.
    pub move_poll_ms: u64,

    /// Calibration move length away from the home switch, in millimeters.
    pub dehome_distance_mm: i32,

    /// Calibration move length toward the home switch, in millimeters.
    pub approach_distance_mm: i32,

    /// Microstep resolution written to the driver chip.
    pub microsteps_per_step: u16,

    /// Motor RMS current limit in milliamperes.
    pub rms_current_ma: u16,

    /// External sense resistor value in ohms.
    pub sense_resistor_ohms: f32,

    /// Chopper-mode velocity threshold applied after calibration; smooth
    /// low-speed stepping is active below it.
    pub smooth_chop_threshold: u32,

    /// Invert the motor direction at the driver chip.
    pub invert_direction: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            steps_per_mm: StepsPerMm::default(),
            homing_speed_mm_per_sec: 33,
            max_acceleration_mm_per_sec2: 1600,
            convergence_threshold: 50,
            gradient_settle_ms: 500,
            current_scaling_settle_ms: 250,
            retry_backoff_ms: 1000,
            reinit_delay_ms: 100,
            driver_poll_ms: 1000,
            move_poll_ms: 50,
            dehome_distance_mm: 3,
            approach_distance_mm: 2,
            microsteps_per_step: 16,
            rms_current_ma: 1414,
            sense_resistor_ohms: 0.11,
            smooth_chop_threshold: 188,
            invert_direction: true,
        }
    }
}

impl ControllerConfig {
    /// Position offset recorded when the home switch closes, in steps.
    ///
    /// Half a millimeter: the switch trips slightly before the mechanical
    /// end, so logical zero sits a safety margin away from it.
    #[inline]
    pub fn safety_margin_steps(&self) -> Steps {
        Steps(self.steps_per_mm.value() as i64 / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.steps_per_mm.value(), 400);
        assert_eq!(config.convergence_threshold, 50);
        assert_eq!(config.safety_margin_steps(), Steps(200));
    }
}
