//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::ControllerConfig;

/// Validate a controller configuration.
///
/// Checks:
/// - Steps-per-mm and homing speed are positive
/// - Microsteps is a power of two up to 256
/// - Convergence threshold and RMS current are non-zero
/// - All poll and settle intervals are non-zero
pub fn validate_config(config: &ControllerConfig) -> Result<()> {
    if config.steps_per_mm.value() == 0 {
        return Err(Error::Config(ConfigError::InvalidStepsPerMm(
            config.steps_per_mm.value(),
        )));
    }

    let ms = config.microsteps_per_step;
    if ms == 0 || ms > 256 || !ms.is_power_of_two() {
        return Err(Error::Config(ConfigError::InvalidMicrosteps(ms)));
    }

    if config.homing_speed_mm_per_sec <= 0 {
        return Err(Error::Config(ConfigError::InvalidHomingSpeed(
            config.homing_speed_mm_per_sec,
        )));
    }

    if config.convergence_threshold == 0 {
        return Err(Error::Config(ConfigError::InvalidConvergenceThreshold(0)));
    }

    if config.rms_current_ma == 0 {
        return Err(Error::Config(ConfigError::InvalidRmsCurrent(0)));
    }

    let intervals = [
        ("gradient_settle_ms", config.gradient_settle_ms),
        ("current_scaling_settle_ms", config.current_scaling_settle_ms),
        ("retry_backoff_ms", config.retry_backoff_ms),
        ("reinit_delay_ms", config.reinit_delay_ms),
        ("driver_poll_ms", config.driver_poll_ms),
        ("move_poll_ms", config.move_poll_ms),
    ];
    for (field, millis) in intervals {
        if millis == 0 {
            return Err(Error::Config(ConfigError::InvalidInterval { field, millis }));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ControllerConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_zero_threshold() {
        let config = ControllerConfig {
            convergence_threshold: 0,
            ..Default::default()
        };
        assert_eq!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidConvergenceThreshold(0)))
        );
    }

    #[test]
    fn test_rejects_non_power_of_two_microsteps() {
        let config = ControllerConfig {
            microsteps_per_step: 12,
            ..Default::default()
        };
        assert_eq!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidMicrosteps(12)))
        );
    }

    #[test]
    fn test_rejects_zero_interval() {
        let config = ControllerConfig {
            move_poll_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidInterval { .. }))
        ));
    }
}
