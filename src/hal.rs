//! Hardware collaborator traits.
//!
//! The controller core has no compile-time dependency on a concrete driver
//! chip or pulse generator: the register-level chip interface and the
//! step-pulse generator are injected behind these traits at construction,
//! alongside `embedded-hal` pins for the home switch and hardware-enable
//! line.

use crate::error::MotionError;
use crate::state::MovementDirection;

/// Driver chip behavior while the motor is not actively stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StandstillMode {
    /// Normal operation (holding current).
    #[default]
    Normal,
    /// Coils released, shaft turns freely.
    Freewheeling,
    /// Coils shorted through the low side for passive braking.
    Braking,
    /// Strong braking through the driver stage.
    StrongBraking,
}

/// Register-level interface to the stepper-driver chip.
///
/// Mirrors the configuration and health surface of a UART-addressed driver
/// (current control, microstepping, chopper mode) plus the auto-scale
/// feedback value used by gradient calibration. All writes are fire-and-
/// forget: a chip that is not listening simply ignores them, which the
/// health queries detect afterwards.
pub trait DriverInterface {
    /// (Re)initialize the register channel to the chip.
    fn connect(&mut self);

    /// Set the microstep resolution.
    fn set_microsteps_per_step(&mut self, microsteps: u16);

    /// Set the motor RMS current limit, given the external sense resistor.
    fn set_rms_current(&mut self, milliamps: u16, sense_resistor_ohms: f32);

    /// Configure standstill behavior.
    fn set_standstill_mode(&mut self, mode: StandstillMode);

    /// Invert the motor direction.
    fn set_inverse_motor_direction(&mut self, inverted: bool);

    /// Set the velocity threshold below which smooth low-speed stepping
    /// (quiet chopper mode) is used.
    fn set_smooth_chop_threshold(&mut self, threshold: u32);

    /// Enable the quiet low-speed chopper mode.
    fn enable_smooth_chop(&mut self);

    /// Disable the high-current stepping mode.
    fn disable_high_current_stepping(&mut self);

    /// Set the stall detection threshold (0 disables stall output).
    fn set_stall_threshold(&mut self, threshold: u8);

    /// Software-enable the driver stage.
    fn enable(&mut self);

    /// Software-disable the driver stage.
    fn disable(&mut self);

    /// Start automatic standstill current-offset calibration.
    fn enable_automatic_current_scaling(&mut self);

    /// Start automatic current-gradient adaptation.
    fn enable_automatic_gradient_adaptation(&mut self);

    /// Chip-reported auto-scale feedback; magnitude shrinks toward zero as
    /// gradient calibration converges.
    fn auto_scale_feedback(&mut self) -> i16;

    /// Read the adapted current gradient.
    fn gradient(&mut self) -> u8;

    /// Read the calibrated current offset.
    fn offset(&mut self) -> u8;

    /// Write a previously persisted current gradient.
    fn set_gradient(&mut self, gradient: u8);

    /// Write a previously persisted current offset.
    fn set_offset(&mut self, offset: u8);

    /// The chip answers register reads.
    fn is_communicating(&mut self) -> bool;

    /// The chip answers and carries the expected configuration.
    fn is_setup_and_communicating(&mut self) -> bool;

    /// The chip answers but lost its configuration (e.g. motor power
    /// cycled while logic power stayed up).
    fn is_communicating_but_not_setup(&mut self) -> bool;
}

/// Step-pulse generator accepting position/speed/acceleration targets.
///
/// Positions are absolute steps from the zeroed home reference; speeds are
/// steps per second, signed by travel direction.
pub trait MotionDriver {
    /// Set the acceleration for subsequent moves in steps/s².
    fn set_acceleration(&mut self, steps_per_sec2: i64) -> Result<(), MotionError>;

    /// Set the travel speed for subsequent moves in steps/s.
    fn set_speed(&mut self, steps_per_sec: i64) -> Result<(), MotionError>;

    /// Start or retarget a move to an absolute position.
    fn move_to(&mut self, target_steps: i64) -> Result<(), MotionError>;

    /// Start a move relative to the current position.
    fn move_relative(&mut self, delta_steps: i64) -> Result<(), MotionError>;

    /// Run continuously toward the home switch (negative direction) at the
    /// configured speed.
    fn run_backward(&mut self);

    /// Decelerate to a stop at the configured acceleration.
    fn stop(&mut self);

    /// Stop immediately, discarding the ramp.
    fn force_stop(&mut self);

    /// Stop immediately and redefine the current position.
    fn force_stop_and_set_position(&mut self, position_steps: i64);

    /// Redefine the current position without moving.
    fn set_position(&mut self, position_steps: i64);

    /// Current absolute position in steps.
    fn current_position(&mut self) -> i64;

    /// Current speed in steps/s, signed by direction; 0 at standstill.
    fn current_speed(&mut self) -> i64;

    /// Perform one low-speed step, blocking until the pulse completes.
    ///
    /// Used exactly once per calibration to let the driver's current
    /// scaling settle; bounded to a few hundred milliseconds.
    fn step_once_blocking(&mut self, direction: MovementDirection);

    /// Let the generator gate the driver's hardware-enable line around
    /// moves instead of keeping it asserted.
    fn set_auto_enable(&mut self, auto: bool);
}
