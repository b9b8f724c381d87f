//! Homing runs and the deferred home-switch interrupt consumer.

use embedded_hal::digital::{InputPin, OutputPin};

use super::MotorController;
use crate::event::{Event, EventSink, IndicatorSink, MoveSnapshot};
use crate::fmt::{debug, warn};
use crate::hal::{DriverInterface, MotionDriver};
use crate::settings::SettingsStore;
use crate::state::{HomingState, InitializationState, MotorState, MovementDirection};

impl<'a, DRV, MOT, HOME, EN, SET, EV, IND> MotorController<'a, DRV, MOT, HOME, EN, SET, EV, IND>
where
    DRV: DriverInterface,
    MOT: MotionDriver,
    HOME: InputPin,
    EN: OutputPin,
    SET: SettingsStore,
    EV: EventSink,
    IND: IndicatorSink,
{
    /// Start a homing run toward the home switch.
    ///
    /// If the switch is already engaged the zero reference is established
    /// immediately and the motor only backs off by the safety margin;
    /// repeating the command is harmless. Otherwise the motor runs backward
    /// until the switch edge terminates the run.
    pub(super) fn do_homing(&mut self) {
        debug!("homing");
        if self.at_home() {
            debug!("home switch already engaged");
            let margin = self.cfg.safety_margin_steps();
            self.motion.set_position(-margin.0);
            self.apply_homing_profile();
            if self.motion.move_to(0).is_err() {
                warn!("back-off move rejected");
            }
            self.homed = true;
            self.destination.position = 0;
            self.direction = MovementDirection::Standstill;
            self.set_motor_state(MotorState::Idle);
            self.emit(homed_event());
        } else {
            self.set_motor_state(MotorState::Homing);
            let position = self.current_position_mm();
            self.emit(Event::MotorState {
                state: MotorState::Homing.as_str(),
                error: None,
                warning: None,
                move_state: Some(MoveSnapshot {
                    position,
                    speed: self.cfg.homing_speed_mm_per_sec,
                }),
                destination: None,
                origin: None,
            });
            self.direction = MovementDirection::Backward;
            self.apply_homing_profile();
            self.motion.run_backward();
        }
    }

    /// Deferred consumer for the latched home-switch edge.
    ///
    /// Ignored unless the motor is travelling backward; forward travel and
    /// standstill can only produce bounce or release edges. A relevant hit
    /// always force-stops, latches position at the negative safety margin
    /// and settles the carriage at logical zero.
    pub(super) fn on_home_edge(&mut self) {
        if self.direction != MovementDirection::Backward {
            return;
        }
        let margin = self.cfg.safety_margin_steps();
        self.motion.force_stop_and_set_position(-margin.0);
        self.homed = true;
        self.destination.position = 0;
        self.direction = MovementDirection::Standstill;
        if self.motion.move_to(0).is_err() {
            warn!("back-off move rejected");
        }
        if self.init_state == InitializationState::GradientHoming {
            debug!("hit home switch while calibrating");
            // The calibration loop measures from the switch itself.
            self.motion.force_stop_and_set_position(0);
            self.init_state = InitializationState::GradientHome;
        } else if self.motor_state == MotorState::Homing {
            debug!("hit home switch while homing");
            self.set_motor_state(MotorState::Idle);
            self.emit(homed_event());
        } else if self.motor_state == MotorState::Driving {
            debug!("hit home switch while driving");
            // Let the regular arrival path report the premature stop.
            self.arrival_pending = true;
        }
    }

    /// Homing progress as reported to external observers.
    pub fn homing_state(&self) -> HomingState {
        if self.homed {
            HomingState::Ok
        } else if self.motor_state == MotorState::Homing {
            HomingState::Homing
        } else {
            HomingState::Unhomed
        }
    }

    /// Apply the homing speed/acceleration profile to the pulse generator.
    fn apply_homing_profile(&mut self) {
        let accel = self
            .cfg
            .steps_per_mm
            .steps_per_sec2(self.cfg.max_acceleration_mm_per_sec2);
        let speed = self
            .cfg
            .steps_per_mm
            .steps_per_sec(self.cfg.homing_speed_mm_per_sec);
        if self.motion.set_acceleration(accel).is_err() || self.motion.set_speed(speed).is_err() {
            warn!("motion driver rejected homing parameters");
        }
    }
}

/// The transient `HOMED` notification sent when a zero reference is
/// established. The carriage is at (or settling toward) logical zero.
fn homed_event() -> Event {
    Event::MotorState {
        state: MotorState::Homed.as_str(),
        error: None,
        warning: None,
        move_state: Some(MoveSnapshot {
            position: 0,
            speed: 0,
        }),
        destination: None,
        origin: None,
    }
}
