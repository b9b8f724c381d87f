//! Move execution, progress polling and arrival detection.

use embedded_hal::digital::{InputPin, OutputPin};

use super::{Millis, MotorController};
use crate::config::Steps;
use crate::error::{CommandError, Error, Result};
use crate::event::{Destination, Event, EventSink, IndicatorSink, MoveSnapshot};
use crate::fmt::{debug, error, warn};
use crate::hal::{DriverInterface, MotionDriver};
use crate::settings::{SettingsStore, KEY_ACCELERATION, KEY_SPEED};
use crate::state::{MotorState, MovementDirection};

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
    /// Start (or retarget) a move to an absolute position.
    ///
    /// Exactly one outbound event is emitted per call: the accepted-move
    /// notification, an `ARRIVED` short-circuit for a destination identical
    /// to the current one, or a rejection warning/error. Rejections also
    /// surface as a typed error for the caller; they never mutate motor
    /// state or settings.
    pub(super) fn start_move(
        &mut self,
        now: Millis,
        position: i32,
        speed: i32,
        acceleration: i32,
        origin: i32,
    ) -> Result<()> {
        debug!("move to {} at {}", position, speed);
        if !matches!(self.motor_state, MotorState::Idle | MotorState::Driving) {
            warn!("movement not allowed");
            self.emit(Event::warning(
                MotorState::Warning.as_str(),
                "Movement not allowed!",
            ));
            return Err(CommandError::DisallowedTransition {
                state: self.motor_state.as_str(),
            }
            .into());
        }
        if position == self.destination.position && speed == self.destination.speed {
            debug!("destination unchanged");
            self.emit(Event::state(MotorState::Arrived.as_str()));
            return Ok(());
        }
        if speed == 0 {
            warn!("unplausible speed");
            self.emit(Event::warning(
                MotorState::Warning.as_str(),
                "Speed unplausible!",
            ));
            return Err(CommandError::UnplausibleSpeed(speed).into());
        }

        // Persist changed tunables before the move starts.
        if self.settings.speed != speed {
            self.settings.speed = speed;
            self.store.put_i32(KEY_SPEED, speed);
        }
        if self.settings.acceleration != acceleration {
            self.settings.acceleration = acceleration;
            self.store.put_i32(KEY_ACCELERATION, acceleration);
        }

        self.destination = Destination {
            position,
            speed,
            acceleration,
        };
        let target = self.cfg.steps_per_mm.steps(position);
        self.direction = if target.0 > self.motion.current_position() {
            MovementDirection::Forward
        } else {
            MovementDirection::Backward
        };

        let accel_steps = self.cfg.steps_per_mm.steps_per_sec2(acceleration);
        let speed_steps = self.cfg.steps_per_mm.steps_per_sec(speed);
        let applied = self
            .motion
            .set_acceleration(accel_steps)
            .and_then(|_| self.motion.set_speed(speed_steps))
            .and_then(|_| self.motion.move_to(target.0));
        if let Err(e) = applied {
            error!("motion driver rejected move");
            self.set_motor_state(MotorState::Error);
            self.emit(Event::error(
                MotorState::Error.as_str(),
                "Motor won't move",
            ));
            return Err(Error::Motion(e));
        }

        // A retarget must drop any arrival latched by an earlier poll, or
        // the next tick would finalize the new move at the old endpoint.
        self.arrival_pending = false;
        if self.motor_state != MotorState::Driving {
            self.set_motor_state(MotorState::Driving);
            self.move_poll_at = Some(now + self.cfg.move_poll_ms);
        }
        self.emit(Event::MotorState {
            state: MotorState::Driving.as_str(),
            error: None,
            warning: None,
            move_state: None,
            destination: Some(self.destination),
            origin: Some(origin),
        });
        Ok(())
    }

    /// Decelerate and end the current movement or homing run.
    ///
    /// While driving, the actual finalize happens on the next tick so the
    /// motor has begun decelerating when the end position is sampled.
    pub(super) fn halt_move(&mut self) {
        debug!("stopping movement");
        let accel = self
            .cfg
            .steps_per_mm
            .steps_per_sec2(self.cfg.max_acceleration_mm_per_sec2);
        if self.motion.set_acceleration(accel).is_err() {
            warn!("stop acceleration rejected");
        }
        self.motion.stop();
        if self.motor_state == MotorState::Driving {
            self.arrival_pending = true;
        } else {
            // Cancelled homing run: nothing to finalize, report right away.
            self.direction = MovementDirection::Standstill;
            self.set_motor_state(MotorState::Idle);
            let position = self.current_position_mm();
            self.destination.position = position;
            self.emit(stopped_event(position, self.destination));
        }
    }

    /// Periodic progress report while a move is in flight.
    pub(super) fn poll_movement(&mut self, now: Millis) {
        self.move_poll_at = Some(now + self.cfg.move_poll_ms);
        let position = self
            .cfg
            .steps_per_mm
            .millimeters(Steps(self.motion.current_position()));
        let speed = self.cfg.steps_per_mm.mm_per_sec(self.motion.current_speed());
        self.emit(Event::MoveState { position, speed });
        if position == self.destination.position {
            debug!("movement done");
            self.arrival_pending = true;
        }
    }

    /// Close out a finished or cancelled move.
    ///
    /// Runs on the tick after arrival was detected. The destination is
    /// rewritten to the sampled end position, which also covers moves ended
    /// prematurely by a stop command or a home-switch hit.
    pub(super) fn finalize_arrival(&mut self) {
        self.arrival_pending = false;
        self.move_poll_at = None;
        let position = self.current_position_mm();
        self.destination.position = position;
        self.direction = MovementDirection::Standstill;
        self.set_motor_state(MotorState::Idle);
        self.emit(stopped_event(position, self.destination));
    }
}

/// The transient `STOPPED` notification closing out a move.
fn stopped_event(position: i32, destination: Destination) -> Event {
    Event::MotorState {
        state: MotorState::Stopped.as_str(),
        error: None,
        warning: None,
        move_state: Some(MoveSnapshot { position, speed: 0 }),
        destination: Some(destination),
        origin: None,
    }
}
