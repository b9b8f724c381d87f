//! Driver health polling and diagnostic-pin fault handling.
//!
//! Communication with the driver chip degrades in two distinct ways: the
//! chip answers but has lost its register configuration (brown-out on the
//! motor supply), or it does not answer at all (supply gone). Both paths
//! force-stop any motion first, then report the transition once and, where
//! possible, schedule a re-initialization.

use embedded_hal::digital::{InputPin, OutputPin};

use super::{Millis, MotorController, ReinitKind};
use crate::error::DriverError;
use crate::event::{Event, EventSink, IndicatorSink};
use crate::fmt::{debug, error, info, warn};
use crate::hal::{DriverInterface, MotionDriver};
use crate::settings::SettingsStore;
use crate::state::{DriverComState, InitializationState, MotorState};

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
    /// Periodic driver communication-health check.
    pub(super) fn poll_driver(&mut self, now: Millis) {
        self.driver_poll_at = Some(now + self.cfg.driver_poll_ms);

        if self.driver.is_setup_and_communicating() {
            if self.com_state != DriverComState::Ok {
                debug!("driver chip is set up and communicating again");
                self.com_state = DriverComState::Ok;
                self.set_motor_state(MotorState::Idle);
                self.emit(Event::state(MotorState::Idle.as_str()));
            }
        } else if self.driver.is_communicating_but_not_setup() {
            // Never leave the chip half-configured while stepping.
            self.abort_motion();
            if self.com_state != DriverComState::Uninitialized {
                warn!("driver chip lost its configuration");
                self.com_state = DriverComState::Uninitialized;
                self.init_state = InitializationState::Uninitialized;
                self.cancel_calibration_timers();
                self.set_motor_state(MotorState::Uninitialized);
                self.emit(Event::state(MotorState::Uninitialized.as_str()));
            }
            // Don't stomp a setup or calibration already in flight.
            if self.init_at.is_none() && !self.calibration_active() {
                self.init_kind = if self.calibrated {
                    ReinitKind::Fast
                } else {
                    ReinitKind::Full
                };
                self.init_at = Some(now + self.cfg.reinit_delay_ms);
            }
        } else {
            self.abort_motion();
            if self.com_state != DriverComState::Error {
                error!("driver chip is not communicating");
                self.enter_power_fault();
            }
        }
    }

    /// Deferred consumer for the latched diagnostic-pin edge.
    ///
    /// The pin also fires on benign conditions, so the fault is confirmed by
    /// probing communication before reacting.
    pub(super) fn on_diagnostic(&mut self) {
        info!("driver diagnostic event");
        if !self.driver.is_communicating() {
            warn!("loss of motor power");
            self.abort_motion();
            self.enter_power_fault();
        }
    }

    /// Enter the powered-off fault state and report it.
    ///
    /// Recovery is driven by the periodic poll: once the chip answers again
    /// it reports communicating-but-not-setup and re-initialization follows.
    fn enter_power_fault(&mut self) {
        self.com_state = DriverComState::Error;
        self.init_state = InitializationState::Uninitialized;
        self.cancel_calibration_timers();
        self.set_motor_state(MotorState::Error);
        self.emit(Event::error(
            MotorState::Error.as_str(),
            DriverError::Power.as_str(),
        ));
    }
}
