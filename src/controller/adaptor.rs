//! Command dispatch.
//!
//! Translates inbound [`Command`] messages into controller operations. Every
//! command produces exactly one outbound event: the operation's own
//! notification when accepted, or a state-tagged warning when refused.

use embedded_hal::digital::{InputPin, OutputPin};

use super::{Millis, MotorController};
use crate::command::Command;
use crate::error::{CommandError, Result};
use crate::event::{Event, EventSink, IndicatorSink};
use crate::fmt::{debug, warn};
use crate::hal::{DriverInterface, MotionDriver};
use crate::settings::{SettingsStore, KEY_AUTO_HOME};
use crate::state::MotorState;

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
    /// Dispatch one inbound command.
    ///
    /// Call after [`tick`](Self::tick) for the current scheduler pass so a
    /// move that completed in the meantime has been finalized first.
    /// Refused commands return the validation error; the rejection event has
    /// already been emitted either way.
    pub fn handle_command(&mut self, now: Millis, command: Command) -> Result<()> {
        match command {
            Command::Move {
                position,
                speed,
                acceleration,
                origin,
            } => self.start_move(now, position, speed, acceleration, origin),
            Command::Stop => {
                if matches!(self.motor_state, MotorState::Driving | MotorState::Homing) {
                    self.halt_move();
                    Ok(())
                } else {
                    warn!("stopping not allowed");
                    self.emit(Event::warning(
                        MotorState::Warning.as_str(),
                        "Stopping not allowed!",
                    ));
                    Err(CommandError::DisallowedTransition {
                        state: self.motor_state.as_str(),
                    }
                    .into())
                }
            }
            Command::Home => {
                if self.motor_state == MotorState::Idle {
                    self.do_homing();
                    Ok(())
                } else {
                    warn!("homing not allowed");
                    self.emit(Event::warning(
                        MotorState::Warning.as_str(),
                        "Homing not allowed!",
                    ));
                    Err(CommandError::DisallowedTransition {
                        state: self.motor_state.as_str(),
                    }
                    .into())
                }
            }
            Command::UpdateConfig { auto_home, origin } => {
                self.set_auto_home(auto_home);
                self.emit(Event::Config {
                    auto_home: self.settings.auto_home,
                    origin,
                });
                Ok(())
            }
            Command::Unknown => {
                warn!("unknown command received");
                self.emit(Event::warning(
                    MotorState::Warning.as_str(),
                    "Unknown command received!",
                ));
                Err(CommandError::UnknownCommand.into())
            }
        }
    }

    /// Update the power-on auto-home preference, persisting on change.
    pub fn set_auto_home(&mut self, auto_home: bool) {
        debug!("auto-home: {}", auto_home);
        if self.settings.auto_home != auto_home {
            self.settings.auto_home = auto_home;
            self.store.put_bool(KEY_AUTO_HOME, auto_home);
        }
    }
}
