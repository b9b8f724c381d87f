//! Driver setup and automatic current-gradient calibration.
//!
//! The sequence mirrors the power-on procedure of the driver chip: apply the
//! base register configuration, verify communication, run standstill current
//! calibration, then iterate short moves against the home switch until the
//! auto-scale feedback converges below the configured threshold. Once the
//! gradient and offset have converged they are persisted, and later
//! re-initializations can skip the convergence loop entirely.

use embedded_hal::digital::{InputPin, OutputPin};

use super::{Millis, MotorController, ReinitKind};
use crate::event::{Event, EventSink, IndicatorSink, MoveSnapshot};
use crate::fmt::{debug, info, warn};
use crate::hal::{DriverInterface, MotionDriver, StandstillMode};
use crate::settings::{SettingsStore, KEY_GRADIENT, KEY_OFFSET};
use crate::state::{DriverComState, InitializationState, MotorState, MovementDirection};

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
    /// Run the full driver setup from scratch.
    ///
    /// If the chip does not answer (motor power not applied yet), the whole
    /// setup is retried after the configured backoff, indefinitely.
    pub(super) fn initialize_driver(&mut self, now: Millis) {
        info!("setting up stepper driver");
        self.init_state = InitializationState::Uninitialized;
        self.apply_base_config();
        if !self.driver.is_communicating() {
            warn!("driver chip not responding, retrying setup");
            self.init_kind = ReinitKind::Full;
            self.init_at = Some(now + self.cfg.retry_backoff_ms);
            return;
        }
        self.hardware_enable(true);
        self.driver.enable();
        // Take over enable gating for the calibration phase and force the
        // rotor onto a full-step position before sampling standstill current.
        self.motion.set_auto_enable(false);
        self.motion.step_once_blocking(MovementDirection::Backward);
        self.driver.enable_automatic_current_scaling();
        self.standstill_cal_at = Some(now + self.cfg.current_scaling_settle_ms);
    }

    /// Reapply the configuration using the persisted calibration result.
    ///
    /// Falls back to [`initialize_driver`](Self::initialize_driver) when no
    /// converged gradient/offset pair has been stored yet.
    pub(super) fn fast_reinitialize(&mut self, now: Millis) {
        let (gradient, offset) = match (self.settings.gradient, self.settings.offset) {
            (Some(gradient), Some(offset)) => (gradient, offset),
            _ => {
                self.initialize_driver(now);
                return;
            }
        };
        info!("re-applying driver setup with stored calibration");
        self.init_state = InitializationState::Uninitialized;
        self.apply_base_config();
        if !self.driver.is_communicating() {
            warn!("driver chip not responding, retrying setup");
            self.init_kind = ReinitKind::Fast;
            self.init_at = Some(now + self.cfg.retry_backoff_ms);
            return;
        }
        self.driver.set_gradient(gradient);
        self.driver.set_offset(offset);
        self.finish_initialization(now);
    }

    /// Write the base register configuration.
    fn apply_base_config(&mut self) {
        self.driver.connect();
        self.driver
            .set_microsteps_per_step(self.cfg.microsteps_per_step);
        self.driver
            .set_rms_current(self.cfg.rms_current_ma, self.cfg.sense_resistor_ohms);
        self.driver.set_standstill_mode(StandstillMode::Braking);
        self.driver
            .set_inverse_motor_direction(self.cfg.invert_direction);
        // Spread-cycle chopping for the whole calibration phase; the smooth
        // chop threshold is restored once the gradient has converged.
        self.driver.set_smooth_chop_threshold(0);
        self.driver.enable_smooth_chop();
        self.driver.disable_high_current_stepping();
        self.driver.set_stall_threshold(0);
    }

    /// Issue one short calibration move and schedule the feedback check.
    ///
    /// Away from the switch when the switch is (or was just) engaged, toward
    /// it otherwise. `start_adaptation` is set on the first move of the
    /// sequence, right after standstill calibration.
    pub(super) fn start_gradient_move(&mut self, now: Millis, start_adaptation: bool) {
        let speed = self
            .cfg
            .steps_per_mm
            .steps_per_sec(self.cfg.homing_speed_mm_per_sec);
        let accel = self
            .cfg
            .steps_per_mm
            .steps_per_sec2(self.cfg.max_acceleration_mm_per_sec2);
        if self.motion.set_speed(speed).is_err() || self.motion.set_acceleration(accel).is_err() {
            warn!("motion driver rejected calibration parameters");
        }
        if self.init_state == InitializationState::GradientHome || self.at_home() {
            self.direction = MovementDirection::Forward;
            self.init_state = InitializationState::GradientDehoming;
            let distance = self.cfg.steps_per_mm.steps(self.cfg.dehome_distance_mm);
            if self.motion.move_relative(distance.0).is_err() {
                warn!("calibration move rejected");
            }
        } else {
            self.direction = MovementDirection::Backward;
            self.init_state = InitializationState::GradientHoming;
            let distance = self.cfg.steps_per_mm.steps(self.cfg.approach_distance_mm);
            if self.motion.move_relative(-distance.0).is_err() {
                warn!("calibration move rejected");
            }
        }
        self.gradient_check_at = Some(now + self.cfg.gradient_settle_ms);
        if start_adaptation {
            debug!(
                "starting gradient adaptation, feedback {}",
                self.driver.auto_scale_feedback()
            );
            self.driver.enable_automatic_gradient_adaptation();
        }
    }

    /// Sample the auto-scale feedback after a calibration move settled.
    pub(super) fn check_gradient(&mut self, now: Millis) {
        let feedback = self.driver.auto_scale_feedback();
        debug!("auto-scale feedback {}", feedback);
        if feedback.unsigned_abs() < self.cfg.convergence_threshold {
            self.finish_initialization(now);
        } else {
            self.gradient_move_at = Some(now + self.cfg.gradient_settle_ms);
        }
    }

    /// Leave calibration: restore run-mode chopping, persist the result and
    /// unlock motion.
    fn finish_initialization(&mut self, now: Millis) {
        self.driver
            .set_smooth_chop_threshold(self.cfg.smooth_chop_threshold);
        self.driver.enable_smooth_chop();
        // Hand enable gating back to the pulse generator.
        self.hardware_enable(false);
        self.motion.set_auto_enable(true);
        self.persist_calibration();
        self.init_state = InitializationState::Ok;
        self.com_state = DriverComState::Ok;
        self.calibrated = true;
        self.direction = MovementDirection::Standstill;
        self.set_motor_state(MotorState::Idle);
        self.driver.enable();
        info!("stepper driver is set up and communicating");
        if self.driver_poll_at.is_none() {
            self.driver_poll_at = Some(now + self.cfg.driver_poll_ms);
        }
        if !self.homed && self.settings.auto_home {
            self.do_homing();
        } else {
            let position = self.current_position_mm();
            self.emit(Event::MotorState {
                state: MotorState::Idle.as_str(),
                error: None,
                warning: None,
                move_state: Some(MoveSnapshot { position, speed: 0 }),
                destination: None,
                origin: None,
            });
        }
    }

    /// Persist the converged gradient and offset, skipping unchanged values.
    fn persist_calibration(&mut self) {
        let gradient = self.driver.gradient();
        let offset = self.driver.offset();
        debug!("calibration result: gradient {}, offset {}", gradient, offset);
        if self.settings.gradient != Some(gradient) {
            self.settings.gradient = Some(gradient);
            self.store.put_u8(KEY_GRADIENT, gradient);
        }
        if self.settings.offset != Some(offset) {
            self.settings.offset = Some(offset);
            self.store.put_u8(KEY_OFFSET, offset);
        }
    }
}
