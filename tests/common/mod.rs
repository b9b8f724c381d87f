//! Shared test doubles: scripted driver chip, recording pulse generator,
//! fake pins and sinks, all sharing state through `Rc<RefCell<_>>` handles so
//! tests can inspect and steer the hardware mid-scenario.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use stepper_drive::{
    ControllerConfig, DriverInterface, Event, EventSink, IndicatorMode, IndicatorSink,
    MemoryStore, MotionDriver, MotionError, MotorController, MovementDirection, SettingsStore,
    Signals, StandstillMode, StatusSignal,
};

/// Scripted communication health of the fake driver chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverHealth {
    /// Answers and carries the expected configuration.
    #[default]
    Ok,
    /// Answers but lost its configuration.
    NotSetup,
    /// Does not answer at all.
    Silent,
}

/// Inspectable state behind [`FakeDriver`].
#[derive(Debug, Default)]
pub struct DriverState {
    pub health: DriverHealth,
    pub connects: u32,
    pub microsteps: Option<u16>,
    pub rms_current: Option<u16>,
    pub standstill_mode: Option<StandstillMode>,
    pub inverse_direction: Option<bool>,
    pub chop_thresholds: Vec<u32>,
    pub stall_threshold: Option<u8>,
    pub enabled: bool,
    pub current_scaling_started: bool,
    pub gradient_adaptation_started: bool,
    /// Feedback values returned in order; the last one repeats.
    pub feedback_script: Vec<i16>,
    pub feedback_reads: usize,
    pub gradient: u8,
    pub offset: u8,
    pub written_gradient: Option<u8>,
    pub written_offset: Option<u8>,
}

/// Driver chip double driven by a [`DriverState`] script.
#[derive(Clone)]
pub struct FakeDriver(pub Rc<RefCell<DriverState>>);

impl DriverInterface for FakeDriver {
    fn connect(&mut self) {
        self.0.borrow_mut().connects += 1;
    }

    fn set_microsteps_per_step(&mut self, microsteps: u16) {
        self.0.borrow_mut().microsteps = Some(microsteps);
    }

    fn set_rms_current(&mut self, milliamps: u16, _sense_resistor_ohms: f32) {
        self.0.borrow_mut().rms_current = Some(milliamps);
    }

    fn set_standstill_mode(&mut self, mode: StandstillMode) {
        self.0.borrow_mut().standstill_mode = Some(mode);
    }

    fn set_inverse_motor_direction(&mut self, inverted: bool) {
        self.0.borrow_mut().inverse_direction = Some(inverted);
    }

    fn set_smooth_chop_threshold(&mut self, threshold: u32) {
        self.0.borrow_mut().chop_thresholds.push(threshold);
    }

    fn enable_smooth_chop(&mut self) {}

    fn disable_high_current_stepping(&mut self) {}

    fn set_stall_threshold(&mut self, threshold: u8) {
        self.0.borrow_mut().stall_threshold = Some(threshold);
    }

    fn enable(&mut self) {
        self.0.borrow_mut().enabled = true;
    }

    fn disable(&mut self) {
        self.0.borrow_mut().enabled = false;
    }

    fn enable_automatic_current_scaling(&mut self) {
        self.0.borrow_mut().current_scaling_started = true;
    }

    fn enable_automatic_gradient_adaptation(&mut self) {
        self.0.borrow_mut().gradient_adaptation_started = true;
    }

    fn auto_scale_feedback(&mut self) -> i16 {
        let mut state = self.0.borrow_mut();
        let index = state.feedback_reads.min(state.feedback_script.len().saturating_sub(1));
        state.feedback_reads += 1;
        state.feedback_script.get(index).copied().unwrap_or(0)
    }

    fn gradient(&mut self) -> u8 {
        self.0.borrow().gradient
    }

    fn offset(&mut self) -> u8 {
        self.0.borrow().offset
    }

    fn set_gradient(&mut self, gradient: u8) {
        self.0.borrow_mut().written_gradient = Some(gradient);
    }

    fn set_offset(&mut self, offset: u8) {
        self.0.borrow_mut().written_offset = Some(offset);
    }

    fn is_communicating(&mut self) -> bool {
        self.0.borrow().health != DriverHealth::Silent
    }

    fn is_setup_and_communicating(&mut self) -> bool {
        self.0.borrow().health == DriverHealth::Ok
    }

    fn is_communicating_but_not_setup(&mut self) -> bool {
        self.0.borrow().health == DriverHealth::NotSetup
    }
}

/// Inspectable state behind [`FakeMotion`].
///
/// The fake never advances position on its own; tests set `position` and
/// `speed` to simulate progress between ticks.
#[derive(Debug, Default)]
pub struct MotionState {
    pub position: i64,
    pub speed: i64,
    pub acceleration: Option<i64>,
    pub target_speed: Option<i64>,
    pub target: Option<i64>,
    pub relative_moves: Vec<i64>,
    pub running_backward: bool,
    pub stops: u32,
    pub force_stops: u32,
    pub auto_enable: Option<bool>,
    pub blocking_steps: Vec<MovementDirection>,
    /// When set, every parameter write and move is rejected.
    pub reject_all: bool,
}

/// Pulse generator double recording into a [`MotionState`].
#[derive(Clone)]
pub struct FakeMotion(pub Rc<RefCell<MotionState>>);

impl MotionDriver for FakeMotion {
    fn set_acceleration(&mut self, steps_per_sec2: i64) -> Result<(), MotionError> {
        let mut state = self.0.borrow_mut();
        if state.reject_all {
            return Err(MotionError::InvalidAcceleration(steps_per_sec2 as i32));
        }
        state.acceleration = Some(steps_per_sec2);
        Ok(())
    }

    fn set_speed(&mut self, steps_per_sec: i64) -> Result<(), MotionError> {
        let mut state = self.0.borrow_mut();
        if state.reject_all {
            return Err(MotionError::InvalidSpeed(steps_per_sec as i32));
        }
        state.target_speed = Some(steps_per_sec);
        Ok(())
    }

    fn move_to(&mut self, target_steps: i64) -> Result<(), MotionError> {
        let mut state = self.0.borrow_mut();
        if state.reject_all {
            return Err(MotionError::InvalidTarget(target_steps as i32));
        }
        state.target = Some(target_steps);
        Ok(())
    }

    fn move_relative(&mut self, delta_steps: i64) -> Result<(), MotionError> {
        let mut state = self.0.borrow_mut();
        if state.reject_all {
            return Err(MotionError::InvalidTarget(delta_steps as i32));
        }
        state.relative_moves.push(delta_steps);
        Ok(())
    }

    fn run_backward(&mut self) {
        self.0.borrow_mut().running_backward = true;
    }

    fn stop(&mut self) {
        let mut state = self.0.borrow_mut();
        state.stops += 1;
        state.running_backward = false;
    }

    fn force_stop(&mut self) {
        let mut state = self.0.borrow_mut();
        state.force_stops += 1;
        state.running_backward = false;
        state.speed = 0;
    }

    fn force_stop_and_set_position(&mut self, position_steps: i64) {
        let mut state = self.0.borrow_mut();
        state.force_stops += 1;
        state.running_backward = false;
        state.speed = 0;
        state.position = position_steps;
    }

    fn set_position(&mut self, position_steps: i64) {
        self.0.borrow_mut().position = position_steps;
    }

    fn current_position(&mut self) -> i64 {
        self.0.borrow().position
    }

    fn current_speed(&mut self) -> i64 {
        self.0.borrow().speed
    }

    fn step_once_blocking(&mut self, direction: MovementDirection) {
        self.0.borrow_mut().blocking_steps.push(direction);
    }

    fn set_auto_enable(&mut self, auto: bool) {
        self.0.borrow_mut().auto_enable = Some(auto);
    }
}

/// Inspectable state behind [`FakePin`].
#[derive(Debug, Default)]
pub struct PinState {
    /// Electrical level; `true` means low.
    pub low: bool,
    /// Levels written through `OutputPin`, `true` meaning low.
    pub writes: Vec<bool>,
}

/// Infallible digital pin double usable as input and output.
#[derive(Clone)]
pub struct FakePin(pub Rc<RefCell<PinState>>);

impl ErrorType for FakePin {
    type Error = core::convert::Infallible;
}

impl InputPin for FakePin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.borrow().low)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.borrow().low)
    }
}

impl OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mut state = self.0.borrow_mut();
        state.low = true;
        state.writes.push(true);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut state = self.0.borrow_mut();
        state.low = false;
        state.writes.push(false);
        Ok(())
    }
}

/// Event sink recording every emitted event.
#[derive(Clone, Default)]
pub struct RecordingSink(pub Rc<RefCell<Vec<Event>>>);

impl EventSink for RecordingSink {
    fn emit(&mut self, event: Event) {
        self.0.borrow_mut().push(event);
    }
}

/// Indicator sink recording every mode change.
#[derive(Clone, Default)]
pub struct RecordingIndicator(pub Rc<RefCell<Vec<IndicatorMode>>>);

impl IndicatorSink for RecordingIndicator {
    fn set_mode(&mut self, mode: IndicatorMode) {
        self.0.borrow_mut().push(mode);
    }
}

/// Clonable [`MemoryStore`] handle so tests keep access after the controller
/// takes ownership.
#[derive(Clone, Default)]
pub struct SharedStore(pub Rc<RefCell<MemoryStore>>);

impl SettingsStore for SharedStore {
    fn get_i32(&self, key: &str) -> Option<i32> {
        self.0.borrow().get_i32(key)
    }

    fn put_i32(&mut self, key: &str, value: i32) {
        self.0.borrow_mut().put_i32(key, value);
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.borrow().get_bool(key)
    }

    fn put_bool(&mut self, key: &str, value: bool) {
        self.0.borrow_mut().put_bool(key, value);
    }

    fn get_u8(&self, key: &str) -> Option<u8> {
        self.0.borrow().get_u8(key)
    }

    fn put_u8(&mut self, key: &str, value: u8) {
        self.0.borrow_mut().put_u8(key, value);
    }
}

/// The fully faked controller type used by the scenario tests.
pub type TestController<'a> = MotorController<
    'a,
    FakeDriver,
    FakeMotion,
    FakePin,
    FakePin,
    SharedStore,
    RecordingSink,
    RecordingIndicator,
>;

/// Handles into all shared test-double state.
pub struct Rig {
    pub driver: Rc<RefCell<DriverState>>,
    pub motion: Rc<RefCell<MotionState>>,
    pub home_switch: Rc<RefCell<PinState>>,
    pub enable_pin: Rc<RefCell<PinState>>,
    pub store: Rc<RefCell<MemoryStore>>,
    pub events: Rc<RefCell<Vec<Event>>>,
    pub indicator: Rc<RefCell<Vec<IndicatorMode>>>,
}

impl Rig {
    /// Drain and return all events recorded so far.
    pub fn take_events(&self) -> Vec<Event> {
        self.events.borrow_mut().drain(..).collect()
    }
}

/// Build a controller over fresh fakes.
///
/// The home switch starts released (high) and the driver chip healthy with a
/// feedback script that converges on the second settle check.
pub fn build_controller(signals: Signals<'_>, cfg: ControllerConfig) -> (TestController<'_>, Rig) {
    build_controller_with_store(signals, cfg, Rc::new(RefCell::new(MemoryStore::new())))
}

/// Like [`build_controller`], but over a pre-seeded settings store, e.g. to
/// simulate a restart with persisted settings.
pub fn build_controller_with_store(
    signals: Signals<'_>,
    cfg: ControllerConfig,
    store: Rc<RefCell<MemoryStore>>,
) -> (TestController<'_>, Rig) {
    let rig = Rig {
        driver: Rc::new(RefCell::new(DriverState {
            // One sample is consumed when adaptation starts, one per settle
            // check: not converged on the first check, converged on the
            // second.
            feedback_script: vec![120, 120, 10],
            gradient: 14,
            offset: 36,
            ..DriverState::default()
        })),
        motion: Rc::new(RefCell::new(MotionState::default())),
        home_switch: Rc::new(RefCell::new(PinState::default())),
        enable_pin: Rc::new(RefCell::new(PinState::default())),
        store,
        events: Rc::new(RefCell::new(Vec::new())),
        indicator: Rc::new(RefCell::new(Vec::new())),
    };
    let controller = MotorController::new(
        FakeDriver(rig.driver.clone()),
        FakeMotion(rig.motion.clone()),
        FakePin(rig.home_switch.clone()),
        FakePin(rig.enable_pin.clone()),
        SharedStore(rig.store.clone()),
        RecordingSink(rig.events.clone()),
        RecordingIndicator(rig.indicator.clone()),
        cfg,
        signals,
    );
    (controller, rig)
}

/// Three fresh signals for a scenario.
pub fn signals() -> (StatusSignal, StatusSignal, StatusSignal) {
    (StatusSignal::new(), StatusSignal::new(), StatusSignal::new())
}

/// Run the controller through ready gating and full calibration.
///
/// Uses the default config timing; returns the time after the last tick.
/// The default feedback script converges on the second settle check, after
/// one approach move and one dehome move.
pub fn calibrate(controller: &mut TestController<'_>, ready: &StatusSignal) -> u64 {
    let cfg = ControllerConfig::default();
    ready.signal_complete();
    let mut now = 0;
    controller.tick(now); // consume ready, schedule init
    controller.tick(now); // run driver setup
    now += cfg.current_scaling_settle_ms;
    controller.tick(now); // standstill settled, first calibration move
    now += cfg.gradient_settle_ms;
    controller.tick(now); // first feedback check, not converged
    now += cfg.gradient_settle_ms;
    controller.tick(now); // second calibration move
    now += cfg.gradient_settle_ms;
    controller.tick(now); // second feedback check, converged
    now
}
