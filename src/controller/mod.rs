//! Motor controller core.
//!
//! A single [`MotorController`] owns every hardware handle (driver chip,
//! pulse generator, home switch, enable line) and all supervision state, so
//! exactly one component can issue motion commands at any time. Single
//! ownership replaces locking.
//!
//! The controller is tick-driven: the host firmware calls
//! [`MotorController::tick`] from its cooperative scheduler loop and
//! dispatches queued remote commands through
//! [`MotorController::handle_command`] *after* the tick, which preserves the
//! "finalize before new command" ordering for move completion. Interrupts
//! never call into the controller; they latch a [`StatusSignal`] that the
//! next tick consumes.

mod adaptor;
mod calibration;
mod fault;
mod homing;
mod motion;

use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::ControllerConfig;
use crate::event::{Destination, Event, EventSink, IndicatorMode, IndicatorSink};
use crate::fmt::warn;
use crate::hal::{DriverInterface, MotionDriver};
use crate::settings::{PersistentSettings, SettingsStore};
use crate::signal::StatusSignal;
use crate::state::{DriverComState, InitializationState, MotorState, MovementDirection};

/// Milliseconds since an arbitrary epoch, as supplied by the host's tick
/// source. Only differences are ever taken.
pub type Millis = u64;

/// Interrupt and startup signals consumed by the controller.
///
/// The home and diagnostic signals are latched from their GPIO edge
/// interrupts; the ready signal gates initialization until the rest of the
/// system (e.g. the web layer) has come up.
#[derive(Debug, Clone, Copy)]
pub struct Signals<'a> {
    /// Startup gate; initialization begins once this completes.
    pub ready: &'a StatusSignal,
    /// Home-switch edge.
    pub home: &'a StatusSignal,
    /// Driver diagnostic-pin edge.
    pub diagnostic: &'a StatusSignal,
}

/// Which re-initialization variant the next scheduled init runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReinitKind {
    /// Full calibration including gradient convergence.
    Full,
    /// Reapply configuration with the persisted gradient/offset.
    Fast,
}

/// Hardware handles and collaborators returned by
/// [`MotorController::into_parts`].
pub struct Parts<DRV, MOT, HOME, EN, SET, EV, IND> {
    /// Driver chip interface.
    pub driver: DRV,
    /// Step-pulse generator.
    pub motion: MOT,
    /// Home switch input.
    pub home_switch: HOME,
    /// Hardware-enable output.
    pub enable_pin: EN,
    /// Settings store.
    pub store: SET,
    /// Event sink.
    pub events: EV,
    /// Indicator sink.
    pub indicator: IND,
}

/// Supervisory controller for a linear stepper actuator.
///
/// Generic over:
/// - `DRV`: register-level driver chip interface
/// - `MOT`: step-pulse generator
/// - `HOME`: home switch pin (active low, must implement `InputPin`)
/// - `EN`: hardware-enable pin (active low, must implement `OutputPin`)
/// - `SET`: durable settings store
/// - `EV`: outbound event sink
/// - `IND`: indicator mode sink
pub struct MotorController<'a, DRV, MOT, HOME, EN, SET, EV, IND>
where
    DRV: DriverInterface,
    MOT: MotionDriver,
    HOME: InputPin,
    EN: OutputPin,
    SET: SettingsStore,
    EV: EventSink,
    IND: IndicatorSink,
{
    driver: DRV,
    motion: MOT,
    home_switch: HOME,
    enable_pin: EN,
    store: SET,
    events: EV,
    indicator: IND,
    cfg: ControllerConfig,

    ready: &'a StatusSignal,
    home_signal: &'a StatusSignal,
    diag_signal: &'a StatusSignal,

    motor_state: MotorState,
    com_state: DriverComState,
    init_state: InitializationState,
    direction: MovementDirection,

    settings: PersistentSettings,
    destination: Destination,

    started: bool,
    homed: bool,
    calibrated: bool,
    arrival_pending: bool,

    init_kind: ReinitKind,
    init_at: Option<Millis>,
    standstill_cal_at: Option<Millis>,
    gradient_move_at: Option<Millis>,
    gradient_check_at: Option<Millis>,
    move_poll_at: Option<Millis>,
    driver_poll_at: Option<Millis>,
}

/// Consume a deadline slot if it has expired.
fn take_due(slot: &mut Option<Millis>, now: Millis) -> bool {
    match *slot {
        Some(at) if at <= now => {
            *slot = None;
            true
        }
        _ => false,
    }
}

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
    /// Create a controller with all collaborators injected.
    ///
    /// Persisted settings are loaded immediately; the last commanded speed
    /// and acceleration seed the initial destination. Nothing touches the
    /// hardware until the ready signal completes and [`tick`](Self::tick)
    /// runs initialization.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        driver: DRV,
        motion: MOT,
        home_switch: HOME,
        enable_pin: EN,
        store: SET,
        events: EV,
        indicator: IND,
        cfg: ControllerConfig,
        signals: Signals<'a>,
    ) -> Self {
        let settings = PersistentSettings::load(&store);
        let destination = Destination {
            position: 0,
            speed: settings.speed,
            acceleration: settings.acceleration,
        };
        Self {
            driver,
            motion,
            home_switch,
            enable_pin,
            store,
            events,
            indicator,
            cfg,
            ready: signals.ready,
            home_signal: signals.home,
            diag_signal: signals.diagnostic,
            motor_state: MotorState::Unknown,
            com_state: DriverComState::Unknown,
            init_state: InitializationState::Uninitialized,
            direction: MovementDirection::Standstill,
            settings,
            destination,
            started: false,
            homed: false,
            calibrated: false,
            arrival_pending: false,
            init_kind: ReinitKind::Full,
            init_at: None,
            standstill_cal_at: None,
            gradient_move_at: None,
            gradient_check_at: None,
            move_poll_at: None,
            driver_poll_at: None,
        }
    }

    /// Run one cooperative scheduler pass.
    ///
    /// Order within a pass: deferred interrupt consumers, then move
    /// finalization, then timer-armed one-shots, then periodic polls. Call
    /// this before dispatching queued commands so a pending finalize is
    /// observed by the next command.
    pub fn tick(&mut self, now: Millis) {
        if !self.started {
            // Wait for the rest of the system before touching the driver.
            if self.ready.take() {
                self.started = true;
                self.init_kind = ReinitKind::Full;
                self.init_at = Some(now);
                self.indicator.set_mode(IndicatorMode::Initializing);
            }
            return;
        }

        if self.diag_signal.take() {
            self.on_diagnostic();
        }
        if self.home_signal.take() {
            self.on_home_edge();
        }

        if self.arrival_pending {
            self.finalize_arrival();
        }

        if take_due(&mut self.init_at, now) {
            match self.init_kind {
                ReinitKind::Full => self.initialize_driver(now),
                ReinitKind::Fast => self.fast_reinitialize(now),
            }
        }
        if take_due(&mut self.standstill_cal_at, now) {
            self.start_gradient_move(now, true);
        }
        if take_due(&mut self.gradient_move_at, now) {
            self.start_gradient_move(now, false);
        }
        if take_due(&mut self.gradient_check_at, now) {
            self.check_gradient(now);
        }
        if take_due(&mut self.move_poll_at, now) {
            self.poll_movement(now);
        }
        if take_due(&mut self.driver_poll_at, now) {
            self.poll_driver(now);
        }
    }

    /// Current motor supervision state.
    #[inline]
    pub fn motor_state(&self) -> MotorState {
        self.motor_state
    }

    /// Current driver communication health.
    #[inline]
    pub fn com_state(&self) -> DriverComState {
        self.com_state
    }

    /// Current calibration progress.
    #[inline]
    pub fn initialization_state(&self) -> InitializationState {
        self.init_state
    }

    /// Current or intended travel direction.
    #[inline]
    pub fn direction(&self) -> MovementDirection {
        self.direction
    }

    /// The resolved destination of the current or last move.
    #[inline]
    pub fn destination(&self) -> Destination {
        self.destination
    }

    /// The in-memory copy of the durable settings.
    #[inline]
    pub fn settings(&self) -> PersistentSettings {
        self.settings
    }

    /// Whether the zero reference was established this session.
    #[inline]
    pub fn is_homed(&self) -> bool {
        self.homed
    }

    /// Current position in millimeters.
    #[inline]
    pub fn current_position_mm(&mut self) -> i32 {
        let steps = crate::config::Steps(self.motion.current_position());
        self.cfg.steps_per_mm.millimeters(steps)
    }

    /// Current speed in millimeters per second.
    #[inline]
    pub fn current_speed_mm_per_sec(&mut self) -> i32 {
        self.cfg.steps_per_mm.mm_per_sec(self.motion.current_speed())
    }

    /// Tear down and hand the hardware handles back.
    ///
    /// The driver stage is software-disabled first so the motor is never
    /// left powered without supervision.
    pub fn into_parts(mut self) -> Parts<DRV, MOT, HOME, EN, SET, EV, IND> {
        self.driver.disable();
        Parts {
            driver: self.driver,
            motion: self.motion,
            home_switch: self.home_switch,
            enable_pin: self.enable_pin,
            store: self.store,
            events: self.events,
            indicator: self.indicator,
        }
    }

    /// Whether the home switch is currently engaged (active low).
    fn at_home(&mut self) -> bool {
        matches!(self.home_switch.is_low(), Ok(true))
    }

    /// Drive the hardware-enable line (active low).
    fn hardware_enable(&mut self, enabled: bool) {
        let result = if enabled {
            self.enable_pin.set_low()
        } else {
            self.enable_pin.set_high()
        };
        if result.is_err() {
            warn!("enable pin write failed");
        }
    }

    /// Force-stop any motion and drop move supervision.
    ///
    /// Used on fault paths where the regular finalize must not run: the
    /// chip is getting reconfigured, so there is no arrival to report.
    fn abort_motion(&mut self) {
        if self.motion.current_speed() != 0 {
            self.motion.force_stop();
        }
        self.move_poll_at = None;
        self.arrival_pending = false;
        self.direction = MovementDirection::Standstill;
    }

    /// Drop any armed calibration deadline.
    ///
    /// Used on the communication-loss paths so a stale settle timer cannot
    /// sample garbage feedback from an unpowered chip.
    fn cancel_calibration_timers(&mut self) {
        self.standstill_cal_at = None;
        self.gradient_move_at = None;
        self.gradient_check_at = None;
    }

    /// Whether a calibration sequence currently has work in flight.
    fn calibration_active(&self) -> bool {
        self.standstill_cal_at.is_some()
            || self.gradient_move_at.is_some()
            || self.gradient_check_at.is_some()
    }

    /// Transition the motor state and mirror it to the indicator.
    fn set_motor_state(&mut self, state: MotorState) {
        self.motor_state = state;
        self.indicator.set_mode(state.indicator_mode());
    }

    /// Hand one event to the sink.
    fn emit(&mut self, event: Event) {
        self.events.emit(event);
    }
}
