//! Simulated actuator demo.
//!
//! Runs the controller against software-simulated hardware through power-on
//! calibration and one move, printing every outbound event as JSON and every
//! indicator change to stderr.
//!
//! Run with: `cargo run --example simulated_actuator`

use std::cell::RefCell;
use std::rc::Rc;

use stepper_drive::{
    Command, ControllerConfig, DriverInterface, Event, EventSink, IndicatorMode, IndicatorSink,
    MemoryStore, MotionDriver, MotionError, MotorController, MovementDirection, Signals,
    StandstillMode, StatusSignal,
};

/// Driver chip simulation: always healthy, auto-scale feedback halves on
/// every read so gradient calibration converges after a few moves.
struct SimDriver {
    feedback: i16,
}

impl DriverInterface for SimDriver {
    fn connect(&mut self) {}
    fn set_microsteps_per_step(&mut self, _microsteps: u16) {}
    fn set_rms_current(&mut self, _milliamps: u16, _sense_resistor_ohms: f32) {}
    fn set_standstill_mode(&mut self, _mode: StandstillMode) {}
    fn set_inverse_motor_direction(&mut self, _inverted: bool) {}
    fn set_smooth_chop_threshold(&mut self, _threshold: u32) {}
    fn enable_smooth_chop(&mut self) {}
    fn disable_high_current_stepping(&mut self) {}
    fn set_stall_threshold(&mut self, _threshold: u8) {}
    fn enable(&mut self) {}
    fn disable(&mut self) {}
    fn enable_automatic_current_scaling(&mut self) {}
    fn enable_automatic_gradient_adaptation(&mut self) {}

    fn auto_scale_feedback(&mut self) -> i16 {
        let value = self.feedback;
        self.feedback /= 2;
        value
    }

    fn gradient(&mut self) -> u8 {
        14
    }

    fn offset(&mut self) -> u8 {
        36
    }

    fn set_gradient(&mut self, _gradient: u8) {}
    fn set_offset(&mut self, _offset: u8) {}

    fn is_communicating(&mut self) -> bool {
        true
    }

    fn is_setup_and_communicating(&mut self) -> bool {
        true
    }

    fn is_communicating_but_not_setup(&mut self) -> bool {
        false
    }
}

/// Constant-velocity kinematics for the pulse generator.
#[derive(Default)]
struct MotionSim {
    position: i64,
    speed_setting: i64,
    velocity: i64,
    target: Option<i64>,
}

impl MotionSim {
    /// Advance the carriage by one millisecond of simulated time.
    fn advance(&mut self) {
        if let Some(target) = self.target {
            let step = (self.speed_setting.max(1) / 1000).max(1);
            if (target - self.position).abs() <= step {
                self.position = target;
                self.velocity = 0;
                self.target = None;
            } else if target > self.position {
                self.position += step;
                self.velocity = self.speed_setting;
            } else {
                self.position -= step;
                self.velocity = -self.speed_setting;
            }
        }
    }
}

#[derive(Clone)]
struct SimMotion(Rc<RefCell<MotionSim>>);

impl MotionDriver for SimMotion {
    fn set_acceleration(&mut self, _steps_per_sec2: i64) -> Result<(), MotionError> {
        Ok(())
    }

    fn set_speed(&mut self, steps_per_sec: i64) -> Result<(), MotionError> {
        self.0.borrow_mut().speed_setting = steps_per_sec;
        Ok(())
    }

    fn move_to(&mut self, target_steps: i64) -> Result<(), MotionError> {
        self.0.borrow_mut().target = Some(target_steps);
        Ok(())
    }

    fn move_relative(&mut self, delta_steps: i64) -> Result<(), MotionError> {
        let mut sim = self.0.borrow_mut();
        let target = sim.position + delta_steps;
        sim.target = Some(target);
        Ok(())
    }

    fn run_backward(&mut self) {
        self.0.borrow_mut().target = Some(i64::MIN / 2);
    }

    fn stop(&mut self) {
        let mut sim = self.0.borrow_mut();
        sim.target = None;
        sim.velocity = 0;
    }

    fn force_stop(&mut self) {
        self.stop();
    }

    fn force_stop_and_set_position(&mut self, position_steps: i64) {
        self.stop();
        self.0.borrow_mut().position = position_steps;
    }

    fn set_position(&mut self, position_steps: i64) {
        self.0.borrow_mut().position = position_steps;
    }

    fn current_position(&mut self) -> i64 {
        self.0.borrow().position
    }

    fn current_speed(&mut self) -> i64 {
        self.0.borrow().velocity
    }

    fn step_once_blocking(&mut self, direction: MovementDirection) {
        let mut sim = self.0.borrow_mut();
        match direction {
            MovementDirection::Forward => sim.position += 1,
            MovementDirection::Backward => sim.position -= 1,
            MovementDirection::Standstill => {}
        }
    }

    fn set_auto_enable(&mut self, _auto: bool) {}
}

/// Digital pin over a shared level; used for the home switch and the
/// hardware-enable line.
#[derive(Clone)]
struct SimPin(Rc<RefCell<bool>>);

impl embedded_hal::digital::ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(!*self.0.borrow())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(*self.0.borrow())
    }
}

impl embedded_hal::digital::OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        *self.0.borrow_mut() = true;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        *self.0.borrow_mut() = false;
        Ok(())
    }
}

/// Prints each event as one line of JSON, like the real transport would
/// frame it.
struct JsonSink;

impl EventSink for JsonSink {
    fn emit(&mut self, event: Event) {
        println!("{}", serde_json::to_string(&event).expect("serializable event"));
    }
}

struct StderrIndicator;

impl IndicatorSink for StderrIndicator {
    fn set_mode(&mut self, mode: IndicatorMode) {
        eprintln!("indicator -> {:?}", mode);
    }
}

fn main() {
    let ready = StatusSignal::new();
    let home = StatusSignal::new();
    let diag = StatusSignal::new();

    let motion = Rc::new(RefCell::new(MotionSim::default()));
    let home_level = Rc::new(RefCell::new(false));

    let mut controller = MotorController::new(
        SimDriver { feedback: 200 },
        SimMotion(motion.clone()),
        SimPin(home_level.clone()),
        SimPin(Rc::new(RefCell::new(false))),
        MemoryStore::new(),
        JsonSink,
        StderrIndicator,
        ControllerConfig::default(),
        Signals {
            ready: &ready,
            home: &home,
            diagnostic: &diag,
        },
    );

    ready.signal_complete();

    let mut was_at_switch = false;
    for now in 0..12_000u64 {
        // One millisecond of carriage physics, then the switch "interrupt".
        motion.borrow_mut().advance();
        let at_switch = motion.borrow().position <= -800;
        if at_switch && !was_at_switch {
            *home_level.borrow_mut() = true;
            home.signal_complete();
        } else if !at_switch {
            *home_level.borrow_mut() = false;
        }
        was_at_switch = at_switch;

        controller.tick(now);

        if now == 4_000 {
            controller
                .handle_command(now, Command::Home)
                .expect("homing accepted");
        }
        if now == 6_000 {
            controller
                .handle_command(
                    now,
                    Command::Move {
                        position: 50,
                        speed: 20,
                        acceleration: 200,
                        origin: 1,
                    },
                )
                .expect("move accepted");
        }
    }
}
