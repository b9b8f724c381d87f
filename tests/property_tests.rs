//! Property tests for command handling invariants, settings persistence and
//! unit conversion.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::*;
use proptest::prelude::*;
use stepper_drive::{
    Command, ControllerConfig, MemoryStore, MotorState, MovementDirection, SettingsStore, Signals,
    Steps, StepsPerMm,
};

fn command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![
        (any::<i16>(), any::<i16>(), 1i32..5_000, -1i32..10).prop_map(
            |(position, speed, acceleration, origin)| Command::Move {
                position: position as i32,
                speed: speed as i32,
                acceleration,
                origin,
            }
        ),
        Just(Command::Stop),
        Just(Command::Home),
        (any::<bool>(), -1i32..10).prop_map(|(auto_home, origin)| Command::UpdateConfig {
            auto_home,
            origin,
        }),
        Just(Command::Unknown),
    ]
}

proptest! {
    /// Before calibration, no move command of any shape reaches the motion
    /// driver or mutates controller state.
    #[test]
    fn prop_rejected_commands_leave_state_untouched(
        position in -10_000i32..10_000,
        speed in -1_000i32..1_000,
        acceleration in 1i32..5_000,
    ) {
        let (ready, home, diag) = signals();
        let sig = Signals { ready: &ready, home: &home, diagnostic: &diag };
        let (mut controller, rig) = build_controller(sig, ControllerConfig::default());

        let result = controller.handle_command(0, Command::Move {
            position,
            speed,
            acceleration,
            origin: -1,
        });

        prop_assert!(result.is_err());
        prop_assert_eq!(controller.motor_state(), MotorState::Unknown);
        prop_assert_eq!(controller.direction(), MovementDirection::Standstill);
        prop_assert_eq!(rig.motion.borrow().target, None);
        prop_assert_eq!(rig.store.borrow().get_i32("speed"), None);
        prop_assert_eq!(rig.store.borrow().get_i32("acc"), None);
    }

    /// A zero-speed move is always refused without touching the motion
    /// driver, regardless of target.
    #[test]
    fn prop_zero_speed_never_starts_a_move(position in -10_000i32..10_000) {
        let (ready, home, diag) = signals();
        let sig = Signals { ready: &ready, home: &home, diagnostic: &diag };
        let (mut controller, rig) = build_controller(sig, ControllerConfig::default());
        let now = calibrate(&mut controller, &ready);
        rig.take_events();

        let result = controller.handle_command(now, Command::Move {
            position,
            speed: 0,
            acceleration: 300,
            origin: -1,
        });

        prop_assert!(result.is_err());
        prop_assert_eq!(controller.motor_state(), MotorState::Idle);
        prop_assert_eq!(rig.motion.borrow().target, None);
    }

    /// Every command, accepted or refused, is answered by exactly one
    /// outbound event.
    #[test]
    fn prop_every_command_emits_exactly_one_event(command in command_strategy()) {
        let (ready, home, diag) = signals();
        let sig = Signals { ready: &ready, home: &home, diagnostic: &diag };
        let (mut controller, rig) = build_controller(sig, ControllerConfig::default());
        let now = calibrate(&mut controller, &ready);
        rig.take_events();

        let _ = controller.handle_command(now, command);

        prop_assert_eq!(rig.take_events().len(), 1);
    }

    /// Tunables and the calibration result survive a restart through the
    /// settings store.
    #[test]
    fn prop_settings_survive_restart(
        speed in 1i32..500,
        acceleration in 1i32..5_000,
        auto_home: bool,
    ) {
        let store = Rc::new(RefCell::new(MemoryStore::new()));
        {
            let (ready, home, diag) = signals();
            let sig = Signals { ready: &ready, home: &home, diagnostic: &diag };
            let (mut controller, _rig) = build_controller_with_store(
                sig,
                ControllerConfig::default(),
                store.clone(),
            );
            let now = calibrate(&mut controller, &ready);
            controller.handle_command(now, Command::Move {
                position: 400,
                speed,
                acceleration,
                origin: -1,
            }).unwrap();
            controller.handle_command(now, Command::UpdateConfig {
                auto_home,
                origin: -1,
            }).unwrap();
        }

        // Restart: a fresh controller over the same store.
        let (ready, home, diag) = signals();
        let sig = Signals { ready: &ready, home: &home, diagnostic: &diag };
        let (controller, _rig) = build_controller_with_store(
            sig,
            ControllerConfig::default(),
            store,
        );
        let settings = controller.settings();
        prop_assert_eq!(settings.speed, speed);
        prop_assert_eq!(settings.acceleration, acceleration);
        prop_assert_eq!(settings.auto_home, auto_home);
        prop_assert_eq!(settings.gradient, Some(14));
        prop_assert_eq!(settings.offset, Some(36));
    }

    /// Whole-millimeter positions convert to steps and back without loss at
    /// any resolution.
    #[test]
    fn prop_mm_steps_roundtrip(mm in -100_000i32..100_000, resolution in 1u32..2_000) {
        let steps_per_mm = StepsPerMm(resolution);
        prop_assert_eq!(steps_per_mm.millimeters(steps_per_mm.steps(mm)), mm);
    }

    /// Step-to-millimeter conversion truncates by less than one millimeter.
    #[test]
    fn prop_mm_truncation_is_bounded(steps in -1_000_000i64..1_000_000) {
        let steps_per_mm = StepsPerMm(400);
        let mm = steps_per_mm.millimeters(Steps(steps));
        prop_assert!((steps - mm as i64 * 400).abs() < 400);
    }
}
