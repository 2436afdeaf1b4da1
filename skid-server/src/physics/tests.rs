use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use skid_core::bounding_box::BoundingBox;
use skid_core::events::{EventLog, NullSink, RaceEvent};
use skid_core::track::{OpenSurface, RectSurface};
use skid_core::vehicle::control_input::ControlInput;
use skid_core::vehicle::state::{Traction, VehicleState};
use skid_core::VehicleTuning;

use crate::physics::vehicle_entity::{max_speed_for, throttle_gain, turn_rate, VehicleEntity};

const DT: f64 = 1.0 / 60.0;

fn get_starting_vehicle(traction: Traction) -> VehicleEntity {
    VehicleEntity::new(
        VehicleState::new(0, DVec2::ZERO, 0.0, traction),
        VehicleTuning::default(),
        60.0,
    )
}

fn throttle() -> ControlInput {
    ControlInput {
        throttle: true,
        ..ControlInput::default()
    }
}

fn random_input(rng: &mut StdRng) -> ControlInput {
    ControlInput {
        throttle: rng.gen_bool(0.7),
        steer_left: rng.gen_bool(0.3),
        steer_right: rng.gen_bool(0.3),
        brake: rng.gen_bool(0.15),
        turbo: rng.gen_bool(0.3),
        handbrake: rng.gen_bool(0.2),
    }
}

#[test]
fn test_accelerating() {
    let mut vehicle = get_starting_vehicle(Traction::Rear);
    vehicle.step(&throttle(), DT, &OpenSurface, &mut NullSink);

    // full gain below the first band, scaled by the rear-drive factor
    let expected = 0.25 * 0.7;
    assert!((vehicle.state.v_long - expected).abs() < 1e-9);
    assert!(vehicle
        .state
        .position
        .abs_diff_eq(DVec2::new(expected, 0.0), 1e-9));
    assert_eq!(vehicle.state.v_lat, 0.0);
}

#[test]
fn test_throttle_gain_tapers_with_speed() {
    assert_eq!(throttle_gain(0.5), 1.0);
    assert_eq!(throttle_gain(2.0), 0.75);
    assert_eq!(throttle_gain(3.0), 0.5);
    assert_eq!(throttle_gain(5.0), 0.3);
    assert_eq!(throttle_gain(5.6), 0.15);
    assert_eq!(throttle_gain(-0.5), 1.0);
}

#[test]
fn test_traction_changes_acceleration() {
    let mut rear = get_starting_vehicle(Traction::Rear);
    let mut front = get_starting_vehicle(Traction::Front);
    let mut awd = get_starting_vehicle(Traction::Awd);
    for vehicle in [&mut rear, &mut front, &mut awd] {
        vehicle.step(&throttle(), DT, &OpenSurface, &mut NullSink);
    }
    assert!(front.state.v_long < rear.state.v_long);
    assert!(rear.state.v_long < awd.state.v_long);
}

#[test]
fn test_coasting_decays() {
    let mut vehicle = get_starting_vehicle(Traction::Rear);
    vehicle.state.v_long = 4.0;
    vehicle.step(&ControlInput::coast(), DT, &OpenSurface, &mut NullSink);
    assert!((vehicle.state.v_long - 4.0 * 0.985).abs() < 1e-9);

    for _ in 0..2000 {
        vehicle.step(&ControlInput::coast(), DT, &OpenSurface, &mut NullSink);
    }
    assert_eq!(vehicle.state.v_long, 0.0);
}

#[test]
fn test_braking_into_reverse() {
    let mut vehicle = get_starting_vehicle(Traction::Rear);
    vehicle.state.v_long = 0.5;
    let brake = ControlInput {
        brake: true,
        ..ControlInput::default()
    };

    vehicle.step(&brake, DT, &OpenSurface, &mut NullSink);
    assert!((vehicle.state.v_long - 0.2).abs() < 1e-9);
    vehicle.step(&brake, DT, &OpenSurface, &mut NullSink);
    assert_eq!(vehicle.state.v_long, 0.0);

    // from a standstill braking becomes reversing, limited to the reverse cap
    for _ in 0..600 {
        vehicle.step(&brake, DT, &OpenSurface, &mut NullSink);
    }
    let reverse_cap =
        max_speed_for(&vehicle.tuning, Traction::Rear, false) * vehicle.tuning.max_reverse_fraction;
    assert!((vehicle.state.v_long + reverse_cap).abs() < 1e-9);
    assert!(vehicle.state.position.x < 0.0);
}

#[test]
fn test_steering_scales_with_speed_and_inverts_in_reverse() {
    let tuning = VehicleTuning::default();
    assert_eq!(turn_rate(&tuning, 0.0), 0.0);
    assert!(turn_rate(&tuning, 0.5) < turn_rate(&tuning, 2.0));
    assert_eq!(turn_rate(&tuning, 5.0), turn_rate(&tuning, 50.0));
    assert!(turn_rate(&tuning, 50.0) <= tuning.max_turn_rate);

    let left = ControlInput {
        steer_left: true,
        ..ControlInput::default()
    };

    let mut forwards = get_starting_vehicle(Traction::Rear);
    forwards.state.v_long = 3.0;
    forwards.step(&left, DT, &OpenSurface, &mut NullSink);
    assert!(forwards.state.heading > 0.0);

    let mut backwards = get_starting_vehicle(Traction::Rear);
    backwards.state.v_long = -1.5;
    backwards.step(&left, DT, &OpenSurface, &mut NullSink);
    assert!(backwards.state.heading < 0.0);
}

#[test]
fn test_turning_creates_slip_that_grip_removes() {
    let mut vehicle = get_starting_vehicle(Traction::Rear);
    vehicle.state.v_long = 5.0;
    let left = ControlInput {
        steer_left: true,
        throttle: true,
        ..ControlInput::default()
    };
    vehicle.step(&left, DT, &OpenSurface, &mut NullSink);
    // turning left leaves momentum pointing to the right of the nose
    assert!(vehicle.state.v_lat < 0.0);

    for _ in 0..120 {
        vehicle.step(&throttle(), DT, &OpenSurface, &mut NullSink);
    }
    assert_eq!(vehicle.state.v_lat, 0.0);
}

#[test]
fn test_speed_never_exceeds_max() {
    let mut rng = StdRng::seed_from_u64(7);
    let arena = RectSurface::new(vec![BoundingBox::new(-400.0, 400.0, -400.0, 400.0)], vec![]);

    for traction in [Traction::Rear, Traction::Front, Traction::Awd] {
        let mut vehicle = get_starting_vehicle(traction);
        for _ in 0..5000 {
            let input = random_input(&mut rng);
            vehicle.step(&input, DT, &arena, &mut NullSink);
            let state = &vehicle.state;
            let limit = max_speed_for(&vehicle.tuning, traction, state.turbo.active);
            assert!(state.v_long.abs() <= limit + 1e-9);
            assert!(state.heading > -180.0 && state.heading <= 180.0);
            if !state.drift.active {
                assert_eq!(state.drift.timer, 0.0);
            }
        }
    }
}

#[test]
fn test_front_traction_never_drifts() {
    let mut rng = StdRng::seed_from_u64(1234);
    let mut log = EventLog::new();

    for _ in 0..1000 {
        let mut vehicle = get_starting_vehicle(Traction::Front);
        vehicle.state.v_long = rng.gen_range(0.0..5.0);
        for _ in 0..30 {
            let input = random_input(&mut rng);
            vehicle.step(&input, DT, &OpenSurface, &mut log);
            assert!(!vehicle.state.drift.active);
        }
        assert!(!vehicle.start_drift(&mut log));
    }
    assert_eq!(log.count(|e| matches!(e, RaceEvent::DriftStarted)), 0);
}

#[test]
fn test_handbrake_turn_starts_timed_drift() {
    let mut vehicle = get_starting_vehicle(Traction::Rear);
    vehicle.state.v_long = 4.0;
    let mut log = EventLog::new();

    let handbrake_turn = ControlInput {
        throttle: true,
        steer_left: true,
        handbrake: true,
        ..ControlInput::default()
    };
    vehicle.step(&handbrake_turn, DT, &OpenSurface, &mut log);
    assert!(vehicle.state.drift.active);
    assert!(!vehicle.state.handbrake_locked);
    assert_eq!(vehicle.state.drift.direction, 1);

    let powered_left = ControlInput {
        handbrake: false,
        ..handbrake_turn
    };
    let mut ticks = 1;
    while vehicle.state.drift.active && ticks < 600 {
        vehicle.step(&powered_left, DT, &OpenSurface, &mut log);
        ticks += 1;
    }

    // the session lasts its fixed duration, then the timer is cleared
    assert!((ticks as f64 * DT - vehicle.tuning.drift_duration).abs() < 2.0 * DT);
    assert_eq!(vehicle.state.drift.timer, 0.0);
    assert!(vehicle.state.drift.elapsed >= vehicle.tuning.drift_duration);
    assert_eq!(log.count(|e| matches!(e, RaceEvent::DriftStarted)), 1);
    assert_eq!(log.count(|e| matches!(e, RaceEvent::DriftEnded { .. })), 1);
}

#[test]
fn test_rear_drift_slides_more_than_awd() {
    let mut rear = get_starting_vehicle(Traction::Rear);
    let mut awd = get_starting_vehicle(Traction::Awd);
    let mut gripping = get_starting_vehicle(Traction::Rear);
    let powered_left = ControlInput {
        throttle: true,
        steer_left: true,
        ..ControlInput::default()
    };

    for vehicle in [&mut rear, &mut awd, &mut gripping] {
        vehicle.state.v_long = 4.0;
    }
    assert!(rear.start_drift(&mut NullSink));
    assert!(awd.start_drift(&mut NullSink));

    for _ in 0..10 {
        for vehicle in [&mut rear, &mut awd, &mut gripping] {
            vehicle.step(&powered_left, DT, &OpenSurface, &mut NullSink);
        }
    }
    assert!(rear.state.drift.active);
    assert!(awd.state.drift.active);
    assert!(rear.state.slip_angle() > awd.state.slip_angle());
    assert!(awd.state.slip_angle() > gripping.state.slip_angle() + 10.0);

    rear.stop_drift(&mut NullSink);
    assert!(!rear.state.drift.active);
    assert_eq!(rear.state.drift.timer, 0.0);
}

#[test]
fn test_handbrake_lock_at_low_speed() {
    let mut vehicle = get_starting_vehicle(Traction::Awd);
    vehicle.state.v_long = 0.5;
    let mut log = EventLog::new();

    let handbrake = ControlInput {
        handbrake: true,
        throttle: true,
        ..ControlInput::default()
    };
    vehicle.step(&handbrake, DT, &OpenSurface, &mut log);
    assert!(vehicle.state.handbrake_locked);
    assert!(!vehicle.state.drift.active);
    assert_eq!(vehicle.state.v_long, 0.0);

    vehicle.step(&handbrake, DT, &OpenSurface, &mut log);
    assert_eq!(vehicle.state.v_long, 0.0);

    vehicle.step(&throttle(), DT, &OpenSurface, &mut log);
    assert!(!vehicle.state.handbrake_locked);
    assert!(vehicle.state.v_long > 0.0);
    assert_eq!(
        log.drain(),
        vec![(0, RaceEvent::HandbrakeLocked), (0, RaceEvent::HandbrakeReleased)]
    );
}

#[test]
fn test_wall_collision_rolls_back() {
    let corridor = RectSurface::new(vec![BoundingBox::new(-100.0, 100.0, -20.0, 20.0)], vec![]);
    let mut vehicle = get_starting_vehicle(Traction::Rear);
    vehicle.state.position = DVec2::new(84.0, 0.0);
    vehicle.state.v_long = 5.0;
    let mut log = EventLog::new();

    vehicle.step(&ControlInput::coast(), DT, &corridor, &mut log);

    let state = vehicle.state;
    assert!(state.position.abs_diff_eq(DVec2::new(84.0, 0.0), 1e-9));
    assert!(state.collided);
    assert!(state.v_long < 0.0);
    assert!(state.v_long.abs() < 5.0 * 0.3 + 1e-9);
    assert_eq!(state.v_lat, 0.0);
    assert!(state.last_impact > 0.5);
    assert_eq!(log.count(|e| matches!(e, RaceEvent::Collision { .. })), 1);

    // no acceleration while the collision flag is up
    vehicle.step(&throttle(), DT, &corridor, &mut log);
    assert!(vehicle.state.v_long < 0.0);
    assert_eq!(vehicle.state.last_impact, 0.0);

    for _ in 0..600 {
        vehicle.step(&ControlInput::coast(), DT, &corridor, &mut log);
    }
    assert!(!vehicle.state.collided);
}

#[test]
fn test_turbo_raises_speed_and_cap() {
    let mut plain = get_starting_vehicle(Traction::Rear);
    let mut boosted = get_starting_vehicle(Traction::Rear);
    let turbo = ControlInput {
        throttle: true,
        turbo: true,
        ..ControlInput::default()
    };

    for _ in 0..120 {
        plain.step(&throttle(), DT, &OpenSurface, &mut NullSink);
        boosted.step(&turbo, DT, &OpenSurface, &mut NullSink);
    }
    assert!(boosted.state.v_long > plain.state.v_long);
    assert!(boosted.state.turbo.charge < 100.0);
    assert!(plain.state.v_long <= max_speed_for(&plain.tuning, Traction::Rear, false));
}
