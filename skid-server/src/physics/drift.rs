use skid_core::vehicle::state::{DriftState, Traction, VehicleState};
use skid_core::VehicleTuning;

use super::constants::REST_SPEED;

pub fn begin(state: &mut VehicleState, direction: i8) {
    state.drift = DriftState {
        active: true,
        timer: 0.0,
        elapsed: state.drift.elapsed,
        direction,
        stabilization: 0.0,
        committed_direction: f64::from(direction),
    };
}

// Closes the session and returns how long it lasted.
pub fn end(state: &mut VehicleState) -> f64 {
    let duration = state.drift.timer;
    state.drift = DriftState {
        elapsed: duration,
        ..DriftState::default()
    };
    duration
}

// A change of steering direction mid-drift raises the stabilization factor,
// which makes the committed slide direction lag behind the new input; steady
// input lets it fall back to zero over `drift_stabilize_time`.
pub fn stabilize(drift: &mut DriftState, steer: i8, dt: f64, tuning: &VehicleTuning) {
    if steer != 0 && drift.direction != 0 && steer != drift.direction {
        drift.stabilization = (drift.stabilization + tuning.drift_stabilize_bump).min(1.0);
    } else if tuning.drift_stabilize_time > 0.0 {
        drift.stabilization = (drift.stabilization - dt / tuning.drift_stabilize_time).max(0.0);
    } else {
        drift.stabilization = 0.0;
    }

    if steer != 0 {
        drift.direction = steer;
    }

    let follow = 1.0 - drift.stabilization;
    drift.committed_direction += (f64::from(drift.direction) - drift.committed_direction) * follow;
    drift.committed_direction = drift.committed_direction.clamp(-1.0, 1.0);
}

// Lateral velocity after one step of tire grip. `frames` is dt expressed in
// reference frames.
pub fn lateral_velocity(
    v_long: f64,
    v_lat: f64,
    drift: &DriftState,
    traction: Traction,
    steer: i8,
    frames: f64,
    tuning: &VehicleTuning,
) -> f64 {
    if drift.active && traction.can_drift() && v_long > tuning.drift_min_speed {
        let grip = (tuning.lateral_grip * tuning.drift_grip.get(traction)).clamp(0.0, 1.0);
        let slid = v_lat * (1.0 - grip).powf(frames);
        // the tail swings out away from the turn
        return slid - drift.committed_direction * tuning.drift_kick * frames;
    }

    // steering towards the side the car is sliding to catches the slide faster
    let counter_steering =
        steer != 0 && v_lat.abs() > REST_SPEED && f64::from(steer).signum() == v_lat.signum();
    let grip = if counter_steering {
        tuning.counter_steer_grip
    } else {
        tuning.lateral_grip
    }
    .clamp(0.0, 1.0);

    let gripped = v_lat * (1.0 - grip).powf(frames);
    if gripped.abs() < REST_SPEED {
        0.0
    } else {
        gripped
    }
}
