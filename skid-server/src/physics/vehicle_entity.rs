use glam::DVec2;

use skid_core::events::{EventSink, RaceEvent};
use skid_core::track::TrackSurface;
use skid_core::vehicle::state::{Traction, VehicleState};
use skid_core::vehicle::{heading_vector, left_vector};
use skid_core::VehicleTuning;

use super::constants::*;

pub struct VehicleEntity {
    pub state: VehicleState,
    pub tuning: VehicleTuning,
    pub reference_fps: f64,
}

impl VehicleEntity {
    pub fn new(state: VehicleState, tuning: VehicleTuning, reference_fps: f64) -> Self {
        Self {
            state,
            tuning,
            reference_fps,
        }
    }

    // Starts a drift session on request of the caller (e.g. a dedicated drift
    // button). Returns whether a session is running afterwards.
    pub fn start_drift(&mut self, sink: &mut dyn EventSink) -> bool {
        if self.state.drift.active {
            return true;
        }
        if !self.state.traction.can_drift()
            || self.state.collided
            || self.state.handbrake_locked
            || self.state.speed() <= self.tuning.drift_min_speed
        {
            return false;
        }
        super::drift::begin(&mut self.state, 0);
        sink.record(self.state.id, RaceEvent::DriftStarted);
        true
    }

    pub fn stop_drift(&mut self, sink: &mut dyn EventSink) {
        if self.state.drift.active {
            let duration = super::drift::end(&mut self.state);
            sink.record(self.state.id, RaceEvent::DriftEnded { duration });
        }
    }

    pub fn on_grass(&self, surface: &dyn TrackSurface) -> bool {
        surface.is_grass(self.state.position.x, self.state.position.y)
    }
}

pub fn max_speed_for(tuning: &VehicleTuning, traction: Traction, turbo_active: bool) -> f64 {
    let turbo = if turbo_active {
        tuning.turbo_top_speed
    } else {
        1.0
    };
    tuning.max_speed * tuning.traction_top_speed.get(traction) * turbo
}

pub fn throttle_gain(speed: f64) -> f64 {
    banded(speed.abs(), &THROTTLE_BANDS, THROTTLE_TOP_GAIN)
}

pub fn turbo_boost(speed: f64) -> f64 {
    banded(speed.abs(), &TURBO_BANDS, TURBO_TOP_BOOST)
}

// degrees per reference frame
pub fn turn_rate(tuning: &VehicleTuning, speed: f64) -> f64 {
    let speed = speed.abs();
    let rate = if speed < STEER_LOW_BAND {
        tuning.turn_rate * speed
    } else if speed < STEER_HIGH_BAND {
        tuning.turn_rate * (1.0 + STEER_MID_SLOPE * (speed - STEER_LOW_BAND))
    } else {
        tuning.turn_rate * STEER_TOP_FACTOR
    };
    rate.min(tuning.max_turn_rate)
}

// Centre, nose, tail, and both flanks of the car, in world coordinates.
pub fn hull_points(tuning: &VehicleTuning, position: DVec2, heading: f64) -> [DVec2; 5] {
    let forward = heading_vector(heading) * tuning.half_length;
    let left = left_vector(heading) * tuning.half_width;
    [
        position,
        position + forward,
        position - forward,
        position + left,
        position - left,
    ]
}
