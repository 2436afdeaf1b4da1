use glam::DVec2;

use skid_core::events::{EventSink, RaceEvent};
use skid_core::vehicle::control_input::ControlInput;
use skid_core::vehicle::normalize_heading;
use skid_core::vehicle::state::VehicleState;
use skid_core::SeekerTuning;

use super::Controller;

/*
 * Drives straight at one checkpoint after another with no racing line. Cheap
 * and robust enough for background traffic; it relies on the stuck timer to
 * get out of places where pointing at the checkpoint isn't enough.
 */
pub struct ReactiveSeeker {
    checkpoints: Vec<DVec2>,
    tuning: SeekerTuning,
    index: usize,
    last_position: Option<DVec2>,
    stuck_time: f64,
    attempts: u32,
}

impl ReactiveSeeker {
    pub fn new(checkpoints: Vec<DVec2>, tuning: SeekerTuning) -> Self {
        Self {
            checkpoints,
            tuning,
            index: 0,
            last_position: None,
            stuck_time: 0.0,
            attempts: 0,
        }
    }

    fn advance(&mut self) {
        self.index = (self.index + 1) % self.checkpoints.len();
    }

    // skip ahead when stuck; once skipping has failed too often, start over
    fn recover(&mut self, vehicle: &VehicleState, sink: &mut dyn EventSink) {
        let stuck_at = self.index;
        self.stuck_time = 0.0;
        self.attempts += 1;
        if self.attempts >= self.tuning.max_recovery_attempts {
            self.index = 0;
            self.attempts = 0;
            sink.record(vehicle.id, RaceEvent::RouteReset);
        } else {
            self.advance();
            sink.record(vehicle.id, RaceEvent::CheckpointSkipped { checkpoint: stuck_at });
        }
    }

    fn track_stuck(&mut self, vehicle: &VehicleState, dt: f64, sink: &mut dyn EventSink) {
        let moved = self
            .last_position
            .map(|last| last.distance(vehicle.position))
            .unwrap_or(f64::INFINITY);
        self.last_position = Some(vehicle.position);

        if moved < self.tuning.stuck_min_displacement {
            self.stuck_time += dt;
        } else {
            self.stuck_time = 0.0;
        }
        if self.stuck_time > self.tuning.stuck_timeout {
            self.recover(vehicle, sink);
        }
    }
}

impl Controller for ReactiveSeeker {
    fn control(
        &mut self,
        vehicle: &VehicleState,
        dt: f64,
        sink: &mut dyn EventSink,
    ) -> ControlInput {
        if self.checkpoints.is_empty() {
            return ControlInput::coast();
        }
        self.track_stuck(vehicle, dt, sink);

        let tuning = &self.tuning;
        let mut offset = self.checkpoints[self.index] - vehicle.position;
        if offset.length() < tuning.reach_radius {
            self.attempts = 0;
            self.advance();
            offset = self.checkpoints[self.index] - vehicle.position;
        }

        let tuning = &self.tuning;
        let distance = offset.length();
        let bearing = offset.y.atan2(offset.x).to_degrees();
        let error = normalize_heading(bearing - vehicle.heading);
        let speed = vehicle.speed();

        // first match wins
        let brake = (distance < tuning.near_distance && speed > tuning.fast_speed)
            || (error.abs() > tuning.wide_angle && speed > tuning.fast_speed)
            || (distance < tuning.close_distance && speed > tuning.moderate_speed)
            || error.abs() > tuning.very_wide_angle;
        let throttle = !brake
            && error.abs() < tuning.aligned_angle
            && distance > tuning.reach_radius
            && speed < tuning.max_aligned_speed;

        ControlInput {
            throttle,
            brake,
            steer_left: error > tuning.steer_dead_zone,
            steer_right: error < -tuning.steer_dead_zone,
            turbo: false,
            handbrake: false,
        }
    }

    fn name(&self) -> &'static str {
        "reactive seeker"
    }

    fn reset(&mut self) {
        self.index = 0;
        self.last_position = None;
        self.stuck_time = 0.0;
        self.attempts = 0;
    }
}
