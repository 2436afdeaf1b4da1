use skid_core::events::{EventSink, RaceEvent};
use skid_core::track::TrackSurface;
use skid_core::vehicle::control_input::ControlInput;
use skid_core::vehicle::state::VehicleState;
use skid_core::vehicle::{heading_vector, left_vector, normalize_heading};

pub mod constants;
mod drift;
mod turbo;
pub mod vehicle_entity;

#[cfg(test)]
mod tests;

use constants::REST_SPEED;
use vehicle_entity::{max_speed_for, hull_points, throttle_gain, turn_rate, VehicleEntity};

impl VehicleEntity {
    /* Given this tick's control input, compute and return what next tick's
     * vehicle state will be */
    pub fn do_physics_step(
        &self,
        inputs: &ControlInput,
        time_step: f64,
        surface: &dyn TrackSurface,
        sink: &mut dyn EventSink,
    ) -> VehicleState {
        let tuning = &self.tuning;
        // per-frame tuning is scaled by how many reference frames this step spans
        let frames = (time_step * self.reference_fps).max(0.0);
        let steer = inputs.steer_direction();

        let mut next = self.state;
        next.last_impact = 0.0;
        let mut v_long = next.v_long;
        let mut v_lat = next.v_lat;
        let speed = next.speed();

        self.update_handbrake_state(&mut next, inputs, speed, sink);

        // (1) longitudinal: handbrake overrides everything, then throttle, then brake, else coast
        if next.handbrake_locked {
            v_long = 0.0;
            v_lat = 0.0;
        } else if inputs.handbrake && !next.drift.active {
            v_long *= tuning.handbrake_long_retention.powf(frames);
            v_lat *= tuning.handbrake_lat_retention.powf(frames);
        } else if inputs.throttle && !next.collided {
            v_long += tuning.accelerator
                * throttle_gain(v_long)
                * tuning.traction_accel.get(next.traction)
                * frames;
        } else if inputs.brake {
            if v_long > tuning.reverse_threshold {
                v_long = (v_long - tuning.brake * frames).max(0.0);
            } else if v_long < -tuning.reverse_threshold && next.collided {
                v_long = (v_long + tuning.brake * frames).min(0.0);
            } else if !next.collided {
                v_long -= tuning.reverse_accelerator * frames;
            }
        } else {
            v_long *= tuning.coast_retention.powf(frames);
        }
        if v_long.abs() < REST_SPEED && !inputs.throttle && !inputs.brake {
            v_long = 0.0;
        }

        // (2) turbo
        v_long = turbo::apply(&mut next, v_long, inputs.turbo, time_step, frames, tuning, sink);

        // (3) steering; reversing flips the sense so the nose goes where the driver expects
        let mut rate = turn_rate(tuning, v_long.hypot(v_lat));
        if next.drift.active {
            rate *= tuning.drift_turn_multiplier;
        }
        let sense = if v_long < 0.0 { -1.0 } else { 1.0 };
        let delta = f64::from(steer) * sense * rate * frames;
        let heading = normalize_heading(next.heading + delta);

        // the car turns underneath its momentum: re-express velocity in the new frame
        let (sin_delta, cos_delta) = delta.to_radians().sin_cos();
        let turned_long = v_long * cos_delta + v_lat * sin_delta;
        let turned_lat = -v_long * sin_delta + v_lat * cos_delta;
        v_long = turned_long;
        v_lat = turned_lat;

        // (4) drift session and tire grip
        if next.drift.active {
            next.drift.timer += time_step;
            if next.drift.timer >= tuning.drift_duration {
                let duration = drift::end(&mut next);
                sink.record(next.id, RaceEvent::DriftEnded { duration });
            } else {
                drift::stabilize(&mut next.drift, steer, time_step, tuning);
            }
        }
        v_lat = drift::lateral_velocity(
            v_long,
            v_lat,
            &next.drift,
            next.traction,
            steer,
            frames,
            tuning,
        );

        // (5) clamp to what this drivetrain (and turbo) allows
        let max_speed = max_speed_for(tuning, next.traction, next.turbo.active);
        v_long = v_long.clamp(-max_speed * tuning.max_reverse_fraction, max_speed);

        // (6) recompose and integrate
        let velocity = heading_vector(heading) * v_long + left_vector(heading) * v_lat;
        let position = next.position + velocity * frames;

        // (7) check the surface around the car; any miss rolls the move back
        let hit_wall = hull_points(tuning, position, heading)
            .iter()
            .any(|point| !surface.is_drivable(point.x, point.y));

        if hit_wall {
            let impact = (v_long.hypot(v_lat) / max_speed.max(skid_core::EPSILON)).min(1.0);
            v_long = -v_long * tuning.collision_restitution;
            v_lat = 0.0;
            next.last_impact = impact;
            if !next.collided {
                sink.record(next.id, RaceEvent::Collision { force: impact });
            }
            next.collided = true;
            if next.drift.active {
                let duration = drift::end(&mut next);
                sink.record(next.id, RaceEvent::DriftEnded { duration });
            }
        } else {
            next.position = position;
            next.heading = heading;
            if next.collided && v_long.hypot(v_lat) < tuning.collision_clear_speed {
                next.collided = false;
            }
        }

        next.v_long = v_long;
        next.v_lat = v_lat;
        next
    }

    pub fn step(
        &mut self,
        inputs: &ControlInput,
        time_step: f64,
        surface: &dyn TrackSurface,
        sink: &mut dyn EventSink,
    ) -> &VehicleState {
        self.state = self.do_physics_step(inputs, time_step, surface, sink);
        &self.state
    }

    // Idle -> HandbrakeLocked at low speed, Idle -> Drifting when the handbrake
    // is thrown into a powered turn. The two states never overlap.
    fn update_handbrake_state(
        &self,
        next: &mut VehicleState,
        inputs: &ControlInput,
        speed: f64,
        sink: &mut dyn EventSink,
    ) {
        let tuning = &self.tuning;

        if !inputs.handbrake {
            if next.handbrake_locked {
                next.handbrake_locked = false;
                sink.record(next.id, RaceEvent::HandbrakeReleased);
            }
            return;
        }

        if next.drift.active || next.handbrake_locked {
            return;
        }

        let steer = inputs.steer_direction();
        if inputs.throttle
            && steer != 0
            && speed > tuning.drift_min_speed
            && next.traction.can_drift()
            && !next.collided
        {
            drift::begin(next, steer);
            sink.record(next.id, RaceEvent::DriftStarted);
        } else if speed <= tuning.handbrake_lock_speed {
            next.handbrake_locked = true;
            sink.record(next.id, RaceEvent::HandbrakeLocked);
        }
    }
}
