use glam::DVec2;

use skid_core::events::EventSink;
use skid_core::vehicle::control_input::ControlInput;
use skid_core::vehicle::state::VehicleState;
use skid_core::{PursuitTuning, EPSILON};

use super::route::Route;
use super::Controller;
use crate::checkpoints::Gate;

// Per-vehicle follower state; the route itself is shared read-only data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RouteState {
    pub nearest: Option<usize>,
    // total forward steps taken by `nearest`, across wraparounds
    pub advanced: usize,
    pub checkpoint: usize,
    pub target: DVec2,
    pub curvature: f64,
    pub target_speed: f64,
}

pub struct PurePursuit {
    route: Route,
    tuning: PursuitTuning,
    // gate and the route index nearest to it, when steering through checkpoints
    gates: Vec<(Gate, usize)>,
    state: RouteState,
}

impl PurePursuit {
    pub fn new(route: Route, tuning: PursuitTuning) -> Self {
        Self {
            route,
            tuning,
            gates: Vec::new(),
            state: RouteState::default(),
        }
    }

    // Aim through each gate in turn instead of chasing the lookahead point.
    pub fn through_gates(mut self, gates: &[Gate]) -> Self {
        self.gates = gates
            .iter()
            .filter_map(|gate| {
                self.route
                    .nearest_index(gate.shape.center())
                    .map(|anchor| (*gate, anchor))
            })
            .collect();
        self
    }

    pub fn state(&self) -> &RouteState {
        &self.state
    }

    pub fn lookahead(&self, speed: f64) -> f64 {
        let tuning = &self.tuning;
        (tuning.lookahead_min + tuning.lookahead_gain * speed)
            .clamp(tuning.lookahead_min, tuning.lookahead_max)
    }

    pub fn target_speed(&self, curvature: f64) -> f64 {
        let tuning = &self.tuning;
        (tuning.curvature_speed / (1.0 + curvature.abs() * tuning.curvature_scale))
            .clamp(tuning.min_speed, tuning.max_speed)
    }

    fn update_nearest(&mut self, position: DVec2) -> usize {
        let nearest = match self.state.nearest {
            Some(from) => {
                let (index, steps) = self.route.advance_nearest(from, position);
                self.state.advanced += steps;
                index
            }
            None => self.route.nearest_index(position).unwrap_or(0),
        };
        self.state.nearest = Some(nearest);
        nearest
    }

    fn pick_target(&mut self, vehicle: &VehicleState, nearest: usize) -> DVec2 {
        if self.gates.is_empty() {
            return self
                .route
                .point_ahead(nearest, self.lookahead(vehicle.speed()));
        }

        let count = self.gates.len();
        let (gate, _) = &self.gates[self.state.checkpoint % count];
        if gate.is_crossed_by(vehicle.position) {
            self.state.checkpoint = (self.state.checkpoint + 1) % count;
        }
        // a few steps past the gate keeps the car on the racing line
        let (_, anchor) = self.gates[self.state.checkpoint % count];
        self.route.point(anchor + self.tuning.gate_lookahead_steps)
    }
}

// Pure pursuit geometry: the arc through the car's position that is tangent
// to its heading and passes through `target`.
pub fn pursuit_curvature(vehicle: &VehicleState, target: DVec2) -> f64 {
    let (x, y) = vehicle.decompose(target - vehicle.position);
    2.0 * y / (x * x + y * y).max(EPSILON)
}

impl Controller for PurePursuit {
    fn control(
        &mut self,
        vehicle: &VehicleState,
        _dt: f64,
        _sink: &mut dyn EventSink,
    ) -> ControlInput {
        if self.route.is_empty() {
            return ControlInput::coast();
        }
        let tuning = self.tuning;

        let nearest = self.update_nearest(vehicle.position);
        let target = self.pick_target(vehicle, nearest);
        let curvature = pursuit_curvature(vehicle, target);
        let steer_angle = (tuning.wheelbase * curvature).atan().to_degrees() * tuning.steer_gain;
        let target_speed = self.target_speed(curvature);

        self.state.target = target;
        self.state.curvature = curvature;
        self.state.target_speed = target_speed;

        let speed = vehicle.speed();
        let throttle = speed < target_speed - tuning.speed_band;
        let brake = speed > target_speed + tuning.speed_band;
        let straight =
            target_speed >= tuning.max_speed && steer_angle.abs() <= tuning.turbo_max_steer;

        ControlInput {
            throttle,
            brake,
            steer_left: steer_angle > tuning.steer_dead_zone,
            steer_right: steer_angle < -tuning.steer_dead_zone,
            turbo: throttle && straight && vehicle.turbo.charge >= tuning.turbo_min_charge,
            handbrake: false,
        }
    }

    fn name(&self) -> &'static str {
        "pure pursuit"
    }

    fn reset(&mut self) {
        self.state = RouteState::default();
    }
}
