use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::{heading_vector, left_vector, normalize_heading};
use crate::VehicleID;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Traction {
    Rear,
    Front,
    Awd,
}

impl Traction {
    // front-driven cars keep their grip under a handbrake turn
    pub fn can_drift(&self) -> bool {
        !matches!(self, Traction::Front)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DriftState {
    pub active: bool,
    // time since the current session began; zero whenever inactive
    pub timer: f64,
    // length of the most recent session, kept after it ends for the HUD
    pub elapsed: f64,
    pub direction: i8,
    // 0 = follow steering immediately, 1 = hold the previous slide direction
    pub stabilization: f64,
    // signed slide direction in [-1, 1] that the lateral kick follows
    pub committed_direction: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurboState {
    pub charge: f64,
    pub active: bool,
    pub active_timer: f64,
    pub cooldown_timer: f64,
}

impl Default for TurboState {
    fn default() -> Self {
        Self {
            charge: 100.0,
            active: false,
            active_timer: 0.0,
            cooldown_timer: 0.0,
        }
    }
}

// A single vehicle's kinematic state. Velocity is stored in the vehicle frame:
// `v_long` along the heading, `v_lat` along the heading's left normal.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct VehicleState {
    pub id: VehicleID,
    pub position: DVec2,
    pub heading: f64, // degrees, (-180, 180]
    pub v_long: f64,
    pub v_lat: f64,
    pub traction: Traction,
    pub drift: DriftState,
    pub turbo: TurboState,
    pub handbrake_locked: bool,
    pub collided: bool,
    // impact strength of the most recent collision in [0, 1]; zero on ticks without one
    pub last_impact: f64,
}

impl VehicleState {
    pub fn new(id: VehicleID, position: DVec2, heading: f64, traction: Traction) -> Self {
        VehicleState {
            id,
            position,
            heading: normalize_heading(heading),
            v_long: 0.0,
            v_lat: 0.0,
            traction,
            drift: DriftState::default(),
            turbo: TurboState::default(),
            handbrake_locked: false,
            collided: false,
            last_impact: 0.0,
        }
    }

    pub fn forward(&self) -> DVec2 {
        heading_vector(self.heading)
    }

    pub fn left(&self) -> DVec2 {
        left_vector(self.heading)
    }

    pub fn velocity(&self) -> DVec2 {
        self.forward() * self.v_long + self.left() * self.v_lat
    }

    pub fn speed(&self) -> f64 {
        self.v_long.hypot(self.v_lat)
    }

    // Angle in degrees between where the car points and where it travels,
    // folded so reversing straight back reads as zero slip.
    pub fn slip_angle(&self) -> f64 {
        if self.speed() < crate::EPSILON {
            return 0.0;
        }
        let angle = self.v_lat.atan2(self.v_long.abs()).to_degrees();
        angle.abs()
    }

    // world vector -> (forward, left) components against this state's heading
    pub fn decompose(&self, world: DVec2) -> (f64, f64) {
        (world.dot(self.forward()), world.dot(self.left()))
    }
}
