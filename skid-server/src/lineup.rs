use glam::DVec2;

use skid_core::track::Track;
use skid_core::vehicle::state::{Traction, VehicleState};
use skid_core::{Settings, VehicleID};

use crate::checkpoints::Gate;
use crate::controllers::pure_pursuit::PurePursuit;
use crate::controllers::reactive::ReactiveSeeker;
use crate::controllers::route::Route;
use crate::controllers::Controller;
use crate::physics::vehicle_entity::VehicleEntity;

// Rear, front, AWD, rear, ... so every race has a mix of drivetrains
pub fn get_traction_from_vehicle_number(vehicle: VehicleID) -> Traction {
    match vehicle % 3 {
        0 => Traction::Rear,
        1 => Traction::Front,
        _ => Traction::Awd,
    }
}

// Get the initial state of a car at the race start, parked in its grid slot
pub fn get_vehicle_start_entity(
    track: &Track,
    settings: &Settings,
    vehicle: VehicleID,
    traction: Traction,
) -> VehicleEntity {
    let slot = track.start_slot(vehicle);
    VehicleEntity::new(
        VehicleState::new(vehicle, DVec2::new(slot.x, slot.y), slot.heading, traction),
        settings.vehicle,
        settings.reference_fps,
    )
}

// Even grid slots get the racing-line follower, odd ones the seeker
pub fn get_ai_controller(
    track: &Track,
    settings: &Settings,
    gates: &[Gate],
    vehicle: VehicleID,
) -> Box<dyn Controller> {
    if vehicle % 2 == 0 {
        let route = Route::closed_loop(&track.racing_line(), settings.pursuit.route_spacing);
        let pursuit = PurePursuit::new(route, settings.pursuit);
        // tracks with a separate racing line are steered gate to gate
        if track.waypoints.is_empty() {
            Box::new(pursuit)
        } else {
            Box::new(pursuit.through_gates(gates))
        }
    } else {
        let targets = track.checkpoints.iter().map(|checkpoint| checkpoint.pos()).collect();
        Box::new(ReactiveSeeker::new(targets, settings.seeker))
    }
}
