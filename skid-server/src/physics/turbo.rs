use skid_core::events::{EventSink, RaceEvent};
use skid_core::vehicle::state::VehicleState;
use skid_core::VehicleTuning;

use super::constants::MAX_TURBO_CHARGE;
use super::vehicle_entity::turbo_boost;

// Applies one step of turbo to the longitudinal speed and returns the new speed.
// Drain, regen, and cooldown are per second; the boost itself is per frame.
pub fn apply(
    state: &mut VehicleState,
    v_long: f64,
    requested: bool,
    dt: f64,
    frames: f64,
    tuning: &VehicleTuning,
    sink: &mut dyn EventSink,
) -> f64 {
    let turbo = &mut state.turbo;
    let can_fire = requested
        && turbo.charge > 0.0
        && turbo.cooldown_timer <= 0.0
        && v_long >= 0.0
        && !state.collided;

    if !can_fire {
        turbo.active = false;
        turbo.active_timer = 0.0;
        if turbo.cooldown_timer > 0.0 {
            turbo.cooldown_timer = (turbo.cooldown_timer - dt).max(0.0);
        } else {
            turbo.charge = (turbo.charge + tuning.turbo_regen * dt).min(MAX_TURBO_CHARGE);
        }
        return v_long;
    }

    if !turbo.active {
        turbo.active = true;
        sink.record(state.id, RaceEvent::TurboEngaged);
    }
    turbo.active_timer += dt;
    turbo.charge = (turbo.charge - tuning.turbo_drain * dt).max(0.0);

    let boosted = v_long * turbo_boost(v_long).powf(frames);

    if turbo.charge <= 0.0 {
        turbo.active = false;
        turbo.active_timer = 0.0;
        turbo.cooldown_timer = tuning.turbo_cooldown;
        sink.record(state.id, RaceEvent::TurboDepleted);
    }

    boosted
}
