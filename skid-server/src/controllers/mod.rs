use skid_core::events::EventSink;
use skid_core::vehicle::control_input::ControlInput;
use skid_core::vehicle::state::VehicleState;

pub mod pure_pursuit;
pub mod reactive;
pub mod route;

// Anything that can drive a car: it sees the car's state once per tick and
// answers with the controls to apply.
pub trait Controller {
    fn control(
        &mut self,
        vehicle: &VehicleState,
        dt: f64,
        sink: &mut dyn EventSink,
    ) -> ControlInput;

    fn name(&self) -> &'static str;

    // forget per-race state before a restart
    fn reset(&mut self) {}
}

// Controls mapped from a keyboard or pad elsewhere; the race loop just
// replays whatever was last set.
#[derive(Default)]
pub struct HumanController {
    pub input: ControlInput,
}

impl HumanController {
    pub fn set_input(&mut self, input: ControlInput) {
        self.input = input;
    }
}

impl Controller for HumanController {
    fn control(
        &mut self,
        _vehicle: &VehicleState,
        _dt: f64,
        _sink: &mut dyn EventSink,
    ) -> ControlInput {
        self.input
    }

    fn name(&self) -> &'static str {
        "human"
    }
}
