pub mod bounding_box;
pub mod checkpoint;
pub mod events;
pub mod track;
pub mod vehicle;
mod settings;

pub use settings::{
    ProgressTuning, PursuitTuning, ScoringTuning, SeekerTuning, Settings, TractionFactors,
    VehicleTuning, GLOBAL_CONFIG,
};

pub type VehicleID = usize;

// floor for near-zero denominators in geometry code
pub const EPSILON: f64 = 1e-6;
