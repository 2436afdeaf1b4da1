use config::{Config, ConfigError, File};
use lazy_static::lazy_static;
use serde::Deserialize;

use crate::vehicle::state::Traction;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server_tick_ms: u64,
    // dt is clamped to this before any component sees it; large steps overshoot the clamps
    pub max_time_step: f64,
    pub reference_fps: f64,
    pub laps_target: u32,
    pub track_file: String,
    pub vehicle_amount: usize,
    pub max_ticks: u64,
    // pace the headless loop to wall-clock time instead of running flat out
    pub realtime: bool,

    #[serde(default)]
    pub vehicle: VehicleTuning,
    #[serde(default)]
    pub pursuit: PursuitTuning,
    #[serde(default)]
    pub seeker: SeekerTuning,
    #[serde(default)]
    pub progress: ProgressTuning,
    #[serde(default)]
    pub scoring: ScoringTuning,
}

impl Settings {
    pub fn new() -> Result<Settings, ConfigError> {
        let config = Config::builder()
            .set_default("server_tick_ms", 16)?
            .set_default("max_time_step", 1.0 / 30.0)?
            .set_default("reference_fps", 60.0)?
            .set_default("laps_target", 3)?
            .set_default("track_file", "track.yaml")?
            .set_default("vehicle_amount", 4)?
            .set_default("max_ticks", 36_000)?
            .set_default("realtime", false)?
            .add_source(File::with_name("config.yaml").required(false))
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_tick_ms: 16,
            max_time_step: 1.0 / 30.0,
            reference_fps: 60.0,
            laps_target: 3,
            track_file: "track.yaml".to_string(),
            vehicle_amount: 4,
            max_ticks: 36_000,
            realtime: false,
            vehicle: VehicleTuning::default(),
            pursuit: PursuitTuning::default(),
            seeker: SeekerTuning::default(),
            progress: ProgressTuning::default(),
            scoring: ScoringTuning::default(),
        }
    }
}

/// One value per drivetrain layout.
#[derive(Deserialize, Clone, Copy, Debug)]
pub struct TractionFactors {
    pub rear: f64,
    pub front: f64,
    pub awd: f64,
}

impl TractionFactors {
    pub fn get(&self, traction: Traction) -> f64 {
        match traction {
            Traction::Rear => self.rear,
            Traction::Front => self.front,
            Traction::Awd => self.awd,
        }
    }
}

// Speeds are in units per reference frame; per-frame retention factors are
// raised to the power of (dt * reference_fps) when applied.
#[derive(Deserialize, Clone, Copy, Debug)]
#[serde(default)]
pub struct VehicleTuning {
    pub half_length: f64,
    pub half_width: f64,

    pub max_speed: f64,
    pub traction_top_speed: TractionFactors,
    pub turbo_top_speed: f64,
    pub max_reverse_fraction: f64,

    pub accelerator: f64,
    pub traction_accel: TractionFactors,
    pub brake: f64,
    pub reverse_threshold: f64,
    pub reverse_accelerator: f64,
    pub coast_retention: f64,
    pub handbrake_long_retention: f64,
    pub handbrake_lat_retention: f64,
    pub handbrake_lock_speed: f64,

    pub turn_rate: f64,
    pub max_turn_rate: f64,
    pub drift_turn_multiplier: f64,

    pub lateral_grip: f64,
    pub counter_steer_grip: f64,

    pub drift_min_speed: f64,
    pub drift_duration: f64,
    pub drift_grip: TractionFactors,
    pub drift_kick: f64,
    pub drift_stabilize_time: f64,
    pub drift_stabilize_bump: f64,

    pub turbo_drain: f64,
    pub turbo_regen: f64,
    pub turbo_cooldown: f64,

    pub collision_restitution: f64,
    pub collision_clear_speed: f64,
}

impl Default for VehicleTuning {
    fn default() -> Self {
        Self {
            half_length: 12.0,
            half_width: 6.0,

            max_speed: 6.0,
            traction_top_speed: TractionFactors {
                rear: 1.0,
                front: 0.9,
                awd: 0.95,
            },
            turbo_top_speed: 1.4,
            max_reverse_fraction: 0.4,

            accelerator: 0.25,
            traction_accel: TractionFactors {
                rear: 0.7,
                front: 0.6,
                awd: 0.8,
            },
            brake: 0.3,
            reverse_threshold: 0.1,
            reverse_accelerator: 0.12,
            coast_retention: 0.985,
            handbrake_long_retention: 0.9,
            handbrake_lat_retention: 0.8,
            handbrake_lock_speed: 1.0,

            turn_rate: 2.5,
            max_turn_rate: 4.0,
            drift_turn_multiplier: 1.2,

            lateral_grip: 0.2,
            counter_steer_grip: 0.4,

            drift_min_speed: 1.0,
            drift_duration: 1.5,
            drift_grip: TractionFactors {
                rear: 0.10,
                front: 1.0,
                awd: 0.20,
            },
            drift_kick: 0.08,
            drift_stabilize_time: 0.2,
            drift_stabilize_bump: 0.5,

            turbo_drain: 35.0,
            turbo_regen: 10.0,
            turbo_cooldown: 1.5,

            collision_restitution: 0.3,
            collision_clear_speed: 0.2,
        }
    }
}

#[derive(Deserialize, Clone, Copy, Debug)]
#[serde(default)]
pub struct PursuitTuning {
    pub route_spacing: f64,
    pub lookahead_min: f64,
    pub lookahead_gain: f64,
    pub lookahead_max: f64,
    pub wheelbase: f64,
    pub steer_gain: f64,
    pub steer_dead_zone: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    pub curvature_speed: f64,
    // curvature is multiplied by this before entering the target-speed formula
    pub curvature_scale: f64,
    pub speed_band: f64,
    pub gate_lookahead_steps: usize,
    pub turbo_min_charge: f64,
    pub turbo_max_steer: f64,
}

impl Default for PursuitTuning {
    fn default() -> Self {
        Self {
            route_spacing: 10.0,
            lookahead_min: 30.0,
            lookahead_gain: 8.0,
            lookahead_max: 110.0,
            wheelbase: 20.0,
            steer_gain: 1.0,
            steer_dead_zone: 2.0,
            min_speed: 2.0,
            max_speed: 5.5,
            curvature_speed: 6.0,
            curvature_scale: 50.0,
            speed_band: 0.3,
            gate_lookahead_steps: 6,
            turbo_min_charge: 30.0,
            turbo_max_steer: 1.5,
        }
    }
}

#[derive(Deserialize, Clone, Copy, Debug)]
#[serde(default)]
pub struct SeekerTuning {
    pub reach_radius: f64,
    pub near_distance: f64,
    pub close_distance: f64,
    pub fast_speed: f64,
    pub moderate_speed: f64,
    pub wide_angle: f64,
    pub very_wide_angle: f64,
    pub aligned_angle: f64,
    pub max_aligned_speed: f64,
    pub steer_dead_zone: f64,
    pub stuck_min_displacement: f64,
    pub stuck_timeout: f64,
    pub max_recovery_attempts: u32,
}

impl Default for SeekerTuning {
    fn default() -> Self {
        Self {
            reach_radius: 40.0,
            near_distance: 60.0,
            close_distance: 120.0,
            fast_speed: 4.0,
            moderate_speed: 3.0,
            wide_angle: 60.0,
            very_wide_angle: 110.0,
            aligned_angle: 25.0,
            max_aligned_speed: 5.0,
            steer_dead_zone: 5.0,
            stuck_min_displacement: 0.05,
            stuck_timeout: 5.0,
            max_recovery_attempts: 3,
        }
    }
}

#[derive(Deserialize, Clone, Copy, Debug)]
#[serde(default)]
pub struct ProgressTuning {
    pub gate_width: f64,
    pub gate_thickness: f64,
    pub vehicle_half_width: f64,
    pub wrong_way_dot: f64,
    pub direction_min_speed: f64,
}

impl Default for ProgressTuning {
    fn default() -> Self {
        Self {
            gate_width: 120.0,
            gate_thickness: 12.0,
            vehicle_half_width: 6.0,
            wrong_way_dot: -0.3,
            direction_min_speed: 0.1,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ScoringTuning {
    pub ladder: Vec<f64>,
    pub base_rate: f64,
    pub angle_reference: f64,
    pub angle_cap: f64,
    pub speed_reference: f64,
    pub speed_cap: f64,
    pub fill_rate: f64,
    pub fill_difficulty: f64,
    pub decay_rate: f64,
    pub decay_growth: f64,
    pub drop_carry_over: f64,
    pub no_drift_tolerance: f64,
    pub hard_collision: f64,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            ladder: vec![1.0, 2.0, 3.0, 4.0, 5.0],
            base_rate: 100.0,
            angle_reference: 30.0,
            angle_cap: 1.5,
            speed_reference: 4.0,
            speed_cap: 1.25,
            fill_rate: 0.6,
            fill_difficulty: 0.5,
            decay_rate: 0.2,
            decay_growth: 0.5,
            drop_carry_over: 0.5,
            no_drift_tolerance: 3.0,
            hard_collision: 0.8,
        }
    }
}

lazy_static! {
    pub static ref GLOBAL_CONFIG: Settings = Settings::new().expect("failed to read config file");
}
