// Throttle gain falls off in discrete speed bands: (upper speed bound, gain).
// Above the last bound the car only gets THROTTLE_TOP_GAIN.
pub const THROTTLE_BANDS: [(f64, f64); 4] = [(1.0, 1.0), (2.5, 0.75), (4.0, 0.5), (5.5, 0.3)];
pub const THROTTLE_TOP_GAIN: f64 = 0.15;

// Turbo multiplies longitudinal speed per reference frame; slow cars get the
// biggest kick
pub const TURBO_BANDS: [(f64, f64); 2] = [(2.0, 1.06), (4.0, 1.03)];
pub const TURBO_TOP_BOOST: f64 = 1.015;
pub const MAX_TURBO_CHARGE: f64 = 100.0;

// Turn rate bands: proportional to speed below the low band, then a gentle
// ramp, then flat
pub const STEER_LOW_BAND: f64 = 1.0;
pub const STEER_HIGH_BAND: f64 = 3.0;
pub const STEER_MID_SLOPE: f64 = 0.25;
pub const STEER_TOP_FACTOR: f64 = 1.5;

// below this the car is considered stopped
pub const REST_SPEED: f64 = 0.01;

// Pick the value of the first band whose upper bound exceeds `speed`.
pub fn banded(speed: f64, bands: &[(f64, f64)], top: f64) -> f64 {
    bands
        .iter()
        .find(|(upper, _)| speed < *upper)
        .map(|(_, value)| *value)
        .unwrap_or(top)
}
