pub mod control_input;
pub mod state;

use glam::DVec2;

// Wrap an angle in degrees into (-180, 180].
pub fn normalize_heading(degrees: f64) -> f64 {
    let mut wrapped = degrees % 360.0;
    if wrapped <= -180.0 {
        wrapped += 360.0;
    } else if wrapped > 180.0 {
        wrapped -= 360.0;
    }
    wrapped
}

// Unit vector pointing along `degrees`, measured counterclockwise from +x.
pub fn heading_vector(degrees: f64) -> DVec2 {
    let radians = degrees.to_radians();
    DVec2::new(radians.cos(), radians.sin())
}

// Unit vector 90 degrees counterclockwise of `heading_vector(degrees)`.
pub fn left_vector(degrees: f64) -> DVec2 {
    let radians = degrees.to_radians();
    DVec2::new(-radians.sin(), radians.cos())
}
