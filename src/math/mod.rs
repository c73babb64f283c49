pub mod transform;
pub mod vec2;

pub use transform::Transform;
pub use vec2::Vec2;

/// Shared tolerance for near-zero lengths, cross products and velocities.
pub const EPSILON: f64 = 1e-6;

/// Wraps an angle in radians to the range [-PI, PI].
pub fn wrap_angle(angle: f64) -> f64 {
    angle.sin().atan2(angle.cos())
}

/// Inclusive range check with `EPSILON` slack on both ends.
pub fn in_range(value: f64, min: f64, max: f64) -> bool {
    value >= min - EPSILON && value <= max + EPSILON
}
