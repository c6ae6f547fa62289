use nalgebra::Vector3;

pub mod curve;
pub mod easing;

/// Ordered polyline in world space, head first.
pub type Polyline = Vec<Vector3<f32>>;

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
