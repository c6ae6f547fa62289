//! Easing curves over `t` in `[0, 1]`.

use std::f32::consts::FRAC_PI_2;

pub fn quad_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

pub fn quad_out(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

pub fn sine_out(t: f32) -> f32 {
    (t * FRAC_PI_2).sin()
}
