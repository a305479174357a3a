use std::f32::consts::{PI, TAU};

use bevy::prelude::*;

/// Exponential smoothing weight for one frame, independent of frame rate.
pub fn smoothing_factor(dt: f32, rate: f32) -> f32 {
    1.0 - (-dt * rate).exp()
}

/// Wrap radians into `[-PI, PI)`.
pub fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Interpolate along the shorter arc. `t` is clamped, so one call never
/// travels more than half a turn.
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    from + wrap_angle(to - from) * t.clamp(0.0, 1.0)
}

/// Heading around world up, ignoring pitch and roll.
pub fn yaw_of(rotation: Quat) -> f32 {
    rotation.to_euler(EulerRot::YXZ).0
}
