//! Smoothing and interpolation primitives

use std::f64::consts::PI;

/// Cubic smooth-step blend `t²(3−2t)`, zero slope at both ends.
/// Input is clamped to [0, 1].
pub fn smooth_step(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Linear interpolation
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Wrap an angle to (−π, π]
pub fn wrap_pi(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a <= -PI {
        a += 2.0 * PI;
    }
    a
}

// =============================================================================
// TESTS
// =============================================================================
