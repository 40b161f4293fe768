//! Rigid-transform pose: 3×3 rotation + translation
//!
//! The rotation is kept orthonormal at all times; composition
//! re-orthonormalizes so repeated blending cannot drift.

use serde::{Deserialize, Serialize};

/// A rigid transform (rotation + translation) for the head actuator.
///
/// Translation is in meters, rotations follow the roll-pitch-yaw
/// (x-y-z intrinsic) convention in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Row-major 3×3 rotation matrix
    pub rotation: [[f64; 3]; 3],
    /// Translation vector (x, y, z) in meters
    pub translation: [f64; 3],
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    /// Identity pose (neutral orientation, zero translation)
    pub fn identity() -> Self {
        Self {
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            translation: [0.0, 0.0, 0.0],
        }
    }

    /// Build a pose from roll/pitch/yaw (radians) and a translation (meters)
    pub fn from_euler(roll: f64, pitch: f64, yaw: f64, translation: [f64; 3]) -> Self {
        let (sr, cr) = roll.sin_cos();
        let (sp, cp) = pitch.sin_cos();
        let (sy, cy) = yaw.sin_cos();

        // R = Rz(yaw) * Ry(pitch) * Rx(roll)
        let rotation = [
            [cy * cp, cy * sp * sr - sy * cr, cy * sp * cr + sy * sr],
            [sy * cp, sy * sp * sr + cy * cr, sy * sp * cr - cy * sr],
            [-sp, cp * sr, cp * cr],
        ];

        Self {
            rotation,
            translation,
        }
    }

    /// Extract (roll, pitch, yaw) in radians
    pub fn euler_angles(&self) -> (f64, f64, f64) {
        let r = &self.rotation;
        let sp = -r[2][0];
        let pitch = sp.clamp(-1.0, 1.0).asin();

        // Gimbal lock: |pitch| near π/2 collapses roll into yaw
        if sp.abs() > 0.999_999 {
            let roll = 0.0;
            let yaw = (-r[0][1]).atan2(r[1][1]);
            (roll, pitch, yaw)
        } else {
            let roll = r[2][1].atan2(r[2][2]);
            let yaw = r[1][0].atan2(r[0][0]);
            (roll, pitch, yaw)
        }
    }

    /// Yaw component in radians
    pub fn yaw(&self) -> f64 {
        self.euler_angles().2
    }

    /// Compose `self ∘ other` (apply `other` in this pose's frame),
    /// re-orthonormalizing the result.
    pub fn compose(&self, other: &Pose) -> Pose {
        let mut rotation = [[0.0; 3]; 3];
        for (i, row) in rotation.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.rotation[i][k] * other.rotation[k][j]).sum();
            }
        }

        let mut translation = [0.0; 3];
        for (i, t) in translation.iter_mut().enumerate() {
            *t = self.translation[i]
                + (0..3).map(|k| self.rotation[i][k] * other.translation[k]).sum::<f64>();
        }

        let mut pose = Pose {
            rotation,
            translation,
        };
        pose.orthonormalize();
        pose
    }

    /// Blend toward `other`: linear on translation, spherical on rotation.
    /// `t` is clamped to [0, 1].
    pub fn blend(&self, other: &Pose, t: f64) -> Pose {
        let t = t.clamp(0.0, 1.0);

        let translation = [
            self.translation[0] + (other.translation[0] - self.translation[0]) * t,
            self.translation[1] + (other.translation[1] - self.translation[1]) * t,
            self.translation[2] + (other.translation[2] - self.translation[2]) * t,
        ];

        let qa = Quat::from_matrix(&self.rotation);
        let qb = Quat::from_matrix(&other.rotation);
        let rotation = qa.slerp(&qb, t).to_matrix();

        let mut pose = Pose {
            rotation,
            translation,
        };
        pose.orthonormalize();
        pose
    }

    /// Re-orthonormalize the rotation in place (Gram-Schmidt on the columns)
    pub fn orthonormalize(&mut self) {
        let r = &mut self.rotation;
        let mut c0 = [r[0][0], r[1][0], r[2][0]];
        let mut c1 = [r[0][1], r[1][1], r[2][1]];

        normalize(&mut c0);
        let d = dot(&c1, &c0);
        for i in 0..3 {
            c1[i] -= d * c0[i];
        }
        normalize(&mut c1);
        let c2 = cross(&c0, &c1);

        for i in 0..3 {
            r[i][0] = c0[i];
            r[i][1] = c1[i];
            r[i][2] = c2[i];
        }
    }

    /// Maximum deviation of RᵀR from the identity, as an orthonormality check
    pub fn orthonormality_error(&self) -> f64 {
        let r = &self.rotation;
        let mut err: f64 = 0.0;
        for i in 0..3 {
            for j in 0..3 {
                let v: f64 = (0..3).map(|k| r[k][i] * r[k][j]).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                err = err.max((v - expected).abs());
            }
        }
        err
    }
}

fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalize(v: &mut [f64; 3]) {
    let len = dot(v, v).sqrt();
    if len > 1e-12 {
        for x in v.iter_mut() {
            *x /= len;
        }
    } else {
        *v = [1.0, 0.0, 0.0];
    }
}

/// Internal quaternion used for rotation blending
#[derive(Debug, Clone, Copy)]
struct Quat {
    w: f64,
    x: f64,
    y: f64,
    z: f64,
}

impl Quat {
    fn from_matrix(m: &[[f64; 3]; 3]) -> Self {
        let trace = m[0][0] + m[1][1] + m[2][2];
        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Quat {
                w: 0.25 * s,
                x: (m[2][1] - m[1][2]) / s,
                y: (m[0][2] - m[2][0]) / s,
                z: (m[1][0] - m[0][1]) / s,
            }
        } else if m[0][0] > m[1][1] && m[0][0] > m[2][2] {
            let s = (1.0 + m[0][0] - m[1][1] - m[2][2]).sqrt() * 2.0;
            Quat {
                w: (m[2][1] - m[1][2]) / s,
                x: 0.25 * s,
                y: (m[0][1] + m[1][0]) / s,
                z: (m[0][2] + m[2][0]) / s,
            }
        } else if m[1][1] > m[2][2] {
            let s = (1.0 + m[1][1] - m[0][0] - m[2][2]).sqrt() * 2.0;
            Quat {
                w: (m[0][2] - m[2][0]) / s,
                x: (m[0][1] + m[1][0]) / s,
                y: 0.25 * s,
                z: (m[1][2] + m[2][1]) / s,
            }
        } else {
            let s = (1.0 + m[2][2] - m[0][0] - m[1][1]).sqrt() * 2.0;
            Quat {
                w: (m[1][0] - m[0][1]) / s,
                x: (m[0][2] + m[2][0]) / s,
                y: (m[1][2] + m[2][1]) / s,
                z: 0.25 * s,
            }
        };
        q.normalized()
    }

    fn to_matrix(self) -> [[f64; 3]; 3] {
        let Quat { w, x, y, z } = self.normalized();
        [
            [
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y - z * w),
                2.0 * (x * z + y * w),
            ],
            [
                2.0 * (x * y + z * w),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z - x * w),
            ],
            [
                2.0 * (x * z - y * w),
                2.0 * (y * z + x * w),
                1.0 - 2.0 * (x * x + y * y),
            ],
        ]
    }

    fn normalized(self) -> Self {
        let len = (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt();
        if len < 1e-12 {
            return Quat {
                w: 1.0,
                x: 0.0,
                y: 0.0,
                z: 0.0,
            };
        }
        Quat {
            w: self.w / len,
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
        }
    }

    fn slerp(&self, other: &Quat, t: f64) -> Quat {
        let mut dot = self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z;

        // Take the short arc
        let other = if dot < 0.0 {
            dot = -dot;
            Quat {
                w: -other.w,
                x: -other.x,
                y: -other.y,
                z: -other.z,
            }
        } else {
            *other
        };

        if dot > 0.9995 {
            // Nearly parallel: linear blend is safe
            return Quat {
                w: self.w + (other.w - self.w) * t,
                x: self.x + (other.x - self.x) * t,
                y: self.y + (other.y - self.y) * t,
                z: self.z + (other.z - self.z) * t,
            }
            .normalized();
        }

        let theta_0 = dot.acos();
        let theta = theta_0 * t;
        let sin_theta = theta.sin();
        let sin_theta_0 = theta_0.sin();

        let s0 = (theta_0 - theta).sin() / sin_theta_0;
        let s1 = sin_theta / sin_theta_0;

        Quat {
            w: self.w * s0 + other.w * s1,
            x: self.x * s0 + other.x * s1,
            y: self.y * s0 + other.y * s1,
            z: self.z * s0 + other.z * s1,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_identity_euler() {
        let pose = Pose::identity();
        let (roll, pitch, yaw) = pose.euler_angles();
        assert!(roll.abs() < EPS);
        assert!(pitch.abs() < EPS);
        assert!(yaw.abs() < EPS);
    }

    #[test]
    fn test_euler_roundtrip() {
        let pose = Pose::from_euler(0.1, -0.2, 0.3, [0.01, 0.02, 0.03]);
        let (roll, pitch, yaw) = pose.euler_angles();
        assert!((roll - 0.1).abs() < 1e-9);
        assert!((pitch + 0.2).abs() < 1e-9);
        assert!((yaw - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_compose_identity_is_noop() {
        let pose = Pose::from_euler(0.2, 0.1, -0.3, [0.1, 0.0, 0.05]);
        let composed = pose.compose(&Pose::identity());
        let (r, p, y) = composed.euler_angles();
        let (r0, p0, y0) = pose.euler_angles();
        assert!((r - r0).abs() < 1e-9);
        assert!((p - p0).abs() < 1e-9);
        assert!((y - y0).abs() < 1e-9);
    }

    #[test]
    fn test_compose_stays_orthonormal() {
        let a = Pose::from_euler(0.4, 0.3, 0.2, [0.0; 3]);
        let b = Pose::from_euler(-0.1, 0.5, -0.4, [0.0; 3]);
        let mut pose = Pose::identity();
        for _ in 0..200 {
            pose = pose.compose(&a).compose(&b);
        }
        assert!(pose.orthonormality_error() < 1e-9);
    }

    #[test]
    fn test_blend_endpoints_exact() {
        let a = Pose::from_euler(0.1, 0.2, 0.3, [0.01, 0.0, 0.0]);
        let b = Pose::from_euler(-0.3, 0.1, -0.2, [0.0, 0.02, 0.0]);

        let at_zero = a.blend(&b, 0.0);
        let at_one = a.blend(&b, 1.0);

        assert!((at_zero.translation[0] - a.translation[0]).abs() < EPS);
        assert!((at_one.translation[1] - b.translation[1]).abs() < EPS);

        let (r, p, y) = at_one.euler_angles();
        let (rb, pb, yb) = b.euler_angles();
        assert!((r - rb).abs() < 1e-6);
        assert!((p - pb).abs() < 1e-6);
        assert!((y - yb).abs() < 1e-6);
    }

    #[test]
    fn test_blend_midpoint_yaw() {
        let a = Pose::identity();
        let b = Pose::from_euler(0.0, 0.0, 0.8, [0.0; 3]);
        let mid = a.blend(&b, 0.5);
        assert!((mid.yaw() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_blend_clamps_t() {
        let a = Pose::identity();
        let b = Pose::from_euler(0.0, 0.0, 0.5, [0.1, 0.0, 0.0]);
        let over = a.blend(&b, 2.0);
        assert!((over.yaw() - 0.5).abs() < 1e-6);
        assert!((over.translation[0] - 0.1).abs() < EPS);
    }
}
