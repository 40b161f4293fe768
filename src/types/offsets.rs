//! Channel offset vectors produced by the animation and sway layers

use serde::{Deserialize, Serialize};

/// The 8-channel output of the animation oscillator:
/// pitch/yaw/roll (radians), x/y/z (meters), antenna left/right (radians).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelOffsets {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub antenna_left: f64,
    pub antenna_right: f64,
}

impl ChannelOffsets {
    /// All channels zero
    pub const ZERO: ChannelOffsets = ChannelOffsets {
        pitch: 0.0,
        yaw: 0.0,
        roll: 0.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
        antenna_left: 0.0,
        antenna_right: 0.0,
    };

    /// Scale every channel by `k`
    pub fn scale(&self, k: f64) -> ChannelOffsets {
        ChannelOffsets {
            pitch: self.pitch * k,
            yaw: self.yaw * k,
            roll: self.roll * k,
            x: self.x * k,
            y: self.y * k,
            z: self.z * k,
            antenna_left: self.antenna_left * k,
            antenna_right: self.antenna_right * k,
        }
    }

    /// Channel values as an array (same order as the struct fields)
    pub fn as_array(&self) -> [f64; 8] {
        [
            self.pitch,
            self.yaw,
            self.roll,
            self.x,
            self.y,
            self.z,
            self.antenna_left,
            self.antenna_right,
        ]
    }

    /// Largest absolute channel value
    pub fn max_abs(&self) -> f64 {
        self.as_array().iter().fold(0.0, |m, v| m.max(v.abs()))
    }
}

/// One analyzed hop of speech sway: six pose channels plus the
/// loudness/envelope/activity values that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SwayFrame {
    /// Pose offsets (pitch, yaw, roll, x, y, z)
    pub offsets: [f64; 6],
    /// Normalized loudness in [0, 1]
    pub loudness: f64,
    /// Smoothed speech envelope in [0, 1]
    pub envelope: f64,
    /// Hysteretic voice-activity flag
    pub voice_active: bool,
}

impl SwayFrame {
    /// A silent frame (no offsets, no activity)
    pub fn silent() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale() {
        let offsets = ChannelOffsets {
            pitch: 1.0,
            yaw: -2.0,
            antenna_left: 0.5,
            ..ChannelOffsets::ZERO
        };
        let scaled = offsets.scale(0.5);
        assert_eq!(scaled.pitch, 0.5);
        assert_eq!(scaled.yaw, -1.0);
        assert_eq!(scaled.antenna_left, 0.25);
        assert_eq!(scaled.z, 0.0);
    }

    #[test]
    fn test_max_abs() {
        let offsets = ChannelOffsets {
            yaw: -3.0,
            x: 2.0,
            ..ChannelOffsets::ZERO
        };
        assert_eq!(offsets.max_abs(), 3.0);
    }
}
