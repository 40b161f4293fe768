//! Face-Tracking-Loss Interpolator
//!
//! Holds the last vision-driven offset while a face is present, then after
//! a dwell delay smoothly interpolates it back to neutral with a
//! rotation-aware blend.

use std::time::Instant;

use crate::types::Pose;
use crate::{
    FACE_DWELL_SECS, FACE_RETURN_SECS, TRACK_PITCH_BIAS_RAD, TRACK_ROTATION_GAIN,
    TRACK_TRANSLATION_GAIN, TRACK_YAW_BIAS_RAD,
};

/// Per-session face-tracking state
#[derive(Debug)]
pub struct FaceTracker {
    /// Live offset: translation (x, y, z) in meters
    translation: [f64; 3],
    /// Live offset: rotation (roll, pitch, yaw) in radians
    rotation: [f64; 3],
    last_detected: Option<Instant>,
    /// Snapshot taken when the return-to-neutral starts
    return_from: Option<(Instant, Pose)>,
}

impl Default for FaceTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceTracker {
    pub fn new() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: [0.0; 3],
            last_detected: None,
            return_from: None,
        }
    }

    /// A detection resets the lost timer and cancels any in-progress
    /// return-to-neutral.
    pub fn on_face_detected(&mut self, now: Instant) {
        self.last_detected = Some(now);
        self.return_from = None;
    }

    /// Store scaled raw tracking vectors as the live offset.
    ///
    /// Raw values are multiplied by fixed gains and the rotation gets the
    /// pitch/yaw bias compensating the sensor mounting offset.
    pub fn update_offsets(&mut self, translation: [f64; 3], rotation: [f64; 3]) {
        self.translation = [
            translation[0] * TRACK_TRANSLATION_GAIN,
            translation[1] * TRACK_TRANSLATION_GAIN,
            translation[2] * TRACK_TRANSLATION_GAIN,
        ];
        self.rotation = [
            rotation[0] * TRACK_ROTATION_GAIN,
            rotation[1] * TRACK_ROTATION_GAIN + TRACK_PITCH_BIAS_RAD,
            rotation[2] * TRACK_ROTATION_GAIN + TRACK_YAW_BIAS_RAD,
        ];
    }

    /// True while the last detection is within the dwell delay
    pub fn is_face_detected(&self, now: Instant) -> bool {
        match self.last_detected {
            Some(at) => now.saturating_duration_since(at).as_secs_f64() < FACE_DWELL_SECS,
            None => false,
        }
    }

    /// Advance the loss handling at `now`.
    ///
    /// Within the dwell delay this holds the last offset. After the delay
    /// the live offset is snapshotted as a pose and interpolated toward
    /// identity over the return duration; once the blend completes the
    /// session resets, ready to detect again.
    pub fn process_face_lost(&mut self, now: Instant) {
        let last = match self.last_detected {
            Some(at) => at,
            None => return,
        };
        if now.saturating_duration_since(last).as_secs_f64() < FACE_DWELL_SECS {
            return;
        }

        match self.return_from {
            None => {
                self.return_from = Some((now, self.live_pose()));
            }
            Some((started, _)) => {
                let t = now.saturating_duration_since(started).as_secs_f64() / FACE_RETURN_SECS;
                if t >= 1.0 {
                    self.reset();
                }
            }
        }
    }

    /// Current tracking offset as a pose: the live offset while detected
    /// or dwelling, the blended return pose while interpolating, identity
    /// after the session resets.
    pub fn offset_pose_at(&self, now: Instant) -> Pose {
        match self.return_from {
            Some((started, from)) => {
                let t = (now.saturating_duration_since(started).as_secs_f64() / FACE_RETURN_SECS)
                    .clamp(0.0, 1.0);
                from.blend(&Pose::identity(), t)
            }
            None => {
                if self.last_detected.is_some() {
                    self.live_pose()
                } else {
                    Pose::identity()
                }
            }
        }
    }

    /// Reset the session (tracking disabled or return complete)
    pub fn reset(&mut self) {
        self.translation = [0.0; 3];
        self.rotation = [0.0; 3];
        self.last_detected = None;
        self.return_from = None;
    }

    fn live_pose(&self) -> Pose {
        Pose::from_euler(
            self.rotation[0],
            self.rotation[1],
            self.rotation[2],
            self.translation,
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_no_detection_is_identity() {
        let tracker = FaceTracker::new();
        assert_eq!(tracker.offset_pose_at(Instant::now()), Pose::identity());
    }

    #[test]
    fn test_offsets_scaled_and_biased() {
        let mut tracker = FaceTracker::new();
        let now = Instant::now();
        tracker.on_face_detected(now);
        tracker.update_offsets([0.1, 0.0, 0.0], [0.0, 0.2, 0.0]);

        let pose = tracker.offset_pose_at(now);
        let (_, pitch, yaw) = pose.euler_angles();
        assert!((pose.translation[0] - 0.1 * TRACK_TRANSLATION_GAIN).abs() < 1e-9);
        assert!((pitch - (0.2 * TRACK_ROTATION_GAIN + TRACK_PITCH_BIAS_RAD)).abs() < 1e-9);
        assert!((yaw - TRACK_YAW_BIAS_RAD).abs() < 1e-9);
    }

    #[test]
    fn test_dwell_holds_last_offset() {
        let mut tracker = FaceTracker::new();
        let now = Instant::now();
        tracker.on_face_detected(now);
        tracker.update_offsets([0.2, 0.0, 0.0], [0.0; 3]);

        // Within the dwell delay nothing changes
        let inside = now + secs(FACE_DWELL_SECS * 0.5);
        tracker.process_face_lost(inside);
        let pose = tracker.offset_pose_at(inside);
        assert!((pose.translation[0] - 0.2 * TRACK_TRANSLATION_GAIN).abs() < 1e-9);
        assert!(tracker.is_face_detected(inside));
    }

    #[test]
    fn test_return_converges_to_identity() {
        let mut tracker = FaceTracker::new();
        let now = Instant::now();
        tracker.on_face_detected(now);
        tracker.update_offsets([0.3, 0.1, 0.0], [0.1, 0.2, -0.15]);

        let lost = now + secs(FACE_DWELL_SECS + 0.01);
        tracker.process_face_lost(lost);
        assert!(!tracker.is_face_detected(lost));

        // Midway: partially blended
        let mid = lost + secs(FACE_RETURN_SECS * 0.5);
        tracker.process_face_lost(mid);
        let pose = tracker.offset_pose_at(mid);
        assert!(pose.translation[0] > 0.0);
        assert!(pose.translation[0] < 0.3 * TRACK_TRANSLATION_GAIN);

        // Past the return duration: converged and session reset
        let done = lost + secs(FACE_RETURN_SECS + 0.05);
        tracker.process_face_lost(done);
        let pose = tracker.offset_pose_at(done);
        assert!(pose.translation.iter().all(|t| t.abs() < 1e-9));
        let (r, p, y) = pose.euler_angles();
        assert!(r.abs() < 1e-9 && p.abs() < 1e-9 && y.abs() < 1e-9);
    }

    #[test]
    fn test_redetection_cancels_return() {
        let mut tracker = FaceTracker::new();
        let now = Instant::now();
        tracker.on_face_detected(now);
        tracker.update_offsets([0.2, 0.0, 0.0], [0.0; 3]);

        let lost = now + secs(FACE_DWELL_SECS + 0.01);
        tracker.process_face_lost(lost);

        // Face comes back mid-return
        let back = lost + secs(FACE_RETURN_SECS * 0.3);
        tracker.on_face_detected(back);
        assert!(tracker.is_face_detected(back));

        let pose = tracker.offset_pose_at(back);
        assert!((pose.translation[0] - 0.2 * TRACK_TRANSLATION_GAIN).abs() < 1e-9);
    }

    #[test]
    fn test_process_lost_without_detection_is_noop() {
        let mut tracker = FaceTracker::new();
        tracker.process_face_lost(Instant::now());
        assert_eq!(tracker.offset_pose_at(Instant::now()), Pose::identity());
    }
}
