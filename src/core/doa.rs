//! Direction-of-Arrival Tracker
//!
//! Decides when a sound-angle/energy estimate should trigger a discrete
//! body turn, rate-limited globally and per direction zone. Zones
//! partition [0°, 360°) without gaps or overlaps.

use std::collections::HashMap;
use std::time::Instant;

use crate::{
    DOA_ANGLE_DELTA_DEG, DOA_ENERGY_THRESHOLD, DOA_MAX_TURN_DEG, DOA_MIN_INTERVAL_SECS,
    DOA_NUM_ZONES, DOA_TURN_DURATION_SECS, DOA_ZONE_COOLDOWN_SECS,
};

/// A triggered turn: target angle (degrees, clamped) and motion duration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnCommand {
    pub angle_deg: f64,
    pub duration_secs: f64,
}

/// Zone-cooldown tracker for sound-direction turns
#[derive(Debug, Default)]
pub struct DoaTracker {
    last_angle: Option<f64>,
    last_turn: Option<Instant>,
    /// Direction zone → last trigger timestamp
    zone_cooldowns: HashMap<usize, Instant>,
}

impl DoaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate a (angle, energy) estimate at `now`.
    ///
    /// Angles arrive in any wrap and are normalized to signed degrees in
    /// (−180, 180]. Suppressed entirely while a face is detected or a
    /// conversation is active. Otherwise requires sufficient energy, a
    /// large enough angle delta from the last responded-to angle, the
    /// global minimum turn interval, and the angle's zone to be out of
    /// cooldown.
    pub fn update(
        &mut self,
        angle_deg: f64,
        energy: f64,
        now: Instant,
        face_detected: bool,
        in_conversation: bool,
    ) -> Option<TurnCommand> {
        let angle_deg = signed_angle(angle_deg);
        if face_detected || in_conversation {
            return None;
        }
        if energy < DOA_ENERGY_THRESHOLD {
            return None;
        }
        if let Some(last) = self.last_angle {
            if (angle_deg - last).abs() < DOA_ANGLE_DELTA_DEG {
                return None;
            }
        }
        if let Some(last) = self.last_turn {
            if now.saturating_duration_since(last).as_secs_f64() < DOA_MIN_INTERVAL_SECS {
                return None;
            }
        }

        let zone = zone_of(angle_deg);
        if let Some(last) = self.zone_cooldowns.get(&zone) {
            if now.saturating_duration_since(*last).as_secs_f64() < DOA_ZONE_COOLDOWN_SECS {
                return None;
            }
        }

        self.last_angle = Some(angle_deg);
        self.last_turn = Some(now);
        self.zone_cooldowns.insert(zone, now);

        Some(TurnCommand {
            angle_deg: angle_deg.clamp(-DOA_MAX_TURN_DEG, DOA_MAX_TURN_DEG),
            duration_secs: DOA_TURN_DURATION_SECS,
        })
    }

    /// Forget history (used on resume)
    pub fn reset(&mut self) {
        self.last_angle = None;
        self.last_turn = None;
        self.zone_cooldowns.clear();
    }
}

/// Normalize an angle to signed degrees in (−180, 180]
fn signed_angle(angle_deg: f64) -> f64 {
    let wrapped = angle_deg.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Map an angle to its direction zone index in [0, DOA_NUM_ZONES)
fn zone_of(angle_deg: f64) -> usize {
    let wrapped = angle_deg.rem_euclid(360.0);
    let width = 360.0 / DOA_NUM_ZONES as f64;
    ((wrapped / width) as usize).min(DOA_NUM_ZONES - 1)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_zones_partition_circle() {
        // Every angle lands in exactly one zone
        for deg in 0..360 {
            let zone = zone_of(deg as f64);
            assert!(zone < DOA_NUM_ZONES);
        }
        assert_eq!(zone_of(0.0), 0);
        assert_eq!(zone_of(359.9), DOA_NUM_ZONES - 1);
        // Negative angles wrap
        assert_eq!(zone_of(-10.0), zone_of(350.0));
    }

    #[test]
    fn test_low_energy_ignored() {
        let mut doa = DoaTracker::new();
        let now = Instant::now();
        assert!(doa
            .update(90.0, DOA_ENERGY_THRESHOLD / 2.0, now, false, false)
            .is_none());
    }

    #[test]
    fn test_suppressed_while_face_or_conversation() {
        let mut doa = DoaTracker::new();
        let now = Instant::now();
        assert!(doa.update(90.0, 1.0, now, true, false).is_none());
        assert!(doa.update(90.0, 1.0, now, false, true).is_none());
        // Same event with neither flag triggers
        assert!(doa.update(90.0, 1.0, now, false, false).is_some());
    }

    #[test]
    fn test_wrapped_angle_keeps_its_side() {
        // 350° is 10° to the left, not a hard right turn
        let mut doa = DoaTracker::new();
        let turn = doa
            .update(350.0, 1.0, Instant::now(), false, false)
            .unwrap();
        assert_eq!(turn.angle_deg, -10.0);

        // A far-left event clamps to the negative limit
        let mut doa = DoaTracker::new();
        let turn = doa
            .update(280.0, 1.0, Instant::now(), false, false)
            .unwrap();
        assert_eq!(turn.angle_deg, -DOA_MAX_TURN_DEG);
    }

    #[test]
    fn test_turn_angle_clamped() {
        let mut doa = DoaTracker::new();
        let turn = doa
            .update(170.0, 1.0, Instant::now(), false, false)
            .unwrap();
        assert_eq!(turn.angle_deg, DOA_MAX_TURN_DEG);
        assert_eq!(turn.duration_secs, DOA_TURN_DURATION_SECS);
    }

    #[test]
    fn test_same_zone_cooldown_single_trigger() {
        let mut doa = DoaTracker::new();
        let now = Instant::now();
        assert!(doa.update(10.0, 1.0, now, false, false).is_some());

        // Inside the zone cooldown, even after the global interval
        let later = now + Duration::from_secs_f64(DOA_MIN_INTERVAL_SECS + 0.5);
        assert!(doa.update(40.0, 1.0, later, false, false).is_none());
    }

    #[test]
    fn test_different_zones_both_trigger() {
        let mut doa = DoaTracker::new();
        let now = Instant::now();
        assert!(doa.update(10.0, 1.0, now, false, false).is_some());

        let later = now + Duration::from_secs_f64(DOA_MIN_INTERVAL_SECS + 0.5);
        // 120° away: different zone, sufficient delta, out of global interval
        assert!(doa.update(130.0, 1.0, later, false, false).is_some());
    }

    #[test]
    fn test_small_angle_delta_ignored() {
        let mut doa = DoaTracker::new();
        let now = Instant::now();
        assert!(doa.update(10.0, 1.0, now, false, false).is_some());

        let later = now + Duration::from_secs_f64(DOA_ZONE_COOLDOWN_SECS + 1.0);
        let nearby = 10.0 + DOA_ANGLE_DELTA_DEG / 2.0;
        assert!(doa.update(nearby, 1.0, later, false, false).is_none());
    }

    #[test]
    fn test_global_interval_enforced() {
        let mut doa = DoaTracker::new();
        let now = Instant::now();
        assert!(doa.update(10.0, 1.0, now, false, false).is_some());

        let soon = now + Duration::from_secs_f64(DOA_MIN_INTERVAL_SECS / 2.0);
        assert!(doa.update(130.0, 1.0, soon, false, false).is_none());
    }

    #[test]
    fn test_zone_reusable_after_cooldown() {
        let mut doa = DoaTracker::new();
        let now = Instant::now();
        assert!(doa.update(10.0, 1.0, now, false, false).is_some());

        let later = now + Duration::from_secs_f64(DOA_ZONE_COOLDOWN_SECS + 0.5);
        // Back toward the first zone from a different last angle
        assert!(doa.update(40.0, 1.0, later, false, false).is_some());
    }
}
