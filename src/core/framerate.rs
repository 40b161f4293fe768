//! Adaptive Frame-Rate Manager
//!
//! Picks the target rate for the external perception loop from the current
//! tracking state and conversation mode. The perception loop polls the
//! selected rate; this manager never schedules anything itself.

use std::time::Duration;

use crate::{PERCEPTION_RATE_CONVERSATION_HZ, PERCEPTION_RATE_IDLE_HZ, PERCEPTION_RATE_TRACKING_HZ};

/// Target perception rate selector
#[derive(Debug)]
pub struct FrameRateManager {
    current_hz: f64,
}

impl Default for FrameRateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRateManager {
    pub fn new() -> Self {
        Self {
            current_hz: PERCEPTION_RATE_IDLE_HZ,
        }
    }

    /// Recompute the target rate; returns true when it changed
    pub fn update(&mut self, face_tracked: bool, in_conversation: bool) -> bool {
        let next = if in_conversation {
            PERCEPTION_RATE_CONVERSATION_HZ
        } else if face_tracked {
            PERCEPTION_RATE_TRACKING_HZ
        } else {
            PERCEPTION_RATE_IDLE_HZ
        };
        let changed = (next - self.current_hz).abs() > f64::EPSILON;
        self.current_hz = next;
        changed
    }

    /// Current target rate in Hz
    pub fn rate_hz(&self) -> f64 {
        self.current_hz
    }

    /// Current target rate as a frame interval
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.current_hz)
    }
}

// =============================================================================
// TESTS
// =============================================================================
