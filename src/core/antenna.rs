//! Antenna Freeze Controller
//!
//! Captures the antenna pair when entering a frozen mode and blends
//! smoothly back to the live target on release.
//!
//! Convention: index/field `left` is the robot's left antenna seen from
//! behind the head; positive angles sweep forward.

use std::time::Instant;

use crate::core::easing::lerp;
use crate::ANTENNA_BLEND_SECS;

#[derive(Debug, Clone, Copy, PartialEq)]
enum FreezeState {
    Unfrozen,
    /// Holding the captured pair
    Frozen { left: f64, right: f64 },
    /// Blending from the captured pair back to the live target
    Unfreezing {
        left: f64,
        right: f64,
        started: Instant,
    },
}

/// Freeze/unfreeze blender for the antenna pair
#[derive(Debug)]
pub struct AntennaFreeze {
    state: FreezeState,
}

impl Default for AntennaFreeze {
    fn default() -> Self {
        Self::new()
    }
}

impl AntennaFreeze {
    pub fn new() -> Self {
        Self {
            state: FreezeState::Unfrozen,
        }
    }

    /// Capture the current pair and hold it.
    /// Freezing while already frozen is a no-op (no re-capture).
    pub fn freeze(&mut self, current_left: f64, current_right: f64) {
        if matches!(self.state, FreezeState::Unfrozen) {
            self.state = FreezeState::Frozen {
                left: current_left,
                right: current_right,
            };
        }
    }

    /// Begin blending back to the live target
    pub fn start_unfreeze(&mut self, now: Instant) {
        if let FreezeState::Frozen { left, right } = self.state {
            self.state = FreezeState::Unfreezing {
                left,
                right,
                started: now,
            };
        }
    }

    pub fn is_frozen(&self) -> bool {
        !matches!(self.state, FreezeState::Unfrozen)
    }

    /// Blend progress in [0, 1]; 1 when unfrozen, 0 while holding
    pub fn blend_at(&self, now: Instant) -> f64 {
        match self.state {
            FreezeState::Unfrozen => 1.0,
            FreezeState::Frozen { .. } => 0.0,
            FreezeState::Unfreezing { started, .. } => {
                (now.saturating_duration_since(started).as_secs_f64() / ANTENNA_BLEND_SECS).min(1.0)
            }
        }
    }

    /// Blended antenna pair for the given live target.
    ///
    /// Returns the frozen pair while held, a linear mix during the
    /// unfreeze blend, and the raw target otherwise. Completes the
    /// unfreeze once the blend reaches 1.
    pub fn blended_positions(
        &mut self,
        target_left: f64,
        target_right: f64,
        now: Instant,
    ) -> (f64, f64) {
        match self.state {
            FreezeState::Unfrozen => (target_left, target_right),
            FreezeState::Frozen { left, right } => (left, right),
            FreezeState::Unfreezing { left, right, .. } => {
                let b = self.blend_at(now);
                if b >= 1.0 {
                    self.state = FreezeState::Unfrozen;
                    return (target_left, target_right);
                }
                (lerp(left, target_left, b), lerp(right, target_right, b))
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
