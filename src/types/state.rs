//! Behavior state definitions

use serde::{Deserialize, Serialize};

/// The four top-level behavior states of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BehaviorState {
    /// Resting, breathing animation only
    Idle,
    /// Attending to the user, antennas frozen
    Listening,
    /// Processing, thinking animation
    Thinking,
    /// Producing speech, sway layered on top of the idle animation
    Speaking,
}

impl BehaviorState {
    /// Animation requested when this state is committed.
    ///
    /// Speaking reuses the idle animation; the audible motion difference
    /// comes from the sway analyzer layered on top.
    pub fn default_animation(&self) -> &'static str {
        match self {
            BehaviorState::Idle => "idle_breathe",
            BehaviorState::Listening => "listen_perk",
            BehaviorState::Thinking => "think_tilt",
            BehaviorState::Speaking => "idle_breathe",
        }
    }

    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            BehaviorState::Idle => "\x1b[90m",      // Gray
            BehaviorState::Listening => "\x1b[36m", // Cyan
            BehaviorState::Thinking => "\x1b[33m",  // Yellow
            BehaviorState::Speaking => "\x1b[32m",  // Green
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }
}

impl std::fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BehaviorState::Idle => "IDLE",
            BehaviorState::Listening => "LISTENING",
            BehaviorState::Thinking => "THINKING",
            BehaviorState::Speaking => "SPEAKING",
        };
        write!(f, "{}", name)
    }
}
