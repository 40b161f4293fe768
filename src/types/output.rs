//! Actuator command and telemetry structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{BehaviorState, Pose};

/// One composed command per control tick: head pose, antenna pair, body yaw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActuatorCommand {
    /// Final head pose (commanded target composed with behavioral offsets)
    pub pose: Pose,
    /// Antenna angles (left, right) in radians
    pub antennas: (f64, f64),
    /// Body yaw in radians, clamped to the safe joint range
    pub body_yaw: f64,
}

impl ActuatorCommand {
    /// Neutral command (identity pose, antennas at rest, body centered)
    pub fn neutral() -> Self {
        Self {
            pose: Pose::identity(),
            antennas: (0.0, 0.0),
            body_yaw: 0.0,
        }
    }
}

/// Sink invoked once per tick with the composed command.
///
/// The engine trusts the sink to apply the command; transport and servo
/// control live on the other side of this boundary.
pub trait ActuatorSink: Send {
    fn apply(&mut self, command: &ActuatorCommand);
}

/// Sink that drops every command (demo/testing default)
#[derive(Debug, Default)]
pub struct NullSink;

impl ActuatorSink for NullSink {
    fn apply(&mut self, _command: &ActuatorCommand) {}
}

/// Telemetry published on every committed behavior-state change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateUpdate {
    /// When the change was committed
    pub timestamp: DateTime<Utc>,
    /// New behavior state
    pub state: BehaviorState,
    /// Animation active after the commit (None = cleared)
    pub animation: Option<String>,
    /// Whether a face is currently tracked
    pub face_tracked: bool,
    /// Latest speech envelope value
    pub envelope: f64,
    /// Current body yaw (radians)
    pub body_yaw: f64,
}

impl StateUpdate {
    /// Format for parseable terminal output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "state={} | animation={} | face={} | envelope={:.2} | body_yaw={:.3}",
            self.state,
            self.animation.as_deref().unwrap_or("-"),
            self.face_tracked,
            self.envelope,
            self.body_yaw,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_command() {
        let cmd = ActuatorCommand::neutral();
        assert_eq!(cmd.antennas, (0.0, 0.0));
        assert_eq!(cmd.body_yaw, 0.0);
        assert_eq!(cmd.pose, Pose::identity());
    }

    #[test]
    fn test_update_serializes() {
        let update = StateUpdate {
            timestamp: Utc::now(),
            state: BehaviorState::Listening,
            animation: Some("listen_perk".into()),
            face_tracked: false,
            envelope: 0.0,
            body_yaw: 0.1,
        };
        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains("LISTENING"));
        assert!(json.contains("listen_perk"));
    }
}
