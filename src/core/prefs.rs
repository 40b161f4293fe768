//! Persisted user preferences
//!
//! A small JSON document for toggles that survive restarts. Missing or
//! corrupt files yield defaults; saving failures are reported, never fatal.

use serde::{Deserialize, Serialize};

use crate::types::EngineError;

/// User-facing behavior toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// React to sound direction with body turns
    #[serde(default = "default_true")]
    pub direction_tracking: bool,
    /// Let the body yaw follow large head yaw
    #[serde(default = "default_true")]
    pub body_yaw_follow: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            direction_tracking: true,
            body_yaw_follow: true,
        }
    }
}

/// Load preferences, falling back to defaults when the file is missing
/// or malformed
pub fn load_preferences(path: &str) -> Preferences {
    match std::fs::read_to_string(path) {
        Ok(json) => match serde_json::from_str(&json) {
            Ok(prefs) => prefs,
            Err(e) => {
                eprintln!("warning: malformed preferences {}: {}", path, e);
                Preferences::default()
            }
        },
        Err(_) => Preferences::default(),
    }
}

/// Save preferences as pretty JSON
pub fn save_preferences(prefs: &Preferences, path: &str) -> Result<(), EngineError> {
    let json = serde_json::to_string_pretty(prefs)
        .map_err(|e| EngineError::Config(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| EngineError::Io(format!("{}: {}", path, e)))
}

// =============================================================================
// TESTS
// =============================================================================
