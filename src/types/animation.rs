//! Declarative animation definitions
//!
//! Animations are loaded once at startup from a JSON document and are
//! immutable afterwards. Malformed entries are skipped with a warning;
//! an empty library is valid (the oscillator emits zero offsets).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::EngineError;

/// Per-axis oscillation parameters.
///
/// A frequency of 0 means "use the animation's base frequency".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisParams {
    /// Oscillation amplitude (radians or meters depending on the axis)
    #[serde(default)]
    pub amplitude: f64,
    /// Static offset added to the oscillation
    #[serde(default)]
    pub offset: f64,
    /// Axis frequency in Hz; 0 falls back to the base frequency
    #[serde(default)]
    pub frequency: f64,
}

/// How the two antennas couple to the antenna oscillation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AntennaMode {
    /// Both antennas move in phase
    Synchronized,
    /// Right antenna runs π out of phase
    Alternating,
    /// Right antenna runs a quarter period behind
    QuarterPhase,
}

impl Default for AntennaMode {
    fn default() -> Self {
        AntennaMode::Synchronized
    }
}

/// A named periodic animation: six pose axes plus the antenna channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationDefinition {
    pub name: String,
    /// Base frequency in Hz, used by any axis with frequency 0
    pub base_frequency: f64,
    #[serde(default)]
    pub pitch: AxisParams,
    #[serde(default)]
    pub yaw: AxisParams,
    #[serde(default)]
    pub roll: AxisParams,
    #[serde(default)]
    pub x: AxisParams,
    #[serde(default)]
    pub y: AxisParams,
    #[serde(default)]
    pub z: AxisParams,
    /// Antenna oscillation amplitude (radians)
    #[serde(default)]
    pub antenna_amplitude: f64,
    /// Antenna frequency in Hz; 0 falls back to the base frequency
    #[serde(default)]
    pub antenna_frequency: f64,
    #[serde(default)]
    pub antenna_mode: AntennaMode,
}

impl AnimationDefinition {
    /// The six pose axes in channel order (pitch, yaw, roll, x, y, z)
    pub fn axes(&self) -> [AxisParams; 6] {
        [self.pitch, self.yaw, self.roll, self.x, self.y, self.z]
    }

    /// Effective frequency for an axis (base frequency when 0)
    pub fn axis_frequency(&self, axis: &AxisParams) -> f64 {
        if axis.frequency > 0.0 {
            axis.frequency
        } else {
            self.base_frequency
        }
    }

    /// Effective antenna frequency (base frequency when 0)
    pub fn effective_antenna_frequency(&self) -> f64 {
        if self.antenna_frequency > 0.0 {
            self.antenna_frequency
        } else {
            self.base_frequency
        }
    }
}

/// Built-in animation set used when no definitions file is available
const BUILTIN_ANIMATIONS: &str = r#"[
  {
    "name": "idle_breathe",
    "base_frequency": 0.25,
    "pitch": { "amplitude": 0.02 },
    "z": { "amplitude": 0.002, "frequency": 0.25 },
    "antenna_amplitude": 0.05,
    "antenna_frequency": 0.2,
    "antenna_mode": "synchronized"
  },
  {
    "name": "listen_perk",
    "base_frequency": 0.5,
    "pitch": { "amplitude": 0.01, "offset": -0.05 },
    "antenna_amplitude": 0.12,
    "antenna_frequency": 0.8,
    "antenna_mode": "alternating"
  },
  {
    "name": "think_tilt",
    "base_frequency": 0.35,
    "roll": { "amplitude": 0.03, "offset": 0.08 },
    "yaw": { "amplitude": 0.04, "frequency": 0.2 },
    "antenna_amplitude": 0.08,
    "antenna_mode": "quarter_phase"
  }
]"#;

/// Immutable set of animation definitions keyed by name
#[derive(Debug, Clone, Default)]
pub struct AnimationLibrary {
    animations: HashMap<String, AnimationDefinition>,
}

impl AnimationLibrary {
    /// Empty library (valid: the oscillator emits zero offsets)
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in default set (idle breathe, listen perk, think tilt)
    pub fn builtin() -> Self {
        // The builtin document is a compile-time constant, parsing cannot fail
        Self::from_json_str(BUILTIN_ANIMATIONS).unwrap_or_default()
    }

    /// Parse a JSON array of definitions, skipping malformed entries
    /// with a warning. Fails only if the document itself is not an array.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let entries: Vec<serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| EngineError::Config(format!("animation document: {}", e)))?;

        let mut animations = HashMap::new();
        for entry in entries {
            match serde_json::from_value::<AnimationDefinition>(entry.clone()) {
                Ok(def) => {
                    animations.insert(def.name.clone(), def);
                }
                Err(e) => {
                    eprintln!("warning: skipping malformed animation entry: {}", e);
                }
            }
        }

        Ok(Self { animations })
    }

    /// Load definitions from a JSON file
    pub fn from_file(path: &str) -> Result<Self, EngineError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Io(format!("{}: {}", path, e)))?;
        Self::from_json_str(&json)
    }

    /// Look up a definition by name
    pub fn get(&self, name: &str) -> Option<&AnimationDefinition> {
        self.animations.get(name)
    }

    /// All animation names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.animations.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_set() {
        let lib = AnimationLibrary::builtin();
        assert_eq!(lib.len(), 3);
        assert!(lib.get("idle_breathe").is_some());
        assert!(lib.get("listen_perk").is_some());
        assert!(lib.get("think_tilt").is_some());
    }

    #[test]
    fn test_axis_frequency_fallback() {
        let lib = AnimationLibrary::builtin();
        let idle = lib.get("idle_breathe").unwrap();
        // pitch has no frequency of its own → base frequency
        assert_eq!(idle.axis_frequency(&idle.pitch), 0.25);
        // z sets its own
        assert_eq!(idle.axis_frequency(&idle.z), 0.25);
    }

    #[test]
    fn test_malformed_entry_skipped() {
        let json = r#"[
            { "name": "good", "base_frequency": 0.5 },
            { "base_frequency": "not a number" },
            { "name": "also_good", "base_frequency": 1.0, "antenna_mode": "alternating" }
        ]"#;
        let lib = AnimationLibrary::from_json_str(json).unwrap();
        assert_eq!(lib.len(), 2);
        assert!(lib.get("good").is_some());
        assert!(lib.get("also_good").is_some());
    }

    #[test]
    fn test_not_an_array_is_config_error() {
        let result = AnimationLibrary::from_json_str("{\"oops\": true}");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_library_is_valid() {
        let lib = AnimationLibrary::from_json_str("[]").unwrap();
        assert!(lib.is_empty());
    }
}
