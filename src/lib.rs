//! Nod-0: real-time behavior and pose-composition engine
//!
//! Blends idle animations, speech sway, face tracking, sound-direction turns
//! and a commanded target pose into one actuator command stream at a fixed
//! control rate.

pub mod core;
pub mod types;

// =============================================================================
// CONTROL LOOP
// =============================================================================

/// Control tick period (milliseconds)
pub const CONTROL_TICK_MS: u64 = 10;

/// Global scale applied to every animation channel output
pub const AMPLITUDE_SCALE: f64 = 0.8;

// =============================================================================
// ANIMATION OSCILLATOR
// =============================================================================

/// Duration of the blend when switching animations (seconds)
pub const TRANSITION_DURATION_SECS: f64 = 1.0;

/// Duration of the interpolation-to-neutral after a commit (seconds)
pub const INTERP_DURATION_SECS: f64 = 1.0;

// =============================================================================
// ANTENNA FREEZE
// =============================================================================

/// Duration of the unfreeze blend back to target (seconds)
pub const ANTENNA_BLEND_SECS: f64 = 1.2;

// =============================================================================
// FACE TRACKING
// =============================================================================

/// Time a face must be absent before the return-to-neutral starts (seconds)
pub const FACE_DWELL_SECS: f64 = 1.0;

/// Duration of the rotation-aware return-to-neutral blend (seconds)
pub const FACE_RETURN_SECS: f64 = 2.0;

/// Gain applied to raw vision translation offsets
pub const TRACK_TRANSLATION_GAIN: f64 = 0.25;

/// Gain applied to raw vision rotation offsets
pub const TRACK_ROTATION_GAIN: f64 = 0.5;

/// Pitch bias compensating the sensor mounting offset (radians)
pub const TRACK_PITCH_BIAS_RAD: f64 = 0.06;

/// Yaw bias compensating the sensor mounting offset (radians)
pub const TRACK_YAW_BIAS_RAD: f64 = -0.02;

/// Slew rate of the animation-suppression blend (units per second)
pub const SUPPRESSION_RATE_PER_SEC: f64 = 2.0;

// =============================================================================
// SPEECH SWAY
// =============================================================================

/// Internal analysis sample rate (Hz)
pub const SWAY_SAMPLE_RATE: u32 = 16_000;

/// Hop interval between sway frames (seconds)
pub const SWAY_HOP_SECS: f64 = 0.05;

/// Voice activity turns on above this loudness (dBFS)
pub const VAD_ON_DB: f64 = -38.0;

/// Voice activity turns off below this loudness (dBFS)
pub const VAD_OFF_DB: f64 = -48.0;

/// Consecutive loud hops required to switch voice activity on
pub const VAD_ATTACK_FRAMES: u32 = 2;

/// Consecutive quiet hops required to switch voice activity off
pub const VAD_RELEASE_FRAMES: u32 = 12;

/// Per-hop convergence rate of the speech envelope toward its target
pub const ENVELOPE_RATE: f64 = 0.15;

/// Loudness normalization floor (dBFS)
pub const LOUDNESS_FLOOR_DB: f64 = -60.0;

/// Loudness normalization ceiling (dBFS)
pub const LOUDNESS_CEIL_DB: f64 = -10.0;

/// Gamma curve applied to normalized loudness
pub const LOUDNESS_GAMMA: f64 = 1.5;

/// Master gain on all six sway channels
pub const SWAY_MASTER_GAIN: f64 = 0.6;

/// Per-channel sway frequencies (pitch, yaw, roll, x, y, z) in Hz
pub const SWAY_FREQS_HZ: [f64; 6] = [0.9, 0.7, 1.1, 0.5, 0.6, 0.4];

/// Per-channel sway amplitudes (radians for rotations, meters for positions)
pub const SWAY_AMPLITUDES: [f64; 6] = [0.045, 0.06, 0.03, 0.004, 0.005, 0.003];

// =============================================================================
// DIRECTION OF ARRIVAL
// =============================================================================

/// Minimum sound energy for a turn to be considered
pub const DOA_ENERGY_THRESHOLD: f64 = 0.4;

/// Minimum angle delta from the last responded-to angle (degrees)
pub const DOA_ANGLE_DELTA_DEG: f64 = 20.0;

/// Minimum interval between any two turns (seconds)
pub const DOA_MIN_INTERVAL_SECS: f64 = 2.0;

/// Number of direction zones partitioning the full circle
pub const DOA_NUM_ZONES: usize = 8;

/// Per-zone cooldown after a triggered turn (seconds)
pub const DOA_ZONE_COOLDOWN_SECS: f64 = 6.0;

/// Maximum turn magnitude (degrees); larger angles are clamped
pub const DOA_MAX_TURN_DEG: f64 = 60.0;

/// Duration handed to the turn callback (seconds)
pub const DOA_TURN_DURATION_SECS: f64 = 0.8;

// =============================================================================
// BODY YAW
// =============================================================================

/// Safe body-yaw joint range, symmetric (radians)
pub const BODY_YAW_LIMIT_RAD: f64 = 1.2;

/// Dead band below which the body does not follow head yaw (radians)
pub const BODY_YAW_DEADBAND_RAD: f64 = 0.05;

/// Body-yaw follow rate limit (radians per second)
pub const BODY_YAW_RATE_RAD_PER_SEC: f64 = 1.5;

// =============================================================================
// PERCEPTION RATES
// =============================================================================

/// Perception rate while idle with no face (Hz)
pub const PERCEPTION_RATE_IDLE_HZ: f64 = 5.0;

/// Perception rate while a face is tracked (Hz)
pub const PERCEPTION_RATE_TRACKING_HZ: f64 = 15.0;

/// Perception rate during an active conversation (Hz)
pub const PERCEPTION_RATE_CONVERSATION_HZ: f64 = 30.0;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
