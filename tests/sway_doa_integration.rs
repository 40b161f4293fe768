//! Integration tests for the audio-driven producers
//!
//! Speech sway and sound-direction turns working against the engine:
//! - Streaming speech raises the envelope, silence decays it
//! - Turns trigger from Idle only, with cooldowns
//! - Preferences gate direction tracking end to end

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use nod0::core::{BehaviorEngine, Preferences, SpeechSway};
use nod0::types::AnimationLibrary;
use nod0::{
    DOA_MIN_INTERVAL_SECS, DOA_ZONE_COOLDOWN_SECS, SWAY_HOP_SECS, SWAY_SAMPLE_RATE,
    VAD_RELEASE_FRAMES,
};

fn engine() -> BehaviorEngine {
    BehaviorEngine::with_seed(AnimationLibrary::builtin(), 23)
}

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

/// One hop of synthetic speech at the analysis rate
fn speech_hop() -> Vec<f32> {
    let len = (SWAY_HOP_SECS * SWAY_SAMPLE_RATE as f64) as usize;
    (0..len)
        .map(|i| {
            let t = i as f32 / SWAY_SAMPLE_RATE as f32;
            0.3 * (2.0 * std::f32::consts::PI * 210.0 * t).sin()
        })
        .collect()
}

fn silence_hop() -> Vec<f32> {
    let len = (SWAY_HOP_SECS * SWAY_SAMPLE_RATE as f64) as usize;
    vec![0.0; len]
}

// =============================================================================
// SCENARIO 1: Speech session through the analyzer
// =============================================================================

#[test]
fn test_speech_then_silence_full_envelope_cycle() {
    let mut sway = SpeechSway::with_seed(5);

    // Half a second of speech: VAD on, envelope rising
    let mut peak = 0.0f64;
    for _ in 0..10 {
        for frame in sway.feed(&speech_hop(), SWAY_SAMPLE_RATE) {
            peak = peak.max(frame.envelope);
            assert!(frame.loudness > 0.0);
        }
    }
    assert!(sway.voice_active());
    assert!(peak > 0.3);

    // Silence: VAD releases, envelope and channels decay to rest
    for _ in 0..VAD_RELEASE_FRAMES + 80 {
        sway.feed(&silence_hop(), SWAY_SAMPLE_RATE);
    }
    assert!(!sway.voice_active());
    assert!(sway.envelope() < 1e-3);
    assert!(sway.latest_frame().offsets.iter().all(|o| o.abs() < 1e-6));
}

#[test]
fn test_high_rate_capture_feeds_the_engine() {
    let engine = engine();

    // A 48 kHz capture pipeline streams odd-sized chunks
    let second: Vec<f32> = (0..48_000)
        .map(|i| 0.3 * (2.0 * std::f32::consts::PI * 210.0 * i as f32 / 48_000.0).sin())
        .collect();
    for chunk in second.chunks(1111) {
        engine.feed_audio(chunk, 48_000);
    }

    engine.on_speaking_start();
    let start = Instant::now();
    engine.tick_once(start);
    let cmd = engine.tick_once(start + secs(0.01)).unwrap();
    let (roll, pitch, yaw) = cmd.pose.euler_angles();
    assert!(
        roll.abs() + pitch.abs() + yaw.abs() > 0.0,
        "speech sway never reached the pose"
    );
}

// =============================================================================
// SCENARIO 2: Sound-direction turns from Idle
// =============================================================================

#[test]
fn test_turns_fire_from_idle_with_cooldowns() {
    let engine = engine();
    let hits = Arc::new(Mutex::new(Vec::new()));
    let sink = hits.clone();
    engine.set_turn_callback(move |turn| sink.lock().unwrap().push(turn.angle_deg));

    let now = Instant::now();
    assert!(engine.on_sound_event_at(30.0, 1.0, now).is_some());

    // Same zone, within cooldown: ignored
    let later = now + secs(DOA_MIN_INTERVAL_SECS + 0.5);
    assert!(engine.on_sound_event_at(40.0, 1.0, later).is_none());

    // Opposite side, different zone: fires and clamps
    assert!(engine.on_sound_event_at(150.0, 1.0, later).is_some());

    // First zone again after its cooldown
    let much_later = now + secs(DOA_ZONE_COOLDOWN_SECS + DOA_MIN_INTERVAL_SECS + 1.0);
    assert!(engine.on_sound_event_at(30.0, 1.0, much_later).is_some());

    let recorded = hits.lock().unwrap();
    assert_eq!(recorded.len(), 3);
    // The far angle was clamped to the turn range
    assert!(recorded[1] <= nod0::DOA_MAX_TURN_DEG);
}

#[test]
fn test_conversation_suppresses_turns() {
    let engine = engine();
    let now = Instant::now();

    engine.on_listening_start();
    engine.tick_once(now);
    assert!(engine.on_sound_event_at(90.0, 1.0, now).is_none());

    // Back to Idle: the same event triggers
    engine.on_idle();
    engine.tick_once(now + secs(0.01));
    assert!(engine
        .on_sound_event_at(90.0, 1.0, now + secs(0.02))
        .is_some());
}

// =============================================================================
// SCENARIO 3: Preferences gate the producers
// =============================================================================

#[test]
fn test_direction_tracking_preference() {
    let engine = engine();
    engine.set_preferences(Preferences {
        direction_tracking: false,
        body_yaw_follow: true,
    });
    assert!(engine.on_sound_event(45.0, 1.0).is_none());

    engine.set_preferences(Preferences::default());
    assert!(engine.on_sound_event(45.0, 1.0).is_some());
}

#[test]
fn test_body_yaw_follow_preference() {
    let engine = engine();
    engine.set_preferences(Preferences {
        direction_tracking: true,
        body_yaw_follow: false,
    });
    engine.set_target_pose(nod0::types::Pose::from_euler(0.0, 0.0, 1.0, [0.0; 3]));

    let start = Instant::now();
    let mut last = None;
    for i in 1..=300 {
        last = engine.tick_once(start + secs(i as f64 * 0.01));
    }
    // Head turns, body stays put
    let cmd = last.unwrap();
    assert!((cmd.pose.yaw() - 1.0).abs() < 0.05);
    assert_eq!(cmd.body_yaw, 0.0);
}
