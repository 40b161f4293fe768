//! Animation Oscillator Engine
//!
//! Plays named periodic animations as time-varying 8-channel offsets.
//! Switching animations runs a two-phase transition: the outgoing motion
//! fades with a smooth-step, the commit regenerates the per-axis random
//! phases, and an interpolation sub-phase takes the captured output back
//! to neutral before steady oscillation begins.

use std::f64::consts::PI;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::core::easing::smooth_step;
use crate::types::{AnimationLibrary, ChannelOffsets, EngineError};
use crate::{AMPLITUDE_SCALE, INTERP_DURATION_SECS, TRANSITION_DURATION_SECS};

/// Oscillator state for the active animation.
///
/// Mutated only under the owning lock; `offsets_at` commits pending
/// transitions, so readers always observe a consistent snapshot.
#[derive(Debug)]
pub struct AnimationPlayer {
    library: AnimationLibrary,
    /// Committed animation (None = cleared, zero offsets)
    current: Option<String>,
    /// Transition target; equals `current` when no transition is pending
    target: Option<String>,
    /// Set while a transition is pending
    transition_start: Option<Instant>,
    /// Oscillation clock, reset at every commit
    phase_start: Instant,
    /// Interpolation-to-neutral: start time + captured channel values
    interp: Option<(Instant, ChannelOffsets)>,
    /// Per-axis random phases, regenerated at every commit
    phases: [f64; 6],
    antenna_phase: f64,
    /// Last emitted output, the capture source for interpolation
    last_output: ChannelOffsets,
    rng: SmallRng,
}

impl AnimationPlayer {
    pub fn new(library: AnimationLibrary, now: Instant) -> Self {
        Self::with_seed(library, now, rand::random())
    }

    /// Deterministic constructor for tests
    pub fn with_seed(library: AnimationLibrary, now: Instant, seed: u64) -> Self {
        Self {
            library,
            current: None,
            target: None,
            transition_start: None,
            phase_start: now,
            interp: None,
            phases: [0.0; 6],
            antenna_phase: 0.0,
            last_output: ChannelOffsets::ZERO,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Begin a transition to `name` (None clears the animation).
    ///
    /// Unknown names fail without changing state. Requesting the already
    /// pending/committed target is a no-op that reports success.
    pub fn set_animation(&mut self, name: Option<&str>, now: Instant) -> Result<(), EngineError> {
        if let Some(n) = name {
            if self.library.get(n).is_none() {
                return Err(EngineError::UnknownAnimation(n.to_string()));
            }
        }

        let requested = name.map(str::to_string);
        if requested == self.target {
            return Ok(());
        }

        self.target = requested;
        self.transition_start = Some(now);
        Ok(())
    }

    /// Committed animation name (None while cleared)
    pub fn current_animation(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Name the player is heading toward (equals current when settled)
    pub fn target_animation(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition_start.is_some()
    }

    pub fn library(&self) -> &AnimationLibrary {
        &self.library
    }

    /// Compute the 8-channel offsets at `now`.
    ///
    /// Callable at arbitrary frequency; idempotent between state changes.
    /// Commits a pending transition once its duration has elapsed.
    pub fn offsets_at(&mut self, now: Instant) -> ChannelOffsets {
        if let Some(started) = self.transition_start {
            let elapsed = now.saturating_duration_since(started).as_secs_f64();
            if elapsed >= TRANSITION_DURATION_SECS {
                self.commit(now);
            } else {
                // Outgoing motion fades with the smooth-step blend
                let fade = 1.0 - smooth_step(elapsed / TRANSITION_DURATION_SECS);
                let out = self.oscillate(now).scale(fade * AMPLITUDE_SCALE);
                self.last_output = out;
                return out;
            }
        }

        if let Some((started, captured)) = self.interp {
            let t = now.saturating_duration_since(started).as_secs_f64() / INTERP_DURATION_SECS;
            if t < 1.0 {
                // Captured channel values fade to neutral, channel by channel
                let out = captured.scale(1.0 - smooth_step(t));
                self.last_output = out;
                return out;
            }
            self.interp = None;
        }

        let out = self.oscillate(now).scale(AMPLITUDE_SCALE);
        self.last_output = out;
        out
    }

    /// Commit the pending transition: adopt the target, reset the
    /// oscillation clock, regenerate phases, capture the last output
    /// as the interpolation start values.
    fn commit(&mut self, now: Instant) {
        self.current = self.target.clone();
        self.transition_start = None;
        self.phase_start = now;
        self.interp = Some((now, self.last_output));
        for phase in self.phases.iter_mut() {
            *phase = self.rng.gen_range(0.0..(2.0 * PI));
        }
        self.antenna_phase = self.rng.gen_range(0.0..(2.0 * PI));
    }

    /// Raw oscillation of the committed animation (unscaled)
    fn oscillate(&self, now: Instant) -> ChannelOffsets {
        let def = match self.current.as_deref().and_then(|n| self.library.get(n)) {
            Some(def) => def,
            None => return ChannelOffsets::ZERO,
        };

        let elapsed = now.saturating_duration_since(self.phase_start).as_secs_f64();
        let axes = def.axes();
        let mut channels = [0.0; 6];
        for (i, axis) in axes.iter().enumerate() {
            let freq = def.axis_frequency(axis);
            channels[i] =
                axis.offset + axis.amplitude * (2.0 * PI * freq * elapsed + self.phases[i]).sin();
        }

        let antenna_freq = def.effective_antenna_frequency();
        let phase = 2.0 * PI * antenna_freq * elapsed + self.antenna_phase;
        let (left, right) = match def.antenna_mode {
            crate::types::AntennaMode::Synchronized => (phase.sin(), phase.sin()),
            crate::types::AntennaMode::Alternating => (phase.sin(), (phase + PI).sin()),
            crate::types::AntennaMode::QuarterPhase => (phase.sin(), (phase + PI / 2.0).sin()),
        };

        ChannelOffsets {
            pitch: channels[0],
            yaw: channels[1],
            roll: channels[2],
            x: channels[3],
            y: channels[4],
            z: channels[5],
            antenna_left: def.antenna_amplitude * left,
            antenna_right: def.antenna_amplitude * right,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn player(now: Instant) -> AnimationPlayer {
        AnimationPlayer::with_seed(AnimationLibrary::builtin(), now, 7)
    }

    fn settle(p: &mut AnimationPlayer, name: &str, now: Instant) -> Instant {
        p.set_animation(Some(name), now).unwrap();
        // Past transition, past interpolation
        let committed = now + Duration::from_secs_f64(TRANSITION_DURATION_SECS + 0.01);
        p.offsets_at(committed);
        let settled = committed + Duration::from_secs_f64(INTERP_DURATION_SECS + 0.01);
        p.offsets_at(settled);
        settled
    }

    #[test]
    fn test_empty_player_emits_zero() {
        let now = Instant::now();
        let mut p = AnimationPlayer::with_seed(AnimationLibrary::empty(), now, 1);
        assert_eq!(p.offsets_at(now), ChannelOffsets::ZERO);
    }

    #[test]
    fn test_unknown_animation_fails_without_state_change() {
        let now = Instant::now();
        let mut p = player(now);
        let err = p.set_animation(Some("nope"), now);
        assert_eq!(err, Err(EngineError::UnknownAnimation("nope".into())));
        assert!(!p.is_transitioning());
        assert_eq!(p.target_animation(), None);
    }

    #[test]
    fn test_same_target_is_noop() {
        let now = Instant::now();
        let mut p = player(now);
        let settled = settle(&mut p, "idle_breathe", now);

        let phases_before = p.phases;
        p.set_animation(Some("idle_breathe"), settled).unwrap();
        assert!(!p.is_transitioning());

        // No commit, no re-randomization
        p.offsets_at(settled + Duration::from_millis(100));
        assert_eq!(p.phases, phases_before);
    }

    #[test]
    fn test_commit_regenerates_phases() {
        let now = Instant::now();
        let mut p = player(now);
        let settled = settle(&mut p, "idle_breathe", now);
        let phases_before = p.phases;

        settle(&mut p, "think_tilt", settled);
        assert_ne!(p.phases, phases_before);
        assert_eq!(p.current_animation(), Some("think_tilt"));
    }

    #[test]
    fn test_offsets_bounded() {
        let now = Instant::now();
        let mut p = player(now);
        let settled = settle(&mut p, "think_tilt", now);

        let def = AnimationLibrary::builtin();
        let def = def.get("think_tilt").unwrap().clone();

        for i in 0..500 {
            let t = settled + Duration::from_millis(i * 37);
            let out = p.offsets_at(t);
            let axes = def.axes();
            let bounds = [
                axes[0], axes[1], axes[2], axes[3], axes[4], axes[5],
            ];
            let values = [out.pitch, out.yaw, out.roll, out.x, out.y, out.z];
            for (v, b) in values.iter().zip(bounds.iter()) {
                let limit = (b.offset.abs() + b.amplitude.abs()) * AMPLITUDE_SCALE + 1e-9;
                assert!(v.abs() <= limit, "channel {} out of bounds {}", v, limit);
            }
            let antenna_limit = def.antenna_amplitude * AMPLITUDE_SCALE + 1e-9;
            assert!(out.antenna_left.abs() <= antenna_limit);
            assert!(out.antenna_right.abs() <= antenna_limit);
        }
    }

    #[test]
    fn test_interpolation_monotonic_toward_zero() {
        let now = Instant::now();
        let mut p = player(now);
        let settled = settle(&mut p, "think_tilt", now);

        // Switch with no reads during the transition: the capture holds the
        // last emitted (nonzero) output and must fade monotonically.
        let out = p.offsets_at(settled + Duration::from_millis(400));
        assert!(out.max_abs() > 0.0);

        p.set_animation(None, settled + Duration::from_millis(500))
            .unwrap();
        let commit = settled
            + Duration::from_millis(500)
            + Duration::from_secs_f64(TRANSITION_DURATION_SECS + 0.001);
        p.offsets_at(commit);

        let mut prev = f64::INFINITY;
        for i in 1..10 {
            let t = commit + Duration::from_secs_f64(INTERP_DURATION_SECS * i as f64 / 10.0);
            let out = p.offsets_at(t);
            assert!(out.max_abs() <= prev + 1e-12);
            prev = out.max_abs();
        }

        // Cleared animation stays at zero after interpolation
        let after = commit + Duration::from_secs_f64(INTERP_DURATION_SECS + 0.5);
        assert_eq!(p.offsets_at(after), ChannelOffsets::ZERO);
    }

    #[test]
    fn test_alternating_antennas_oppose() {
        let now = Instant::now();
        let mut p = player(now);
        let settled = settle(&mut p, "listen_perk", now);

        for i in 0..50 {
            let out = p.offsets_at(settled + Duration::from_millis(i * 53));
            // Alternating mode: right is π out of phase with left
            assert!((out.antenna_left + out.antenna_right).abs() < 1e-9);
        }
    }

    #[test]
    fn test_transition_fades_outgoing_motion() {
        let now = Instant::now();
        let mut p = player(now);
        let settled = settle(&mut p, "think_tilt", now);

        p.set_animation(Some("idle_breathe"), settled).unwrap();
        assert!(p.is_transitioning());

        // Near the end of the transition the outgoing motion is mostly faded
        let near_end =
            settled + Duration::from_secs_f64(TRANSITION_DURATION_SECS * 0.99);
        let out = p.offsets_at(near_end);
        let def = AnimationLibrary::builtin();
        let roll = def.get("think_tilt").unwrap().roll;
        assert!(out.roll.abs() < (roll.offset.abs() + roll.amplitude.abs()) * 0.1);
    }
}
