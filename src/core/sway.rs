//! Speech-Sway Analyzer
//!
//! Consumes streaming audio, computes short-time loudness with hysteretic
//! voice-activity detection, and drives six fixed-frequency sinusoids whose
//! amplitude tracks the speech envelope.

use std::f64::consts::PI;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::types::SwayFrame;
use crate::{
    ENVELOPE_RATE, LOUDNESS_CEIL_DB, LOUDNESS_FLOOR_DB, LOUDNESS_GAMMA, SWAY_AMPLITUDES,
    SWAY_FREQS_HZ, SWAY_HOP_SECS, SWAY_MASTER_GAIN, SWAY_SAMPLE_RATE, VAD_ATTACK_FRAMES,
    VAD_OFF_DB, VAD_ON_DB, VAD_RELEASE_FRAMES,
};

/// Streaming speech-sway analyzer.
///
/// Stateful across `feed` calls; restartable only via [`SpeechSway::reset`].
#[derive(Debug)]
pub struct SpeechSway {
    /// Buffered samples at the internal analysis rate
    buffer: Vec<f32>,
    hop_samples: usize,
    voice_active: bool,
    attack_count: u32,
    release_count: u32,
    envelope: f64,
    /// Monotonic phase clock in analysis samples
    phase_clock: u64,
    /// Six fixed random phases, generated once per session
    phases: [f64; 6],
    latest: SwayFrame,
    rng: SmallRng,
}

impl SpeechSway {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Deterministic constructor for tests
    pub fn with_seed(seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut phases = [0.0; 6];
        for phase in phases.iter_mut() {
            *phase = rng.gen_range(0.0..(2.0 * PI));
        }
        Self {
            buffer: Vec::new(),
            hop_samples: (SWAY_HOP_SECS * SWAY_SAMPLE_RATE as f64) as usize,
            voice_active: false,
            attack_count: 0,
            release_count: 0,
            envelope: 0.0,
            phase_clock: 0,
            phases,
            latest: SwayFrame::silent(),
            rng,
        }
    }

    /// Feed a chunk of PCM samples at any rate; emits one frame per
    /// elapsed hop interval as soon as enough samples are buffered.
    pub fn feed(&mut self, samples: &[f32], sample_rate: u32) -> Vec<SwayFrame> {
        if sample_rate == SWAY_SAMPLE_RATE {
            self.buffer.extend_from_slice(samples);
        } else {
            self.buffer
                .extend(resample_linear(samples, sample_rate, SWAY_SAMPLE_RATE));
        }

        let mut frames = Vec::new();
        while self.buffer.len() >= self.hop_samples {
            let hop: Vec<f32> = self.buffer.drain(..self.hop_samples).collect();
            let frame = self.process_hop(&hop);
            self.latest = frame;
            frames.push(frame);
        }
        frames
    }

    /// Most recent frame (silent before any audio)
    pub fn latest_frame(&self) -> SwayFrame {
        self.latest
    }

    pub fn envelope(&self) -> f64 {
        self.envelope
    }

    pub fn voice_active(&self) -> bool {
        self.voice_active
    }

    /// Clear buffered audio and VAD/envelope state.
    ///
    /// A fresh session (`preserve_phases = false`) re-seeds the six
    /// random channel phases.
    pub fn reset(&mut self, preserve_phases: bool) {
        self.buffer.clear();
        self.voice_active = false;
        self.attack_count = 0;
        self.release_count = 0;
        self.envelope = 0.0;
        self.phase_clock = 0;
        self.latest = SwayFrame::silent();
        if !preserve_phases {
            for phase in self.phases.iter_mut() {
                *phase = self.rng.gen_range(0.0..(2.0 * PI));
            }
        }
    }

    fn process_hop(&mut self, hop: &[f32]) -> SwayFrame {
        let rms = (hop.iter().map(|s| (*s as f64) * (*s as f64)).sum::<f64>()
            / hop.len().max(1) as f64)
            .sqrt();
        let db = 20.0 * rms.max(1e-10).log10();

        // Hysteretic voice activity with separate attack/release counters
        if db >= VAD_ON_DB {
            self.attack_count += 1;
            self.release_count = 0;
            if !self.voice_active && self.attack_count >= VAD_ATTACK_FRAMES {
                self.voice_active = true;
            }
        } else if db <= VAD_OFF_DB {
            self.release_count += 1;
            self.attack_count = 0;
            if self.voice_active && self.release_count >= VAD_RELEASE_FRAMES {
                self.voice_active = false;
            }
        } else {
            // Between thresholds: hold the current flag, restart counting
            self.attack_count = 0;
            self.release_count = 0;
        }

        let target = if self.voice_active { 1.0 } else { 0.0 };
        self.envelope += ENVELOPE_RATE * (target - self.envelope);

        let loudness = ((db - LOUDNESS_FLOOR_DB) / (LOUDNESS_CEIL_DB - LOUDNESS_FLOOR_DB))
            .clamp(0.0, 1.0)
            .powf(LOUDNESS_GAMMA);

        let t = self.phase_clock as f64 / SWAY_SAMPLE_RATE as f64;
        self.phase_clock += hop.len() as u64;

        let gain = loudness * self.envelope * SWAY_MASTER_GAIN;
        let mut offsets = [0.0; 6];
        for i in 0..6 {
            offsets[i] =
                SWAY_AMPLITUDES[i] * (2.0 * PI * SWAY_FREQS_HZ[i] * t + self.phases[i]).sin() * gain;
        }

        SwayFrame {
            offsets,
            loudness,
            envelope: self.envelope,
            voice_active: self.voice_active,
        }
    }
}

impl Default for SpeechSway {
    fn default() -> Self {
        Self::new()
    }
}

/// Chunk-local linear resampler to the internal analysis rate
fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }
    let out_len = ((samples.len() as u64 * to_rate as u64) / from_rate as u64) as usize;
    let mut out = Vec::with_capacity(out_len);
    let step = from_rate as f64 / to_rate as f64;
    for i in 0..out_len {
        let pos = i as f64 * step;
        let idx = pos as usize;
        let frac = pos - idx as f64;
        let a = samples[idx.min(samples.len() - 1)];
        let b = samples[(idx + 1).min(samples.len() - 1)];
        out.push(a + (b - a) * frac as f32);
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================
