//! Behavior State Machine + Pose Composer
//!
//! The top-level orchestrator: commits behavior-state transitions at tick
//! boundaries, merges every offset source into one pose + antenna + body-yaw
//! command per tick, and owns the suspend/resume lifecycle.
//!
//! Producer threads write through the thread-safe setters; every lock here
//! is short-held and never crosses an await or any I/O.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::broadcast;

use crate::core::antenna::AntennaFreeze;
use crate::core::easing::wrap_pi;
use crate::core::doa::{DoaTracker, TurnCommand};
use crate::core::face::FaceTracker;
use crate::core::framerate::FrameRateManager;
use crate::core::oscillator::AnimationPlayer;
use crate::core::prefs::Preferences;
use crate::core::sway::SpeechSway;
use crate::types::{
    ActuatorCommand, ActuatorSink, AnimationLibrary, BehaviorState, Pose, StateUpdate,
};
use crate::{
    BODY_YAW_DEADBAND_RAD, BODY_YAW_LIMIT_RAD, BODY_YAW_RATE_RAD_PER_SEC, CONTROL_TICK_MS,
    SUPPRESSION_RATE_PER_SEC,
};

type TurnCallback = Arc<dyn Fn(TurnCommand) + Send + Sync>;

/// State owned by the control tick (never touched by producers)
#[derive(Debug)]
struct TickState {
    /// Animation-suppression blend: 1 = full animation, 0 = face tracked
    suppression: f64,
    body_yaw: f64,
    last_antennas: (f64, f64),
    last_tick: Option<Instant>,
}

struct Inner {
    state: Mutex<BehaviorState>,
    pending_state: Mutex<Option<BehaviorState>>,
    player: Mutex<AnimationPlayer>,
    antenna: Mutex<AntennaFreeze>,
    face: Mutex<FaceTracker>,
    sway: Mutex<SpeechSway>,
    doa: Mutex<DoaTracker>,
    target_pose: Mutex<Pose>,
    turn_callback: Mutex<Option<TurnCallback>>,
    prefs: Mutex<Preferences>,
    framerate: Mutex<FrameRateManager>,
    tick: Mutex<TickState>,
    last_command: Mutex<ActuatorCommand>,
    suspended: AtomicBool,
    update_tx: broadcast::Sender<StateUpdate>,
}

/// The behavior engine. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct BehaviorEngine {
    inner: Arc<Inner>,
}

impl BehaviorEngine {
    pub fn new(library: AnimationLibrary) -> Self {
        Self::with_seed(library, rand::random())
    }

    /// Deterministic constructor for tests
    pub fn with_seed(library: AnimationLibrary, seed: u64) -> Self {
        let now = Instant::now();
        let (update_tx, _) = broadcast::channel(100);
        let mut player = AnimationPlayer::with_seed(library, now, seed);
        // Idle is the initial state; its animation starts without a transition
        // request from the outside
        if let Err(e) = player.set_animation(Some(BehaviorState::Idle.default_animation()), now) {
            eprintln!("warning: {}", e);
        }
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(BehaviorState::Idle),
                pending_state: Mutex::new(None),
                player: Mutex::new(player),
                antenna: Mutex::new(AntennaFreeze::new()),
                face: Mutex::new(FaceTracker::new()),
                sway: Mutex::new(SpeechSway::with_seed(seed.wrapping_add(1))),
                doa: Mutex::new(DoaTracker::new()),
                target_pose: Mutex::new(Pose::identity()),
                turn_callback: Mutex::new(None),
                prefs: Mutex::new(Preferences::default()),
                framerate: Mutex::new(FrameRateManager::new()),
                tick: Mutex::new(TickState {
                    suppression: 1.0,
                    body_yaw: 0.0,
                    last_antennas: (0.0, 0.0),
                    last_tick: None,
                }),
                last_command: Mutex::new(ActuatorCommand::neutral()),
                suspended: AtomicBool::new(false),
                update_tx,
            }),
        }
    }

    // =========================================================================
    // PRODUCER API (thread-safe, fire-and-forget)
    // =========================================================================

    /// Wake word heard: attend to the user
    pub fn on_wakeup(&self) {
        self.request_state(BehaviorState::Listening);
    }

    pub fn on_listening_start(&self) {
        self.request_state(BehaviorState::Listening);
    }

    pub fn on_thinking_start(&self) {
        self.request_state(BehaviorState::Thinking);
    }

    pub fn on_speaking_start(&self) {
        self.request_state(BehaviorState::Speaking);
    }

    /// Speech finished: back to attending
    pub fn on_speaking_stop(&self) {
        self.request_state(BehaviorState::Listening);
    }

    pub fn on_idle(&self) {
        self.request_state(BehaviorState::Idle);
    }

    fn request_state(&self, state: BehaviorState) {
        *self.inner.pending_state.lock().unwrap() = Some(state);
    }

    /// Stream PCM audio into the sway analyzer
    pub fn feed_audio(&self, samples: &[f32], sample_rate: u32) {
        self.inner.sway.lock().unwrap().feed(samples, sample_rate);
    }

    /// Vision producer: a face was detected at `now`
    pub fn on_face_detected_at(&self, now: Instant) {
        self.inner.face.lock().unwrap().on_face_detected(now);
    }

    pub fn on_face_detected(&self) {
        self.on_face_detected_at(Instant::now());
    }

    /// Vision producer: raw tracking offsets (translation, rotation)
    pub fn update_face_offsets(&self, translation: [f64; 3], rotation: [f64; 3]) {
        self.inner
            .face
            .lock()
            .unwrap()
            .update_offsets(translation, rotation);
    }

    /// Sound-localization producer: evaluate a (angle, energy) estimate.
    /// Returns the triggered turn, if any (the callback is invoked too).
    pub fn on_sound_event_at(&self, angle_deg: f64, energy: f64, now: Instant) -> Option<TurnCommand> {
        if !self.inner.prefs.lock().unwrap().direction_tracking {
            return None;
        }
        let face_detected = self.inner.face.lock().unwrap().is_face_detected(now);
        let in_conversation = *self.inner.state.lock().unwrap() != BehaviorState::Idle;
        let turn = self.inner.doa.lock().unwrap().update(
            angle_deg,
            energy,
            now,
            face_detected,
            in_conversation,
        );
        if let Some(turn) = turn {
            // Clone the hook out so the callback runs without the lock;
            // callbacks do I/O and may reconfigure the engine
            let callback = self.inner.turn_callback.lock().unwrap().clone();
            if let Some(callback) = callback {
                callback(turn);
            }
        }
        turn
    }

    pub fn on_sound_event(&self, angle_deg: f64, energy: f64) -> Option<TurnCommand> {
        self.on_sound_event_at(angle_deg, energy, Instant::now())
    }

    /// Remote command: set the commanded target pose
    pub fn set_target_pose(&self, pose: Pose) {
        *self.inner.target_pose.lock().unwrap() = pose;
    }

    pub fn set_turn_callback<F>(&self, callback: F)
    where
        F: Fn(TurnCommand) + Send + Sync + 'static,
    {
        *self.inner.turn_callback.lock().unwrap() = Some(Arc::new(callback));
    }

    pub fn set_preferences(&self, prefs: Preferences) {
        *self.inner.prefs.lock().unwrap() = prefs;
    }

    pub fn preferences(&self) -> Preferences {
        *self.inner.prefs.lock().unwrap()
    }

    // =========================================================================
    // OBSERVERS
    // =========================================================================

    pub fn state(&self) -> BehaviorState {
        *self.inner.state.lock().unwrap()
    }

    pub fn current_animation(&self) -> Option<String> {
        self.inner
            .player
            .lock()
            .unwrap()
            .current_animation()
            .map(str::to_string)
    }

    pub fn is_face_detected(&self) -> bool {
        self.inner
            .face
            .lock()
            .unwrap()
            .is_face_detected(Instant::now())
    }

    pub fn is_suspended(&self) -> bool {
        self.inner.suspended.load(Ordering::SeqCst)
    }

    /// Target rate hint for the external perception loop
    pub fn perception_rate_hz(&self) -> f64 {
        self.inner.framerate.lock().unwrap().rate_hz()
    }

    /// Last composed command (neutral before the first tick)
    pub fn last_command(&self) -> ActuatorCommand {
        *self.inner.last_command.lock().unwrap()
    }

    /// Subscribe to committed state changes
    pub fn subscribe(&self) -> broadcast::Receiver<StateUpdate> {
        self.inner.update_tx.subscribe()
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Stop issuing ticks at the next tick boundary.
    /// Suspending twice is a warned no-op.
    pub fn suspend(&self) {
        if self.inner.suspended.swap(true, Ordering::SeqCst) {
            eprintln!("warning: suspend called on a suspended engine");
        }
    }

    /// Restart ticking from a clean Idle state with fresh session phases.
    /// Resuming a running engine is a warned no-op.
    pub fn resume(&self) {
        if !self.inner.suspended.swap(false, Ordering::SeqCst) {
            eprintln!("warning: resume called on a running engine");
            return;
        }
        self.inner.face.lock().unwrap().reset();
        self.inner.sway.lock().unwrap().reset(false);
        self.inner.doa.lock().unwrap().reset();
        self.inner.tick.lock().unwrap().last_tick = None;
        *self.inner.pending_state.lock().unwrap() = Some(BehaviorState::Idle);
    }

    // =========================================================================
    // CONTROL TICK
    // =========================================================================

    /// Run one control tick at `now`. Returns None while suspended.
    pub fn tick_once(&self, now: Instant) -> Option<ActuatorCommand> {
        if self.inner.suspended.load(Ordering::SeqCst) {
            return None;
        }

        let dt = {
            let mut tick = self.inner.tick.lock().unwrap();
            let dt = tick
                .last_tick
                .map(|last| now.saturating_duration_since(last).as_secs_f64())
                .unwrap_or(CONTROL_TICK_MS as f64 / 1000.0);
            tick.last_tick = Some(now);
            dt
        };

        let state_changed = self.commit_pending(now);
        let state = self.state();

        // Face tracking: advance loss handling, read the offset pose
        let (face_detected, face_pose) = {
            let mut face = self.inner.face.lock().unwrap();
            let detected = face.is_face_detected(now);
            if !detected {
                face.process_face_lost(now);
            }
            (detected, face.offset_pose_at(now))
        };

        // Suppression blend: fade animation out while a face is tracked
        let suppression = {
            let mut tick = self.inner.tick.lock().unwrap();
            let target = if face_detected { 0.0 } else { 1.0 };
            let step = (target - tick.suppression).clamp(
                -SUPPRESSION_RATE_PER_SEC * dt,
                SUPPRESSION_RATE_PER_SEC * dt,
            );
            tick.suppression += step;
            tick.suppression
        };

        let animation = self
            .inner
            .player
            .lock()
            .unwrap()
            .offsets_at(now)
            .scale(suppression);

        let sway_frame = self.inner.sway.lock().unwrap().latest_frame();
        let sway = if state == BehaviorState::Speaking {
            sway_frame.offsets
        } else {
            [0.0; 6]
        };

        let target_pose = *self.inner.target_pose.lock().unwrap();

        // Compose: target ∘ face ∘ (animation + sway), re-orthonormalized
        let offsets_pose = Pose::from_euler(
            animation.roll + sway[2],
            animation.pitch + sway[0],
            animation.yaw + sway[1],
            [
                animation.x + sway[3],
                animation.y + sway[4],
                animation.z + sway[5],
            ],
        );
        let behavioral = face_pose.compose(&offsets_pose);
        let pose = target_pose.compose(&behavioral);

        // Body-yaw follow: dead band, rate limit, clamp to the joint range
        let body_yaw = {
            let mut tick = self.inner.tick.lock().unwrap();
            if self.inner.prefs.lock().unwrap().body_yaw_follow {
                let error = wrap_pi(pose.yaw() - tick.body_yaw);
                if error.abs() > BODY_YAW_DEADBAND_RAD {
                    let step = error.clamp(
                        -BODY_YAW_RATE_RAD_PER_SEC * dt,
                        BODY_YAW_RATE_RAD_PER_SEC * dt,
                    );
                    tick.body_yaw =
                        (tick.body_yaw + step).clamp(-BODY_YAW_LIMIT_RAD, BODY_YAW_LIMIT_RAD);
                }
            }
            tick.body_yaw
        };

        // Antennas: freeze blender over the animation's antenna channels
        let antennas = self.inner.antenna.lock().unwrap().blended_positions(
            animation.antenna_left,
            animation.antenna_right,
            now,
        );
        self.inner.tick.lock().unwrap().last_antennas = antennas;

        self.inner
            .framerate
            .lock()
            .unwrap()
            .update(face_detected, state != BehaviorState::Idle);

        let command = ActuatorCommand {
            pose,
            antennas,
            body_yaw,
        };
        *self.inner.last_command.lock().unwrap() = command;

        if state_changed {
            let update = StateUpdate {
                timestamp: Utc::now(),
                state,
                animation: self.current_animation(),
                face_tracked: face_detected,
                envelope: sway_frame.envelope,
                body_yaw,
            };
            let _ = self.inner.update_tx.send(update);
        }

        Some(command)
    }

    /// Commit a pending state transition; returns true when the state changed
    fn commit_pending(&self, now: Instant) -> bool {
        let pending = self.inner.pending_state.lock().unwrap().take();
        let next = match pending {
            Some(next) => next,
            None => return false,
        };

        let previous = {
            let mut state = self.inner.state.lock().unwrap();
            let previous = *state;
            *state = next;
            previous
        };
        if previous == next {
            return false;
        }

        if let Err(e) = self
            .inner
            .player
            .lock()
            .unwrap()
            .set_animation(Some(next.default_animation()), now)
        {
            eprintln!("warning: {}", e);
        }

        // Antennas freeze when attention starts, release on return to rest
        if previous == BehaviorState::Idle && next == BehaviorState::Listening {
            let captured = self.inner.tick.lock().unwrap().last_antennas;
            self.inner
                .antenna
                .lock()
                .unwrap()
                .freeze(captured.0, captured.1);
        }
        if next == BehaviorState::Idle {
            self.inner.antenna.lock().unwrap().start_unfreeze(now);
        }

        true
    }

    /// Run the fixed-rate control loop, applying each command to `sink`.
    ///
    /// The suspend flag is checked at the top of every iteration; no
    /// in-flight tick is aborted.
    pub fn spawn<S: ActuatorSink + 'static>(&self, mut sink: S) -> tokio::task::JoinHandle<()> {
        let engine = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(CONTROL_TICK_MS));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if let Some(command) = engine.tick_once(Instant::now()) {
                    sink.apply(&command);
                }
            }
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
