//! Core modules for Nod-0

pub mod easing;
pub mod oscillator;
pub mod antenna;
pub mod face;
pub mod sway;
pub mod doa;
pub mod framerate;
pub mod prefs;
pub mod engine;
pub mod api;

pub use oscillator::AnimationPlayer;
pub use antenna::AntennaFreeze;
pub use face::FaceTracker;
pub use sway::SpeechSway;
pub use doa::{DoaTracker, TurnCommand};
pub use framerate::FrameRateManager;
pub use prefs::{Preferences, load_preferences, save_preferences};
pub use engine::BehaviorEngine;
pub use api::{create_router, run_server};
