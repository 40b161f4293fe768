//! Type definitions for Nod-0

pub mod animation;
pub mod error;
pub mod offsets;
pub mod output;
pub mod pose;
pub mod state;

pub use animation::{AnimationDefinition, AnimationLibrary, AntennaMode, AxisParams};
pub use error::EngineError;
pub use offsets::{ChannelOffsets, SwayFrame};
pub use output::{ActuatorCommand, ActuatorSink, NullSink, StateUpdate};
pub use pose::Pose;
pub use state::BehaviorState;
