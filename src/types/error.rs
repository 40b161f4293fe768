//! Error taxonomy for the behavior engine
//!
//! Nothing in this subsystem is fatal to the process: configuration errors
//! skip the offending entry, transient producer errors mean "no new data
//! this tick", invariant violations are corrected in place, and lifecycle
//! misuse is a warned no-op.

/// Recoverable errors surfaced by the engine's fallible seams
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Animation lookup miss; no state was changed
    UnknownAnimation(String),
    /// Malformed configuration (animation document, preferences)
    Config(String),
    /// Filesystem failure while loading/saving declarative data
    Io(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::UnknownAnimation(name) => {
                write!(f, "unknown animation: {}", name)
            }
            EngineError::Config(msg) => write!(f, "config error: {}", msg),
            EngineError::Io(msg) => write!(f, "io error: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}
