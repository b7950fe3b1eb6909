//! Error types shared by the session, the bridge and the worker facade.

use thiserror::Error;

use crate::systems::dynamics::EngineError;

/// Caller contract violations. These are bugs on the calling side and are
/// reported immediately, never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreconditionViolation {
    #[error("physics world is not initialized")]
    NotInitialized,

    #[error("node index {index} out of range (cloth has {node_count} nodes)")]
    NodeOutOfRange { index: usize, node_count: usize },

    #[error("invalid time step: {0}")]
    InvalidTimeStep(f32),

    #[error("invalid cloth topology: {0}")]
    InvalidTopology(String),

    #[error("invalid obstacle: {0}")]
    InvalidObstacle(String),

    #[error("invalid material: {0}")]
    InvalidMaterial(String),

    #[error("non-finite position passed to {0}")]
    NonFinitePosition(&'static str),
}

/// Errors surfaced by session operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// The physics runtime could not be brought up. Fatal for the session.
    #[error("physics initialization failed: {0}")]
    Initialization(String),

    #[error(transparent)]
    Precondition(#[from] PreconditionViolation),

    /// The backend refused an operation the session believed valid.
    #[error("dynamics engine error: {0}")]
    Engine(#[from] EngineError),

    /// The isolated session context is gone (native host only).
    #[error("session worker is no longer running")]
    Disconnected,

    /// The session answered with a reply of the wrong kind.
    #[error("unexpected session reply: {0}")]
    UnexpectedReply(&'static str),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// A handle that could not be released during reset.
///
/// Logged and counted, never propagated: reset always finishes with an empty
/// registry.
#[derive(Debug, Clone, Error)]
#[error("failed to release {what}: {source}")]
pub struct ResourceCleanupError {
    pub what: String,
    #[source]
    pub source: EngineError,
}
