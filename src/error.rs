//! Unified error handling for slchatd.
//!
//! None of these errors cross the participant boundary: membership races and
//! per-recipient delivery failures are absorbed where they happen and only
//! show up in logs and metrics.

use crate::state::Handle;
use slchat_proto::ServerMessage;
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;

// ============================================================================
// Registry Errors
// ============================================================================

/// Registry operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The handle was never registered, or has already been removed.
    /// Callers treat this as a benign no-op.
    #[error("participant {0} not found")]
    NotFound(Handle),
}

// ============================================================================
// Fan-out Errors
// ============================================================================

/// A single recipient could not be handed a broadcast.
///
/// Fan-out never retries; the failure is logged and counted and the
/// remaining recipients are still served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendFailure {
    /// The recipient's outbox is full (slow reader).
    #[error("outbox full")]
    Full,

    /// The recipient's session is gone; its departure is already on the way.
    #[error("outbox closed")]
    Closed,
}

impl SendFailure {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Full => "outbox_full",
            Self::Closed => "outbox_closed",
        }
    }
}

impl From<TrySendError<ServerMessage>> for SendFailure {
    fn from(err: TrySendError<ServerMessage>) -> Self {
        match err {
            TrySendError::Full(_) => Self::Full,
            TrySendError::Closed(_) => Self::Closed,
        }
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// The chat server task has stopped and no longer accepts requests.
///
/// Only seen during shutdown; sessions end quietly when they hit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("chat server is not running")]
pub struct ServerGone;
