//! Types exchanged with the chat server task.

use super::monitor::WatchId;
use crate::state::{Handle, Outbox};
use tokio::sync::oneshot;

/// Events that can be sent to the chat server.
#[derive(Debug)]
pub enum ServerEvent {
    /// Session registering under a nickname.
    Join {
        handle: Handle,
        nickname: String,
        outbox: Outbox,
    },
    /// Session sending a line to everyone else.
    Chat {
        handle: Handle,
        nickname: String,
        body: String,
    },
    /// Session leaving with a farewell.
    Leave { handle: Handle, body: String },
    /// A liveness watch fired: the session's connection is gone.
    Departure { handle: Handle, watch: WatchId },
    /// Request the connected nicknames.
    List {
        reply_tx: oneshot::Sender<Vec<String>>,
    },
}

impl ServerEvent {
    /// Static event name for logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Chat { .. } => "chat",
            Self::Leave { .. } => "leave",
            Self::Departure { .. } => "departure",
            Self::List { .. } => "list",
        }
    }
}

/// Why a participant was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartureReason {
    /// The session sent `leave`.
    Explicit,
    /// The liveness monitor saw the connection drop.
    ConnectionLost,
}

impl DepartureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::ConnectionLost => "connection_lost",
        }
    }
}

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
    /// Recipients whose outbox accepted the message.
    pub delivered: usize,
    /// Recipients skipped because their outbox was full or closed.
    pub failed: usize,
}
