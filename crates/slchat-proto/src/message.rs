//! Protocol frames.
//!
//! [`ClientMessage`] flows from a chat session to the server,
//! [`ServerMessage`] flows back. Both serialize as internally tagged JSON.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};

/// A request sent by a chat session to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Register the session under a display nickname.
    Join {
        /// Display name; not required to be unique.
        nickname: String,
    },
    /// Relay a line to every other participant.
    Chat {
        /// Nickname the relay is attributed to.
        nickname: String,
        /// Message text.
        body: String,
    },
    /// Depart the chat, broadcasting a farewell.
    Leave {
        /// Farewell text; empty when omitted.
        #[serde(default)]
        body: String,
    },
    /// Ask for the nicknames currently connected.
    List,
    /// Answer to a server keepalive probe.
    Pong {
        /// Token echoed from the matching [`ServerMessage::Ping`].
        token: String,
    },
}

impl ClientMessage {
    /// Build a `join` request.
    pub fn join(nickname: impl Into<String>) -> Self {
        Self::Join {
            nickname: nickname.into(),
        }
    }

    /// Build a `chat` request.
    pub fn chat(nickname: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Chat {
            nickname: nickname.into(),
            body: body.into(),
        }
    }

    /// Build a `leave` request.
    pub fn leave(body: impl Into<String>) -> Self {
        Self::Leave { body: body.into() }
    }

    /// Short static name of the frame, for logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Chat { .. } => "chat",
            Self::Leave { .. } => "leave",
            Self::List => "list",
            Self::Pong { .. } => "pong",
        }
    }

    /// Serialize to a single JSON line (without terminator).
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }
}

impl FromStr for ClientMessage {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        parse_frame(s)
    }
}

/// A frame sent by the server to a chat session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A relayed chat line or farewell.
    Chat {
        /// Nickname of the participant who spoke.
        nickname: String,
        /// Message text.
        body: String,
    },
    /// Answer to a `list` request.
    PeerList {
        /// Connected nicknames in join order.
        nicknames: Vec<String>,
    },
    /// Keepalive probe; the session must answer with `pong`.
    Ping {
        /// Opaque token to echo back.
        token: String,
    },
    /// Protocol error notice. Sent before the server closes on fatal errors.
    Error {
        /// Human-readable description.
        message: String,
    },
}

impl ServerMessage {
    /// Build a `chat` relay.
    pub fn chat(nickname: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Chat {
            nickname: nickname.into(),
            body: body.into(),
        }
    }

    /// Build an `error` notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Serialize to a single JSON line (without terminator).
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }
}

impl FromStr for ServerMessage {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        parse_frame(s)
    }
}

fn parse_frame<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T> {
    let line = s.trim_end_matches(['\r', '\n']);
    serde_json::from_str(line).map_err(|cause| ProtocolError::InvalidMessage {
        string: line.to_string(),
        cause,
    })
}
