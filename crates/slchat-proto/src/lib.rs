//! # slchat-proto
//!
//! Wire protocol for the slchat relay: the frames exchanged between a chat
//! session and the server, and the codecs that carry them over a byte stream.
//!
//! ## Framing
//!
//! Every frame is a single JSON object terminated by `\n`, internally tagged
//! by a `"type"` field:
//!
//! ```text
//! {"type":"join","nickname":"Alice"}
//! {"type":"chat","nickname":"Alice","body":"hi"}
//! {"type":"peer_list","nicknames":["Alice","Bob"]}
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use slchat_proto::{ClientMessage, ServerMessage};
//!
//! let join = ClientMessage::join("Alice");
//! assert_eq!(join.to_json().unwrap(), r#"{"type":"join","nickname":"Alice"}"#);
//!
//! let relay: ServerMessage = r#"{"type":"chat","nickname":"Bob","body":"hi"}"#.parse().unwrap();
//! assert_eq!(relay, ServerMessage::chat("Bob", "hi"));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod format;
pub mod message;

#[cfg(feature = "tokio")]
pub mod codec;
#[cfg(feature = "tokio")]
pub mod line;

pub use self::error::{ProtocolError, Result};
pub use self::message::{ClientMessage, ServerMessage};

#[cfg(feature = "tokio")]
pub use self::codec::{ClientCodec, JsonCodec, ServerCodec};
#[cfg(feature = "tokio")]
pub use self::line::{LineCodec, DEFAULT_MAX_LINE_LEN};
