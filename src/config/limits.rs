//! Connection and actor limits configuration.

use serde::Deserialize;

/// Limits applied to every session and to the chat server mailbox.
///
/// These bound memory per connection: a slow reader can only back up
/// `sendq` relays before further relays to it are dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum bytes in one inbound line, terminator included (default: 4096).
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    /// Per-session outbox capacity in messages (default: 64).
    #[serde(default = "default_sendq")]
    pub sendq: usize,
    /// Chat server mailbox capacity (default: 1024).
    /// Higher values provide burst tolerance when many sessions talk at once.
    #[serde(default = "default_mailbox")]
    pub mailbox: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_line_len: default_max_line_len(),
            sendq: default_sendq(),
            mailbox: default_mailbox(),
        }
    }
}

fn default_max_line_len() -> usize {
    slchat_proto::DEFAULT_MAX_LINE_LEN
}

fn default_sendq() -> usize {
    64
}

fn default_mailbox() -> usize {
    1024
}
