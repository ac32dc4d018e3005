//! Error types for the chat protocol library.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Extract the `"type"` tag from a raw frame (for error reporting).
///
/// Works on frames that failed to deserialize, so the caller can still
/// say which request was malformed. Returns `None` when the line is not a
/// JSON object or carries no string `type` field.
pub fn extract_type_hint(raw_line: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw_line.trim()).ok()?;
    value.get("type")?.as_str().map(str::to_string)
}

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid UTF-8 bytes in a frame.
    #[error("invalid UTF-8 in frame at byte {byte_pos}: {details}")]
    InvalidUtf8 {
        /// Byte position where UTF-8 validation failed.
        byte_pos: usize,
        /// Detailed error message from the UTF-8 decoder.
        details: String,
    },

    /// Frame exceeded the maximum allowed length.
    #[error("frame too long: {actual} bytes (limit: {limit})")]
    MessageTooLong {
        /// Actual frame length.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// Illegal control character in a frame.
    #[error("illegal control character: {0:?}")]
    IllegalControlChar(char),

    /// A line could not be deserialized into a protocol frame.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The offending line, without its terminator.
        string: String,
        /// The underlying JSON error.
        #[source]
        cause: serde_json::Error,
    },

    /// A frame could not be serialized.
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),
}

impl ProtocolError {
    /// Whether the stream can keep being read after this error.
    ///
    /// Only an oversized line is recoverable: the codec has already
    /// discarded it and the next frame starts cleanly.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MessageTooLong { .. })
    }
}
