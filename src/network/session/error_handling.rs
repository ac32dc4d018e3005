//! Classification of read errors for session management.

use slchat_proto::ProtocolError;
use slchat_proto::error::extract_type_hint;

/// Classification of transport read errors for appropriate handling.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum ReadErrorAction {
    /// Recoverable line-too-long error - send `error` and continue
    InputTooLong,
    /// Fatal protocol violation - send `error` and disconnect
    FatalProtocolError { error_msg: String },
    /// I/O error - connection is broken, just log and disconnect
    IoError,
}

/// Classify a read error into an actionable category.
pub(super) fn classify_read_error(e: &ProtocolError) -> ReadErrorAction {
    match e {
        ProtocolError::MessageTooLong { .. } => ReadErrorAction::InputTooLong,
        ProtocolError::IllegalControlChar(ch) => ReadErrorAction::FatalProtocolError {
            error_msg: format!("Illegal control character: {ch:?}"),
        },
        ProtocolError::InvalidMessage { string, cause } => {
            let error_msg = match extract_type_hint(string) {
                Some(kind) => format!("Malformed {kind} message: {cause}"),
                None => format!("Malformed message: {cause} (input: {string:?})"),
            };
            ReadErrorAction::FatalProtocolError { error_msg }
        }
        ProtocolError::InvalidUtf8 { details, .. } => ReadErrorAction::FatalProtocolError {
            error_msg: format!("Invalid UTF-8 in message: {details}"),
        },
        ProtocolError::Io(_) => ReadErrorAction::IoError,
        // Handle other variants that might be added in the future
        _ => ReadErrorAction::FatalProtocolError {
            error_msg: format!("Protocol error: {e}"),
        },
    }
}
