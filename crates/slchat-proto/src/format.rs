//! Character-level validation shared by the codecs.

/// Check whether a character must not appear in a frame.
///
/// Line delimiters and horizontal tab are allowed; every other control
/// character is rejected. JSON escapes (`\u0007`) are unaffected since
/// they are plain ASCII on the wire.
///
/// # Examples
///
/// ```
/// use slchat_proto::format::is_illegal_control_char;
///
/// assert!(is_illegal_control_char('\x07')); // BEL
/// assert!(is_illegal_control_char('\0'));
/// assert!(!is_illegal_control_char('\t'));
/// assert!(!is_illegal_control_char('\r'));
/// assert!(!is_illegal_control_char('\n'));
/// assert!(!is_illegal_control_char('a'));
/// ```
#[inline]
pub fn is_illegal_control_char(ch: char) -> bool {
    ch.is_control() && ch != '\r' && ch != '\n' && ch != '\t'
}
