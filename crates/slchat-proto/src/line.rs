//! Line-based codec for tokio.
//!
//! Reads and writes `\n`-terminated UTF-8 lines. An oversized line is
//! discarded up to its terminator and reported as a per-line error, so the
//! stream stays usable afterwards.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, ProtocolError};

/// Default maximum line length in bytes, terminator included.
pub const DEFAULT_MAX_LINE_LEN: usize = 4096;

/// Result of decoding a single line.
///
/// The outer `Result` of [`Decoder::decode`] carries stream-fatal errors;
/// this inner one carries errors confined to one line.
pub type Decoded<T> = std::result::Result<T, ProtocolError>;

/// Line-based codec that handles newline-terminated frames.
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
    /// Inside an oversized line, dropping bytes until the next newline
    discarding: bool,
    /// Bytes dropped so far for the current oversized line
    discarded: usize,
}

impl LineCodec {
    /// Create a codec with the default length limit.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LEN)
    }

    /// Create a codec with a custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
            discarded: 0,
        }
    }

    /// The configured maximum line length.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Validate that a string contains no illegal control characters.
    fn validate_line(s: &str) -> error::Result<()> {
        for ch in s.chars() {
            if crate::format::is_illegal_control_char(ch) {
                return Err(ProtocolError::IllegalControlChar(ch));
            }
        }
        Ok(())
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = Decoded<String>;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Decoded<String>>> {
        loop {
            let newline = src[self.next_index..]
                .iter()
                .position(|b| *b == b'\n')
                .map(|offset| self.next_index + offset);

            match (self.discarding, newline) {
                (true, Some(pos)) => {
                    // End of an oversized line: drop it and report once
                    src.advance(pos + 1);
                    let actual = self.discarded + pos + 1;
                    self.discarding = false;
                    self.discarded = 0;
                    self.next_index = 0;
                    return Ok(Some(Err(ProtocolError::MessageTooLong {
                        actual,
                        limit: self.max_len,
                    })));
                }
                (true, None) => {
                    self.discarded += src.len();
                    src.clear();
                    self.next_index = 0;
                    return Ok(None);
                }
                (false, Some(pos)) => {
                    let line = src.split_to(pos + 1);
                    self.next_index = 0;

                    if line.len() > self.max_len {
                        return Ok(Some(Err(ProtocolError::MessageTooLong {
                            actual: line.len(),
                            limit: self.max_len,
                        })));
                    }

                    let data = String::from_utf8(line.to_vec()).map_err(|e| {
                        ProtocolError::InvalidUtf8 {
                            byte_pos: e.utf8_error().valid_up_to(),
                            details: e.utf8_error().to_string(),
                        }
                    })?;
                    let data = data.trim_end_matches(['\r', '\n']).to_string();

                    Self::validate_line(&data)?;

                    return Ok(Some(Ok(data)));
                }
                (false, None) => {
                    if src.len() > self.max_len {
                        self.discarding = true;
                        continue;
                    }
                    // No complete line yet - remember where we stopped
                    self.next_index = src.len();
                    return Ok(None);
                }
            }
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> error::Result<()> {
        if msg.len() + 1 > self.max_len {
            return Err(ProtocolError::MessageTooLong {
                actual: msg.len() + 1,
                limit: self.max_len,
            });
        }
        dst.reserve(msg.len() + 1);
        dst.extend_from_slice(msg.as_bytes());
        if !msg.ends_with('\n') {
            dst.extend_from_slice(b"\n");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_complete_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("{\"type\":\"list\"}\r\n");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result.unwrap().unwrap(), "{\"type\":\"list\"}");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("{\"type\":");

        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"\"list\"}\n");
        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result.unwrap().unwrap(), "{\"type\":\"list\"}");
    }

    #[test]
    fn test_decode_too_long_then_recovers() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("this is way too long\nok\n");

        let result = codec.decode(&mut buf).unwrap().unwrap();
        assert!(matches!(
            result,
            Err(ProtocolError::MessageTooLong { actual: 21, limit: 10 })
        ));

        let next = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(next.unwrap(), "ok");
    }

    #[test]
    fn test_decode_too_long_across_reads() {
        let mut codec = LineCodec::with_max_len(8);
        let mut buf = BytesMut::from("0123456789");

        // Partial line already over the limit: dropped while waiting for '\n'
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());

        buf.extend_from_slice(b"abc\nnext\n");
        let result = codec.decode(&mut buf).unwrap().unwrap();
        assert!(matches!(
            result,
            Err(ProtocolError::MessageTooLong { actual: 14, .. })
        ));
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap().unwrap(), "next");
    }

    #[test]
    fn test_decode_rejects_control_char() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("bell\x07\n");

        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::IllegalControlChar('\x07'))
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"ab\xff\n"[..]);

        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::InvalidUtf8 { byte_pos: 2, .. })
        ));
    }

    #[test]
    fn test_encode_appends_newline() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();

        codec.encode("{\"type\":\"list\"}".to_string(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"{\"type\":\"list\"}\n");
    }
}
