//! JSON frame codec for tokio.
//!
//! Wraps [`LineCodec`] and (de)serializes each line as one protocol frame.

use std::marker::PhantomData;

use bytes::BytesMut;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, ProtocolError};
use crate::line::{Decoded, LineCodec};
use crate::message::{ClientMessage, ServerMessage};

/// Tokio codec decoding frames of type `D` and encoding frames of type `E`.
///
/// Blank lines are skipped. A line that is too long or is not a valid `D`
/// is yielded as an inner `Err`; the stream itself only fails on I/O,
/// encoding, or control-character violations.
pub struct JsonCodec<D, E> {
    inner: LineCodec,
    _frames: PhantomData<fn(E) -> D>,
}

/// Codec used by the server: reads [`ClientMessage`], writes [`ServerMessage`].
pub type ServerCodec = JsonCodec<ClientMessage, ServerMessage>;

/// Codec used by a chat client: reads [`ServerMessage`], writes [`ClientMessage`].
pub type ClientCodec = JsonCodec<ServerMessage, ClientMessage>;

impl<D, E> JsonCodec<D, E> {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self::with_max_len(crate::line::DEFAULT_MAX_LINE_LEN)
    }

    /// Create a codec with a custom line limit.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            inner: LineCodec::with_max_len(max_len),
            _frames: PhantomData,
        }
    }
}

impl<D, E> Default for JsonCodec<D, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DeserializeOwned, E> Decoder for JsonCodec<D, E> {
    type Item = Decoded<D>;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Decoded<D>>> {
        loop {
            let line = match self.inner.decode(src)? {
                None => return Ok(None),
                Some(Err(e)) => return Ok(Some(Err(e))),
                Some(Ok(line)) => line,
            };

            if line.trim().is_empty() {
                continue;
            }

            let frame = serde_json::from_str(&line)
                .map_err(|cause| ProtocolError::InvalidMessage { string: line, cause });
            return Ok(Some(frame));
        }
    }
}

impl<D, E: Serialize> Encoder<E> for JsonCodec<D, E> {
    type Error = ProtocolError;

    fn encode(&mut self, frame: E, dst: &mut BytesMut) -> error::Result<()> {
        let line = serde_json::to_string(&frame).map_err(ProtocolError::Encode)?;
        self.inner.encode(line, dst)
    }
}
