//! Length-prefixed frame codec.
//!
//! Each frame is: `[u32 big-endian length][binary plist payload]`.
//!
//! Decoding never consumes a partial frame. A payload that fails to parse
//! still consumes its bytes so the stream stays aligned.

// ============================================================================
// Imports
// ============================================================================

use std::io::Cursor;

use plist::Value;
use tracing::warn;

use crate::error::{Error, Result};
use crate::protocol::Message;

// ============================================================================
// Constants
// ============================================================================

/// Width of the length prefix.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Default maximum payload length (32 MiB).
pub const DEFAULT_MAX_FRAME_LEN: u32 = 32 * 1024 * 1024;

// ============================================================================
// Decoded
// ============================================================================

/// Outcome of [`FrameCodec::try_decode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// Not enough bytes buffered for a whole frame; nothing was consumed.
    NeedMoreData,

    /// A whole frame was read.
    Frame {
        /// Parsed payload, `None` if the payload was not a valid plist.
        value: Option<Value>,
        /// Bytes to drop from the front of the buffer.
        consumed: usize,
    },
}

// ============================================================================
// FrameCodec
// ============================================================================

/// Encodes and decodes length-prefixed plist frames.
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    /// Largest payload accepted in either direction.
    max_frame_len: u32,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_LEN)
    }
}

impl FrameCodec {
    /// Creates a codec with the given payload limit.
    #[inline]
    #[must_use]
    pub const fn new(max_frame_len: u32) -> Self {
        Self { max_frame_len }
    }

    /// Returns the payload limit.
    #[inline]
    #[must_use]
    pub const fn max_frame_len(&self) -> u32 {
        self.max_frame_len
    }

    /// Serializes `message` into a complete frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if the plist writer rejects the message or
    /// the payload exceeds the limit.
    pub fn encode(&self, message: Message) -> Result<Vec<u8>> {
        let mut frame = vec![0u8; LENGTH_PREFIX_LEN];
        message
            .into_value()
            .to_writer_binary(&mut frame)
            .map_err(|e| Error::encode(e.to_string()))?;

        let payload_len = frame.len() - LENGTH_PREFIX_LEN;
        let len = u32::try_from(payload_len)
            .ok()
            .filter(|len| *len <= self.max_frame_len)
            .ok_or_else(|| {
                Error::encode(format!(
                    "payload of {payload_len} bytes exceeds {} byte limit",
                    self.max_frame_len
                ))
            })?;

        frame[..LENGTH_PREFIX_LEN].copy_from_slice(&len.to_be_bytes());
        Ok(frame)
    }

    /// Attempts to read one frame from the front of `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Framing`] if the length prefix exceeds the limit.
    /// The buffer is left untouched in that case.
    pub fn try_decode(&self, buf: &[u8]) -> Result<Decoded> {
        let Some(prefix) = buf.first_chunk::<LENGTH_PREFIX_LEN>() else {
            return Ok(Decoded::NeedMoreData);
        };

        let len = u32::from_be_bytes(*prefix);
        if len > self.max_frame_len {
            return Err(Error::framing(format!(
                "length prefix {len} exceeds {} byte limit",
                self.max_frame_len
            )));
        }

        let consumed = LENGTH_PREFIX_LEN + len as usize;
        let Some(payload) = buf.get(LENGTH_PREFIX_LEN..consumed) else {
            return Ok(Decoded::NeedMoreData);
        };

        let value = match Value::from_reader(Cursor::new(payload)) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, len, "Discarding undecodable frame payload");
                None
            }
        };

        Ok(Decoded::Frame { value, consumed })
    }
}

// ============================================================================
// Tests
// ============================================================================
