//! Inbound frame reassembly.
//!
//! The device is free to split a frame across any number of reads, or to
//! pack several frames (plus the start of another) into one read.
//! [`ReassemblyBuffer`] accumulates bytes and hands back every complete
//! frame, keeping the unconsumed tail for the next delivery.
//!
//! Consumption is tracked with a read cursor; the consumed prefix is
//! compacted away once per delivery rather than once per frame.

// ============================================================================
// Imports
// ============================================================================

use plist::Value;
use tracing::trace;

use crate::error::Result;

use super::codec::{Decoded, FrameCodec};

// ============================================================================
// ReassemblyBuffer
// ============================================================================

/// Accumulates inbound bytes and yields complete frame payloads.
#[derive(Debug, Default)]
pub struct ReassemblyBuffer {
    /// Frame decoder.
    codec: FrameCodec,
    /// Received bytes; everything before `cursor` is already consumed.
    bytes: Vec<u8>,
    /// Read position into `bytes`.
    cursor: usize,
}

impl ReassemblyBuffer {
    /// Creates an empty buffer.
    #[inline]
    #[must_use]
    pub fn new(codec: FrameCodec) -> Self {
        Self {
            codec,
            bytes: Vec::new(),
            cursor: 0,
        }
    }

    /// Appends `data` and passes each complete payload to `on_frame`.
    ///
    /// Payloads that failed to decode are consumed but not passed on.
    /// Returns once no complete frame remains.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Framing`](crate::Error::Framing) on an oversized
    /// length prefix. Frames before it have already been delivered and the
    /// offending prefix stays pending.
    pub fn push(&mut self, data: &[u8], mut on_frame: impl FnMut(Value)) -> Result<()> {
        self.bytes.extend_from_slice(data);

        let outcome = loop {
            match self.codec.try_decode(&self.bytes[self.cursor..]) {
                Ok(Decoded::NeedMoreData) => break Ok(()),
                Ok(Decoded::Frame { value, consumed }) => {
                    self.cursor += consumed;
                    trace!(consumed, pending = self.len(), "Frame reassembled");
                    if let Some(value) = value {
                        on_frame(value);
                    }
                }
                Err(e) => break Err(e),
            }
        };

        self.compact();
        outcome
    }

    /// Returns the bytes not yet consumed as complete frames.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.bytes[self.cursor..]
    }

    /// Returns the number of pending bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len() - self.cursor
    }

    /// Returns `true` if no bytes are pending.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discards all pending bytes.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.cursor = 0;
    }

    /// Drops the consumed prefix.
    fn compact(&mut self) {
        if self.cursor == 0 {
            return;
        }
        if self.cursor == self.bytes.len() {
            self.bytes.clear();
        } else {
            self.bytes.drain(..self.cursor);
        }
        self.cursor = 0;
    }
}

// ============================================================================
// Tests
// ============================================================================
