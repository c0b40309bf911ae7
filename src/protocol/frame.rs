//! Channel-tag framing for the terminal WebSocket protocol.
//!
//! Every message after the session handshake carries a one-byte channel
//! tag followed by the raw payload:
//!
//! ```text
//!  0        1                    N
//! +--------+--------------------+
//! |  tag   |      payload       |
//! +--------+--------------------+
//! ```
//!
//! Tag `0x30` (ASCII `'0'`) is the terminal data channel in both
//! directions. Other tag values are reserved for control signalling and
//! are not interpreted by the measurement logic: callers filter by
//! [`Frame::is_data`]. Messages too short to carry a tag and a payload
//! are not frames at all: [`Frame::decode`] returns `None` and the
//! message is ignored, never surfaced as an error.

use std::borrow::Cow;

use bytes::Bytes;

/// Channel tag of the terminal data stream (ASCII `'0'`).
pub const DATA: u8 = 0x30;

/// Interrupt payload byte (ASCII ETX, Ctrl-C), sent on the data channel
/// to terminate a running remote command.
pub const INTERRUPT: u8 = 0x03;

/// A decoded channel frame: one tag byte plus its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw channel tag. Only [`DATA`] is meaningful to the harness.
    pub channel: u8,
    payload: Bytes,
}

impl Frame {
    /// Encode a frame by prepending the channel tag to the payload.
    #[must_use]
    pub fn encode(channel: u8, payload: &[u8]) -> Vec<u8> {
        let mut message = Vec::with_capacity(1 + payload.len());
        message.push(channel);
        message.extend_from_slice(payload);
        message
    }

    /// Encode a data-channel frame.
    #[must_use]
    pub fn data(payload: &[u8]) -> Vec<u8> {
        Self::encode(DATA, payload)
    }

    /// Encode the interrupt frame (`[0x30, 0x03]`).
    #[must_use]
    pub fn interrupt() -> Vec<u8> {
        Self::encode(DATA, &[INTERRUPT])
    }

    /// Decode an inbound message into tag and payload.
    ///
    /// Returns `None` when the message is shorter than 2 bytes: there is
    /// no tagged payload to measure. Unrecognized tags still decode;
    /// callers filter with [`Frame::is_data`].
    #[must_use]
    pub fn decode(message: Bytes) -> Option<Self> {
        if message.len() < 2 {
            return None;
        }
        let channel = message[0];
        Some(Self {
            channel,
            payload: message.slice(1..),
        })
    }

    /// Whether this frame belongs to the terminal data channel.
    #[must_use]
    pub const fn is_data(&self) -> bool {
        self.channel == DATA
    }

    /// The payload bytes, without the tag.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Take ownership of the payload bytes.
    #[must_use]
    pub fn into_payload(self) -> Bytes {
        self.payload
    }

    /// Best-effort text view of the payload.
    ///
    /// Invalid UTF-8 sequences become replacement characters; this never
    /// fails.
    #[must_use]
    pub fn text_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}
