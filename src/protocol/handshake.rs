//! Session initialization handshake.
//!
//! The first message on a fresh connection is a JSON object announcing
//! the auth token and terminal geometry:
//!
//! ```json
//! {"AuthToken": "", "columns": 80, "rows": 24}
//! ```
//!
//! It is sent once, as a binary WebSocket message, before any
//! data-channel traffic. The server does not acknowledge it beyond
//! resuming normal terminal output.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The one-time session handshake message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInit {
    /// Authentication token, empty when the server requires none.
    #[serde(rename = "AuthToken")]
    pub auth_token: String,

    /// Terminal width in columns.
    pub columns: u16,

    /// Terminal height in rows.
    pub rows: u16,
}

impl SessionInit {
    /// Create a handshake message.
    #[must_use]
    pub fn new(auth_token: impl Into<String>, columns: u16, rows: u16) -> Self {
        Self {
            auth_token: auth_token.into(),
            columns,
            rows,
        }
    }

    /// Serialize to the JSON bytes sent over the wire.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Handshake`](crate::Error::Handshake) if
    /// serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}
