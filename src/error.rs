//! Error types for the benchmark harness.
//!
//! Only transport-level failures are represented here. Benchmark-level
//! shortfalls (zero samples, byte floor not reached) are not errors in
//! this sense; they surface as structured failure records, see
//! [`crate::report`].

use thiserror::Error;

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a benchmark session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The WebSocket transport failed (connect, send, or receive).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The session handshake message could not be built or sent.
    #[error("Invalid handshake: {0}")]
    Handshake(String),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Handshake(err.to_string())
    }
}
