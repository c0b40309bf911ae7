//! Wire-level types of the terminal WebSocket protocol: channel-tag
//! framing, the session handshake, and prompt detection heuristics.

pub mod frame;
pub mod handshake;
pub mod prompt;

pub use frame::{DATA, Frame, INTERRUPT};
pub use handshake::SessionInit;
pub use prompt::{MatchMode, PROMPT_MARKERS, PromptDetector};
