//! Shell prompt detection over the inbound data stream.
//!
//! The wire protocol has no "command finished" signal, so the harness
//! infers shell state from the prompt characters `$`, `%`, `#`. Two
//! strictness levels are used deliberately:
//!
//! - [`MatchMode::Anywhere`] for session readiness: the login banner is
//!   unstructured, so any occurrence of a marker counts.
//! - [`MatchMode::LineEnd`] for command completion: only a line whose
//!   last non-whitespace character is a marker counts, which filters out
//!   markers embedded in program output.
//!
//! A marker appearing inside output data can still produce a false
//! positive in either mode. That is an accepted limitation of the
//! protocol, not something to be papered over with deeper parsing; a
//! real fix needs an explicit completion signal on the wire.

/// Characters treated as shell prompt terminators.
pub const PROMPT_MARKERS: [char; 3] = ['$', '%', '#'];

/// How strictly a payload must match to count as a prompt sighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatchMode {
    /// A marker anywhere in the payload satisfies the detector.
    ///
    /// Used while waiting for initial session readiness.
    #[default]
    Anywhere,

    /// Only a trimmed line ending in a marker satisfies the detector.
    ///
    /// Used while waiting for a command to finish.
    LineEnd,
}

/// Stateful scanner that declares "prompt seen" over a payload stream.
///
/// Starts armed; once satisfied it stays satisfied and further scans are
/// no-ops. Payloads are decoded as UTF-8 with lossy replacement, so
/// malformed terminal bytes never fail the scan.
#[derive(Debug, Clone)]
pub struct PromptDetector {
    mode: MatchMode,
    satisfied: bool,
}

impl PromptDetector {
    /// Create a detector in session-readiness mode.
    #[must_use]
    pub const fn readiness() -> Self {
        Self {
            mode: MatchMode::Anywhere,
            satisfied: false,
        }
    }

    /// Create a detector in command-completion mode.
    #[must_use]
    pub const fn completion() -> Self {
        Self {
            mode: MatchMode::LineEnd,
            satisfied: false,
        }
    }

    /// Scan one data-channel payload. Returns the detector state after
    /// the scan.
    pub fn scan(&mut self, payload: &[u8]) -> bool {
        if self.satisfied {
            return true;
        }
        let text = String::from_utf8_lossy(payload);
        self.satisfied = match self.mode {
            MatchMode::Anywhere => contains_marker(&text),
            MatchMode::LineEnd => line_ends_with_marker(&text),
        };
        self.satisfied
    }

    /// Whether a prompt has been seen.
    #[must_use]
    pub const fn is_satisfied(&self) -> bool {
        self.satisfied
    }
}

/// Whether any prompt marker appears anywhere in the text.
#[must_use]
pub fn contains_marker(text: &str) -> bool {
    text.contains(PROMPT_MARKERS)
}

/// Whether any line of the text, trimmed, ends in a prompt marker.
#[must_use]
pub fn line_ends_with_marker(text: &str) -> bool {
    text.split('\n')
        .map(str::trim)
        .any(|line| line.ends_with(PROMPT_MARKERS))
}
