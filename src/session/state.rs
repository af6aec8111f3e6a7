//! Session state machine values.

use std::fmt;

/// Lifecycle state of a conversation session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Ready to accept a message.
    Idle,
    /// One request is in flight.
    Awaiting,
    /// Session ended; nothing more is accepted.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Awaiting => "awaiting",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Why a submission was ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Empty or whitespace-only text.
    Empty,
    /// A request is already in flight.
    Busy,
    /// The session has been closed.
    Closed,
}

/// Result of [`super::ConversationSession::submit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The backend replied.
    Replied,
    /// The exchange failed and the fallback apology was recorded.
    Fallback,
    /// Nothing happened.
    Skipped(SkipReason),
}

impl SubmitOutcome {
    /// Whether the message was accepted and a full cycle completed.
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        !matches!(self, Self::Skipped(_))
    }
}
