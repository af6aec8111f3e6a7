//! Rendering port: what the session tells the UI after each transition.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::client::types::Link;
use crate::conversation::Role;

/// A message ready for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Author of the message.
    pub role: Role,
    /// Unformatted text, as recorded in history.
    pub content: String,
    /// Sanitized display markup.
    pub markup: String,
    /// When the message was produced.
    pub timestamp: DateTime<Utc>,
}

/// Human-handoff signals attached to an assistant turn. Either one is enough
/// reason to offer the escalation contacts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EscalationSignals {
    /// The user's own message asked for a person.
    pub user_intent: bool,
    /// The backend advised a handoff.
    pub backend: bool,
    /// Backend explanation, when given.
    pub reason: Option<String>,
    /// The backend asked for a live-agent option to be offered.
    pub live_agent_option: bool,
    /// The backend asked for a callback option to be offered.
    pub callback_option: bool,
}

impl EscalationSignals {
    /// Whether the handoff advisory should be shown.
    #[must_use]
    pub const fn should_escalate(&self) -> bool {
        self.user_intent || self.backend || self.live_agent_option
    }

    /// Whether a callback request should be offered.
    #[must_use]
    pub const fn offers_callback(&self) -> bool {
        self.callback_option
    }
}

/// Snapshot emitted to the renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderEvent {
    /// A user message was accepted.
    UserTurn(RenderedMessage),
    /// A request is in flight; show the typing indicator.
    AwaitingReply,
    /// The exchange finished, with a reply or the fallback apology.
    AssistantTurn {
        /// The assistant message.
        message: RenderedMessage,
        /// Links returned by the backend; empty on failure.
        links: Vec<Link>,
        /// Quick-link markup for `links`.
        links_markup: String,
        /// Handoff signals for this exchange.
        escalation: EscalationSignals,
        /// Whether the backend grounded the reply in its knowledge base.
        used_rag: bool,
        /// Whether this is the local fallback rather than a backend reply.
        fallback: bool,
    },
    /// The session ended.
    Closed,
}

/// Receives render events. Called synchronously; must not block.
pub trait Renderer: Send + Sync {
    /// Display one event.
    fn render(&self, event: &RenderEvent);
}

impl<T: Renderer + ?Sized> Renderer for Arc<T> {
    fn render(&self, event: &RenderEvent) {
        (**self).render(event);
    }
}
