//! Wire types for the `/api/chat` exchange.

use serde::{Deserialize, Deserializer, Serialize};

use crate::conversation::{SessionId, Turn};

/// A backend-provided link shown under a reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Target URL (`https://...`, `tel:...`, ...).
    pub url: String,
    /// Visible label.
    pub text: String,
    /// Optional explanation rendered below the link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Backend category tag such as `live_agent` or `whatsapp`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Link {
    /// Whether the link dials a phone number.
    #[must_use]
    pub fn is_tel(&self) -> bool {
        self.url.starts_with("tel:")
    }
}

/// Body of `POST /api/chat`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,
    /// Prior turns, excluding the message being sent.
    pub conversation_history: Vec<Turn>,
    /// Current session identity.
    pub session_id: SessionId,
}

/// Successful reply from the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Assistant text (mixed markdown/HTML).
    pub response: String,
    /// Links to render below the reply.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub links: Vec<Link>,
    /// Backend advises a human handoff.
    #[serde(default)]
    pub should_escalate: bool,
    /// Session identity to use from now on.
    pub session_id: SessionId,
    /// Why the backend advises a handoff.
    #[serde(default)]
    pub escalation_reason: Option<String>,
    /// Whether the reply came from the knowledge base.
    #[serde(default = "default_used_rag")]
    pub used_rag: bool,
    /// Backend suggests offering a live agent.
    #[serde(default)]
    pub show_live_agent_option: bool,
    /// Backend suggests offering a callback.
    #[serde(default)]
    pub show_callback_option: bool,
}

const fn default_used_rag() -> bool {
    true
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Link>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Link>>::deserialize(deserializer)?.unwrap_or_default())
}
