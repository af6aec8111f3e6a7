//! Conversation session orchestration.
//!
//! A session owns its identity and history and runs the
//! `Idle -> Awaiting -> Idle` cycle for each accepted message. At most one
//! request is in flight; submissions made meanwhile are dropped, not queued.

pub mod render;
pub mod state;

pub use render::{EscalationSignals, RenderEvent, RenderedMessage, Renderer};
pub use state::{SessionState, SkipReason, SubmitOutcome};

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::client::{ChatClient, ChatRequest, ChatResponse};
use crate::config::{ChatConfig, ConfigError};
use crate::conversation::{ConversationHistory, Role, SessionId, Turn};
use crate::escalation::EscalationDetector;
use crate::format::{MessageFormatter, render_links};

/// Errors raised while building a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The formatter rules failed to compile.
    #[error("formatter error: {0}")]
    Formatter(#[from] regex::Error),
}

struct SessionInner {
    id: SessionId,
    history: ConversationHistory,
    state: SessionState,
}

/// One chat session between a user and the backend.
pub struct ConversationSession<C, R> {
    config: ChatConfig,
    client: C,
    renderer: R,
    detector: EscalationDetector,
    formatter: MessageFormatter,
    inner: Mutex<SessionInner>,
}

impl<C: ChatClient, R: Renderer> ConversationSession<C, R> {
    /// Start a session with a freshly generated id.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: ChatConfig, client: C, renderer: R) -> Result<Self, SessionError> {
        Self::with_id(config, client, renderer, SessionId::generate())
    }

    /// Start a session with a known id.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn with_id(
        config: ChatConfig,
        client: C,
        renderer: R,
        id: SessionId,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let detector = EscalationDetector::from_config(&config);
        let formatter = MessageFormatter::new()?;
        info!(session_id = %id, "Conversation session started");

        Ok(Self {
            config,
            client,
            renderer,
            detector,
            formatter,
            inner: Mutex::new(SessionInner {
                id,
                history: ConversationHistory::new(),
                state: SessionState::Idle,
            }),
        })
    }

    /// Submit a user message and wait for the exchange to finish.
    ///
    /// Ignored when the trimmed text is empty, a request is already in
    /// flight, or the session is closed. Backend failures never surface as
    /// errors: the fallback apology is recorded instead. Dropping the
    /// returned future before the reply arrives records the fallback too.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let message = text.trim();

        let (request, escalate_now) = {
            let mut inner = self.lock_inner();
            let skip = match inner.state {
                SessionState::Closed => Some(SkipReason::Closed),
                SessionState::Awaiting => Some(SkipReason::Busy),
                SessionState::Idle if message.is_empty() => Some(SkipReason::Empty),
                SessionState::Idle => None,
            };
            if let Some(reason) = skip {
                debug!(session_id = %inner.id, ?reason, "Submission skipped");
                return SubmitOutcome::Skipped(reason);
            }

            inner.history.append(Turn::user(message));
            inner.state = SessionState::Awaiting;
            let request = ChatRequest {
                message: message.to_string(),
                conversation_history: inner.history.all_except_last().to_vec(),
                session_id: inner.id.clone(),
            };
            (request, self.detector.detect(message))
        };

        self.renderer
            .render(&RenderEvent::UserTurn(self.rendered(Role::User, message)));
        self.renderer.render(&RenderEvent::AwaitingReply);

        let pending = PendingReply {
            session: self,
            escalate_now,
            armed: true,
        };
        let result = self.client.send(&request).await;
        pending.disarm();

        let (event, outcome) = match result {
            Ok(response) => self.record_reply(response, escalate_now),
            Err(err) => self.record_fallback(&err, escalate_now),
        };
        self.renderer.render(&event);
        outcome
    }

    fn record_reply(
        &self,
        response: ChatResponse,
        escalate_now: bool,
    ) -> (RenderEvent, SubmitOutcome) {
        let mut inner = self.lock_inner();
        inner.history.append(Turn::assistant(response.response.clone()));
        if inner.id != response.session_id {
            debug!(from = %inner.id, to = %response.session_id, "Session id updated");
        }
        inner.id = response.session_id.clone();
        Self::finish_exchange(&mut inner);

        let event = RenderEvent::AssistantTurn {
            message: self.rendered(Role::Assistant, &response.response),
            links_markup: render_links(&response.links),
            escalation: EscalationSignals {
                user_intent: escalate_now,
                backend: response.should_escalate,
                reason: response.escalation_reason,
                live_agent_option: response.show_live_agent_option,
                callback_option: response.show_callback_option,
            },
            used_rag: response.used_rag,
            links: response.links,
            fallback: false,
        };
        (event, SubmitOutcome::Replied)
    }

    fn record_fallback(
        &self,
        cause: &dyn fmt::Display,
        escalate_now: bool,
    ) -> (RenderEvent, SubmitOutcome) {
        let fallback = self.config.fallback_message();
        {
            let mut inner = self.lock_inner();
            warn!(session_id = %inner.id, "Chat request failed: {cause}");
            inner.history.append(Turn::assistant(fallback.clone()));
            Self::finish_exchange(&mut inner);
        }

        let event = RenderEvent::AssistantTurn {
            message: self.rendered(Role::Assistant, &fallback),
            links: Vec::new(),
            links_markup: String::new(),
            escalation: EscalationSignals {
                user_intent: escalate_now,
                ..EscalationSignals::default()
            },
            used_rag: false,
            fallback: true,
        };
        (event, SubmitOutcome::Fallback)
    }

    /// `Awaiting` returns to `Idle`; a close made meanwhile sticks.
    fn finish_exchange(inner: &mut SessionInner) {
        if inner.state == SessionState::Awaiting {
            inner.state = SessionState::Idle;
        }
    }

    /// End the session. Later submissions are skipped.
    pub fn close(&self) {
        {
            let mut inner = self.lock_inner();
            if inner.state == SessionState::Closed {
                return;
            }
            inner.state = SessionState::Closed;
            info!(
                session_id = %inner.id,
                turns = inner.history.len(),
                "Conversation session closed"
            );
        }
        self.renderer.render(&RenderEvent::Closed);
    }

    /// Current session id.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.lock_inner().id.clone()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.lock_inner().state
    }

    /// Copy of the history so far.
    #[must_use]
    pub fn history(&self) -> Vec<Turn> {
        self.lock_inner().history.all().to_vec()
    }

    /// Configuration the session was built with.
    #[must_use]
    pub const fn config(&self) -> &ChatConfig {
        &self.config
    }

    fn lock_inner(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rendered(&self, role: Role, content: &str) -> RenderedMessage {
        RenderedMessage {
            role,
            content: content.to_string(),
            markup: self.formatter.format(content),
            timestamp: Utc::now(),
        }
    }
}

/// Held while a request is in flight. If `submit` is dropped before the
/// reply arrives, records the fallback so the session leaves `Awaiting`.
struct PendingReply<'a, C: ChatClient, R: Renderer> {
    session: &'a ConversationSession<C, R>,
    escalate_now: bool,
    armed: bool,
}

impl<C: ChatClient, R: Renderer> PendingReply<'_, C, R> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<C: ChatClient, R: Renderer> Drop for PendingReply<'_, C, R> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let (event, _) = self
            .session
            .record_fallback(&"request abandoned before a reply arrived", self.escalate_now);
        self.session.renderer.render(&event);
    }
}
