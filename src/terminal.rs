//! Plain-text renderer for running a session in a terminal.

use std::io::Write;
use std::sync::Mutex;

use chrono::Local;

use crate::client::types::Link;
use crate::config::ChatConfig;
use crate::session::{RenderEvent, RenderedMessage, Renderer};

/// Assistant display name.
const BOT_NAME: &str = "Mitraa";
/// Shown with the escalation contacts.
const ESCALATION_NOTICE: &str =
    "I'm having trouble answering your questions. Would you like to speak with our team?";
/// Shown when the backend offers a callback.
const CALLBACK_NOTICE: &str =
    "Prefer a call back? Type \"request callback\" and our team will reach you.";

/// Writes render events as plain text.
pub struct TerminalRenderer<W> {
    out: Mutex<W>,
    escalation_contacts: Vec<Link>,
}

impl TerminalRenderer<std::io::Stdout> {
    /// Renderer writing to standard output.
    #[must_use]
    pub fn stdout(escalation_contacts: Vec<Link>) -> Self {
        Self::new(std::io::stdout(), escalation_contacts)
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    /// Renderer writing to `out`.
    #[must_use]
    pub const fn new(out: W, escalation_contacts: Vec<Link>) -> Self {
        Self {
            out: Mutex::new(out),
            escalation_contacts,
        }
    }

    /// Print the greeting and numbered suggested questions.
    pub fn greet(&self, config: &ChatConfig) {
        self.write_with(|out| {
            writeln!(out, "{BOT_NAME}: {}", config.welcome_message)?;
            if !config.suggested_questions.is_empty() {
                writeln!(out, "Try one of these (type its number):")?;
                for (idx, question) in config.suggested_questions.iter().enumerate() {
                    writeln!(out, "  {}. {question}", idx + 1)?;
                }
            }
            writeln!(out, "Type /quit to leave.")
        });
    }

    /// Print the input prompt.
    pub fn prompt(&self) {
        self.write_with(|out| {
            write!(out, "> ")?;
            out.flush()
        });
    }

    /// Unwrap the writer.
    ///
    /// # Errors
    /// Returns the poison error if a writer panicked mid-write.
    pub fn into_inner(self) -> Result<W, std::sync::PoisonError<W>> {
        self.out.into_inner()
    }

    fn write_with<F>(&self, body: F)
    where
        F: FnOnce(&mut W) -> std::io::Result<()>,
    {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        if let Err(err) = body(&mut *out) {
            tracing::debug!("Terminal write failed: {err}");
        }
    }

    fn write_message(out: &mut W, message: &RenderedMessage) -> std::io::Result<()> {
        let time = message.timestamp.with_timezone(&Local).format("%H:%M");
        writeln!(out, "{BOT_NAME} [{time}]: {}", message.content)
    }

    fn write_links(out: &mut W, links: &[Link]) -> std::io::Result<()> {
        for link in links {
            writeln!(out, "  -> {}: {}", link.text, link.url)?;
            if let Some(note) = link.note.as_deref() {
                writeln!(out, "     {note}")?;
            }
        }
        Ok(())
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn render(&self, event: &RenderEvent) {
        match event {
            // The user's line is already on screen.
            RenderEvent::UserTurn(_) => {}
            RenderEvent::AwaitingReply => {
                self.write_with(|out| writeln!(out, "{BOT_NAME} is typing..."));
            }
            RenderEvent::AssistantTurn {
                message,
                links,
                escalation,
                ..
            } => self.write_with(|out| {
                Self::write_message(out, message)?;
                Self::write_links(out, links)?;
                if escalation.should_escalate() && !self.escalation_contacts.is_empty() {
                    writeln!(out, "{ESCALATION_NOTICE}")?;
                    Self::write_links(out, &self.escalation_contacts)?;
                }
                if escalation.offers_callback() {
                    writeln!(out, "{CALLBACK_NOTICE}")?;
                }
                Ok(())
            }),
            RenderEvent::Closed => {
                self.write_with(|out| writeln!(out, "Session closed."));
            }
        }
    }
}

/// Map a numeric choice to the matching suggested question.
#[must_use]
pub fn resolve_suggestion(input: &str, questions: &[String]) -> Option<String> {
    let choice: usize = input.trim().parse().ok()?;
    questions.get(choice.checked_sub(1)?).cloned()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::conversation::Role;
    use crate::session::EscalationSignals;

    fn contact() -> Link {
        Link {
            url: "tel:8010513511".to_string(),
            text: "Neha: 8010513511".to_string(),
            note: Some("Operations".to_string()),
            kind: None,
        }
    }

    fn reply_event(signals: EscalationSignals) -> RenderEvent {
        RenderEvent::AssistantTurn {
            message: RenderedMessage {
                role: Role::Assistant,
                content: "We run Char Dham yatras.".to_string(),
                markup: "We run Char Dham yatras.".to_string(),
                timestamp: Utc::now(),
            },
            links: vec![Link {
                url: "https://oorzaayatra.com/login".to_string(),
                text: "Register/Login".to_string(),
                note: None,
                kind: None,
            }],
            links_markup: String::new(),
            escalation: signals,
            used_rag: true,
            fallback: false,
        }
    }

    fn rendered(events: &[RenderEvent]) -> String {
        let renderer = TerminalRenderer::new(Vec::new(), vec![contact()]);
        for event in events {
            renderer.render(event);
        }
        String::from_utf8(renderer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_reply_with_links() {
        let text = rendered(&[
            RenderEvent::AwaitingReply,
            reply_event(EscalationSignals::default()),
        ]);
        assert!(text.starts_with("Mitraa is typing...\n"));
        assert!(text.contains("]: We run Char Dham yatras.\n"));
        assert!(text.contains("  -> Register/Login: https://oorzaayatra.com/login\n"));
        assert!(!text.contains(ESCALATION_NOTICE));
        assert!(!text.contains(CALLBACK_NOTICE));
    }

    #[test]
    fn test_escalation_contacts_shown() {
        let signals = EscalationSignals {
            user_intent: true,
            ..EscalationSignals::default()
        };
        let text = rendered(&[reply_event(signals), RenderEvent::Closed]);
        assert!(text.contains(ESCALATION_NOTICE));
        assert!(text.contains("  -> Neha: 8010513511: tel:8010513511\n     Operations\n"));
        assert!(text.ends_with("Session closed.\n"));
    }

    #[test]
    fn test_backend_options_shown() {
        let signals = EscalationSignals {
            live_agent_option: true,
            callback_option: true,
            ..EscalationSignals::default()
        };
        let text = rendered(&[reply_event(signals)]);
        assert!(text.contains(ESCALATION_NOTICE));
        assert!(text.contains("tel:8010513511"));
        assert!(text.ends_with(&format!("{CALLBACK_NOTICE}\n")));
    }

    #[test]
    fn test_greet_lists_suggestions() {
        let renderer = TerminalRenderer::new(Vec::new(), Vec::new());
        renderer.greet(&ChatConfig::default());
        let text = String::from_utf8(renderer.into_inner().unwrap()).unwrap();
        assert!(text.contains("  1. What yatras are available?\n"));
        assert!(text.contains("  5. What is the cancellation policy?\n"));
    }

    #[test]
    fn test_resolve_suggestion() {
        let questions = ChatConfig::default().suggested_questions;
        assert_eq!(
            resolve_suggestion("2", &questions).as_deref(),
            Some("What are the charges?")
        );
        assert_eq!(resolve_suggestion("0", &questions), None);
        assert_eq!(resolve_suggestion("6", &questions), None);
        assert_eq!(resolve_suggestion("hello", &questions), None);
    }
}
