//! Configuration for the chat client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::client::types::Link;

/// Environment variable overriding the backend base URL.
pub const API_URL_ENV: &str = "MITRAA_API_URL";
/// Environment variable overriding the request timeout, in seconds.
pub const TIMEOUT_ENV: &str = "MITRAA_TIMEOUT_SECS";
/// Environment variable overriding the human contact shown on failures.
pub const SUPPORT_CONTACT_ENV: &str = "MITRAA_SUPPORT_CONTACT";

/// Default backend base URL.
const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Default human contact channel for the fallback message.
const DEFAULT_SUPPORT_CONTACT: &str = "+91-9205661114";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The backend URL could not be parsed.
    #[error("invalid api url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The backend URL uses a scheme other than http or https.
    #[error("unsupported api url scheme: {0}")]
    UnsupportedScheme(String),
    /// The fallback message would carry no way to reach a human.
    #[error("support contact must not be empty")]
    MissingSupportContact,
    /// An environment override could not be parsed.
    #[error("invalid value for {name}: {value}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Raw value found in the environment.
        value: String,
    },
}

/// Client-side configuration injected into each conversation session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Base URL of the chat backend; requests go to `{api_url}/api/chat`.
    pub api_url: String,
    /// Optional request timeout applied by the HTTP client.
    #[serde(with = "duration_serde")]
    pub request_timeout: Option<Duration>,
    /// Human contact channel included in the fallback apology.
    pub support_contact: String,
    /// Phrases that signal a wish to reach a human.
    pub escalation_phrases: Vec<String>,
    /// Contacts offered when the conversation should be handed off.
    pub escalation_contacts: Vec<Link>,
    /// Greeting shown before the first turn.
    pub welcome_message: String,
    /// Quick questions offered before the first turn.
    pub suggested_questions: Vec<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: None,
            support_contact: DEFAULT_SUPPORT_CONTACT.to_string(),
            escalation_phrases: default_escalation_phrases(),
            escalation_contacts: default_escalation_contacts(),
            welcome_message: "Namaste! I'm Mitraa. I'm here to help you with information about \
                              Oorzaa Yatra's spiritual journeys, yatra packages, bookings, and more."
                .to_string(),
            suggested_questions: default_suggested_questions(),
        }
    }
}

impl ChatConfig {
    /// Create a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the default config and apply environment overrides.
    ///
    /// # Errors
    /// Returns an error if an override is malformed or the result is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.api_url = url;
        }

        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
                name: TIMEOUT_ENV,
                value: raw.clone(),
            })?;
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        if let Ok(contact) = std::env::var(SUPPORT_CONTACT_ENV) {
            config.support_contact = contact;
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the backend base URL.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the human contact used in the fallback message.
    #[must_use]
    pub fn with_support_contact(mut self, contact: impl Into<String>) -> Self {
        self.support_contact = contact.into();
        self
    }

    /// Replace the escalation phrase set.
    #[must_use]
    pub fn with_escalation_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.escalation_phrases = phrases.into_iter().map(Into::into).collect();
        self
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the support contact is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        if self.support_contact.trim().is_empty() {
            return Err(ConfigError::MissingSupportContact);
        }
        Ok(())
    }

    /// Parse the backend base URL.
    ///
    /// # Errors
    /// Returns an error if the URL does not parse or is not http(s).
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(self.api_url.trim())?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
    }

    /// The apology shown in place of a reply when the backend cannot be reached.
    #[must_use]
    pub fn fallback_message(&self) -> String {
        format!(
            "I apologize, but I'm having trouble connecting right now. \
             Please try again or contact us directly at {}.",
            self.support_contact.trim()
        )
    }
}

fn default_escalation_phrases() -> Vec<String> {
    [
        "connect to human",
        "human agent",
        "talk to human",
        "speak to human",
        "connect to team",
        "real person",
        "call support",
        "contact operations",
        "neha",
        "operations",
        "request callback",
        "call me",
        "need help",
        "escalate",
    ]
    .iter()
    .map(|phrase| (*phrase).to_string())
    .collect()
}

fn default_escalation_contacts() -> Vec<Link> {
    vec![Link {
        url: "tel:8010513511".to_string(),
        text: "Neha: 8010513511".to_string(),
        note: Some(
            "For operational coordination, internal follow-ups, and yatra execution related communication."
                .to_string(),
        ),
        kind: Some("live_agent".to_string()),
    }]
}

fn default_suggested_questions() -> Vec<String> {
    [
        "What yatras are available?",
        "What are the charges?",
        "How do I register?",
        "What's included in the package?",
        "What is the cancellation policy?",
    ]
    .iter()
    .map(|question| (*question).to_string())
    .collect()
}

/// Serde module for optional durations stored as whole seconds.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.map(|d| d.as_secs()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
