//! Client-side detection of "let me talk to a person" intent.
//!
//! Matching is a plain case-insensitive substring test, so a phrase such as
//! "operations" also fires inside longer words ("cooperations"). That
//! permissiveness is accepted: a false positive only shows a contact card.

use crate::config::ChatConfig;

/// Fixed phrase set checked against every submitted message.
#[derive(Clone, Debug)]
pub struct EscalationDetector {
    phrases: Vec<String>,
}

impl EscalationDetector {
    /// Build a detector from a phrase list. Phrases are lower-cased and blank
    /// entries dropped.
    #[must_use]
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases = phrases
            .into_iter()
            .map(|phrase| phrase.as_ref().trim().to_lowercase())
            .filter(|phrase| !phrase.is_empty())
            .collect();
        Self { phrases }
    }

    /// Build a detector from the configured phrase list.
    #[must_use]
    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(&config.escalation_phrases)
    }

    /// Whether the message contains any escalation phrase.
    #[must_use]
    pub fn detect(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.phrases.iter().any(|phrase| lower.contains(phrase.as_str()))
    }

    /// Phrases in use, lower-cased.
    #[must_use]
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

impl Default for EscalationDetector {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_default_phrases() {
        let detector = EscalationDetector::default();
        assert!(detector.detect("I need to talk to human now"));
        assert!(detector.detect("please call me back"));
        assert!(detector.detect("Can I speak to Neha?"));
        assert!(detector.detect("ESCALATE this please"));
    }

    #[test]
    fn test_ignores_regular_questions() {
        let detector = EscalationDetector::default();
        assert!(!detector.detect("What yatras are available?"));
        assert!(!detector.detect("How do I register?"));
        assert!(!detector.detect(""));
    }

    #[test]
    fn test_substring_match_is_permissive() {
        let detector = EscalationDetector::default();
        assert!(detector.detect("Tell me about cooperations between groups"));
    }

    #[test]
    fn test_custom_phrases_normalized() {
        let detector = EscalationDetector::new(["  Live Agent ", "", "   "]);
        assert_eq!(detector.phrases(), &["live agent".to_string()]);
        assert!(detector.detect("give me a LIVE AGENT"));
        assert!(!detector.detect("need help"));
    }
}
