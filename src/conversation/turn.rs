//! Turn model for conversation history.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Author of a turn.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// User input.
    User,
    /// Backend reply (or the local fallback).
    Assistant,
}

impl Role {
    /// Stable string form used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse error for [`Role`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid role: {value}")]
pub struct RoleParseError {
    value: String,
}

impl RoleParseError {
    /// The raw value that failed parsing.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            raw if raw.eq_ignore_ascii_case("user") => Ok(Self::User),
            raw if raw.eq_ignore_ascii_case("assistant") => Ok(Self::Assistant),
            raw => Err(RoleParseError {
                value: raw.to_string(),
            }),
        }
    }
}

/// One message within a conversation. Immutable once built.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    /// Build a user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Build an assistant turn.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Who authored the turn.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Text of the turn.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!("user".parse::<Role>(), Ok(Role::User));
        assert_eq!("assistant".parse::<Role>(), Ok(Role::Assistant));
        assert_eq!(" Assistant ".parse::<Role>(), Ok(Role::Assistant));
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }

    #[test]
    fn test_unknown_role_rejected() {
        let err = "system".parse::<Role>().unwrap_err();
        assert_eq!(err.value(), "system");
        assert_eq!(err.to_string(), "invalid role: system");
    }

    #[test]
    fn test_turn_wire_shape() {
        let json = serde_json::to_value(Turn::user("hi")).unwrap_or_default();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }
}
