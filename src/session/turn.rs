//! Conversation turn model shared by the transcript and the HTTP layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who produced a turn.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    /// Text typed by the user.
    Human,
    /// Reply generated by the completion service.
    Ai,
}

impl RoleType {
    /// Stable string form used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Ai => "ai",
        }
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RoleType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "human" => Ok(Self::Human),
            "ai" => Ok(Self::Ai),
            _ => Err(value.to_string()),
        }
    }
}

/// One utterance in the transcript.
///
/// Fields are private so a turn cannot be edited once built.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    role_type: RoleType,
    content: String,
}

impl ConversationTurn {
    /// Build a turn with an explicit role.
    #[must_use]
    pub fn new(role_type: RoleType, content: impl Into<String>) -> Self {
        Self {
            role_type,
            content: content.into(),
        }
    }

    /// Build a human turn.
    #[must_use]
    pub fn human(content: impl Into<String>) -> Self {
        Self::new(RoleType::Human, content)
    }

    /// Build an ai turn.
    #[must_use]
    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(RoleType::Ai, content)
    }

    /// Role of the speaker.
    #[must_use]
    pub const fn role_type(&self) -> RoleType {
        self.role_type
    }

    /// Text body.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}
