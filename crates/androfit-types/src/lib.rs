//! Shared types for the Androfit voice coach.
//!
//! This crate provides the plain-data types used across the Androfit
//! crates: the coach persona, per-session capability parameters, and
//! conversation transcript entries. It deliberately depends on nothing
//! but `serde` and `chrono` so that every other crate can depend on it
//! without cycles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod persona;
mod session;

pub use persona::Persona;
pub use session::{SessionOptions, VadOptions};

/// Speaker role of a transcript entry, matching the roles the hosted
/// chat API understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions injected by the program (persona, greeting cues).
    System,
    /// Transcribed caller speech.
    User,
    /// Replies generated by the coach.
    Assistant,
}

impl Role {
    /// Returns the wire label for this role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of the session's conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Who produced this turn.
    pub role: Role,
    /// The text of the turn.
    pub text: String,
    /// When the turn was recorded.
    pub at: DateTime<Utc>,
}

impl TranscriptEntry {
    /// Creates an entry timestamped now.
    pub fn now(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_labels() {
        assert_eq!(Role::System.as_str(), "system");
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        let parsed: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(parsed, Role::User);
    }

    #[test]
    fn transcript_entry_round_trip() {
        let entry = TranscriptEntry::now(Role::User, "Beginner, 20 min, no equipment");
        let json = serde_json::to_string(&entry).unwrap();
        let back: TranscriptEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
