//! Identifier types for the agent domain.

use super::AgentDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const MAX_AGENT_ID_LENGTH: usize = 128;

/// Caller-chosen identifier of an agent instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Creates a validated agent identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::EmptyAgentId`],
    /// [`AgentDomainError::InvalidAgentId`] or
    /// [`AgentDomainError::AgentIdTooLong`].
    pub fn new(value: impl Into<String>) -> Result<Self, AgentDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(AgentDomainError::EmptyAgentId);
        }
        if trimmed.len() > MAX_AGENT_ID_LENGTH {
            return Err(AgentDomainError::AgentIdTooLong(raw));
        }

        let is_valid = trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'));
        if !is_valid {
            return Err(AgentDomainError::InvalidAgentId(raw));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Creates a random identifier of the form `agent-<uuid>`.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("agent-{}", Uuid::new_v4()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AgentId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a scheduled creation or deletion task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new random task identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a task identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("agent-1")]
    #[case("tenant:research.bot_2")]
    fn agent_id_accepts_valid_values(#[case] raw: &str) {
        assert_eq!(AgentId::new(raw).expect("valid id").as_str(), raw);
    }

    #[rstest]
    #[case("", AgentDomainError::EmptyAgentId)]
    #[case("a/b", AgentDomainError::InvalidAgentId("a/b".to_owned()))]
    fn agent_id_rejects_invalid_values(#[case] raw: &str, #[case] expected: AgentDomainError) {
        assert_eq!(AgentId::new(raw), Err(expected));
    }

    #[test]
    fn generated_agent_ids_are_valid_and_distinct() {
        let first = AgentId::generate();
        let second = AgentId::generate();

        assert_ne!(first, second);
        assert!(AgentId::new(first.as_str()).is_ok());
    }
}
