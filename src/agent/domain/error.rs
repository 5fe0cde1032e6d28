//! Error types for agent domain validation and parsing.

use super::AgentId;
use thiserror::Error;

/// Errors returned while constructing or transitioning agent domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgentDomainError {
    /// The agent identifier is empty after trimming.
    #[error("agent id must not be empty")]
    EmptyAgentId,

    /// The agent identifier contains unsupported characters.
    #[error(
        "agent id '{0}' contains invalid characters (only alphanumeric, '_', '-', '.' and ':' allowed)"
    )]
    InvalidAgentId(String),

    /// The agent identifier exceeds the length limit.
    #[error("agent id exceeds 128 character limit: {0}")]
    AgentIdTooLong(String),

    /// Transitioning between two lifecycle states is invalid.
    #[error("invalid lifecycle transition for agent {agent_id}: {from} -> {to}")]
    InvalidTransition {
        /// Agent whose transition was rejected.
        agent_id: AgentId,
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },
}

/// Error returned while parsing an agent status string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown agent status: {0}")]
pub struct ParseAgentStatusError(pub String);
