//! Error types for the intake agent.

use std::time::Duration;

use crate::intake::FieldKey;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// A turn that does not fit the `Label: value` grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("answer one field at a time")]
    MultipleLines,

    #[error("use Field: value")]
    Malformed,

    #[error("unknown field: {label}")]
    UnknownField { label: String },
}

/// Rejections produced by the answer parser. Neither variant mutates state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Well-formed answer for a field other than the one currently asked.
    #[error("Expected an answer for {}", expected.label())]
    Sequence { expected: FieldKey },

    /// Every field is already answered.
    #[error("All fields are already collected")]
    Complete,
}

/// Launch workflow failures. All are retryable and leave session state untouched.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("Launch fee not yet received from {wallet}")]
    PaymentPending { wallet: String },

    #[error("Launch backend failed: {reason}")]
    Collaborator { reason: String },

    #[error("Launch backend timed out after {timeout:?}")]
    Timeout { timeout: Duration },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Session store errors. These are the only failures that escape a turn.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Session store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid session id: {0:?}")]
    InvalidSessionId(String),
}

