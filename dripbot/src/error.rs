//! Unified error types for dripbot.
//!
//! Module-specific errors ([`SkillError`], [`CacheError`], [`FaucetError`],
//! [`ConfigError`]) all convert into the main [`BotError`] type so that
//! handlers can propagate failures with `?`.
//!
//! Note that user-input and domain errors (an empty network parameter, a
//! network missing from the supported list) are *not* errors in this
//! hierarchy: the drip handler recovers from them locally by sending a
//! guidance message and returning `Ok`.

use crate::cache::CacheError;
use crate::faucet::FaucetError;

// ============================================================================
// Main Error Type
// ============================================================================

/// The main error type for dripbot operations.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// Skill registry or dispatch error.
    #[error("skill: {0}")]
    Skill(#[from] SkillError),

    /// Cache store error.
    #[error("cache: {0}")]
    Cache(#[from] CacheError),

    /// Faucet API error.
    #[error("faucet: {0}")]
    Faucet(#[from] FaucetError),

    /// Configuration error.
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// IO error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic internal error.
    #[error("{0}")]
    Internal(String),
}

impl BotError {
    /// Create a config error from a string.
    #[inline]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(ConfigError::Invalid(msg.into()))
    }

    /// Create an internal error.
    #[inline]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type alias for dripbot operations.
pub type Result<T> = std::result::Result<T, BotError>;

// ============================================================================
// Skill Errors
// ============================================================================

/// Error type for skill registry and dispatch operations.
#[derive(Debug, thiserror::Error)]
pub enum SkillError {
    /// A skill definition failed construction-time validation.
    #[error("invalid definition for {command}: {reason}")]
    InvalidDefinition {
        /// Command pattern of the offending skill.
        command: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Two skills declared the same trigger.
    #[error("duplicate trigger: {0}")]
    DuplicateTrigger(String),

    /// Delivering a reply to the sender failed.
    #[error("send failed: {0}")]
    SendFailed(String),
}

impl SkillError {
    /// Create an invalid-definition error.
    pub fn invalid(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// Create a send-failed error.
    #[inline]
    pub fn send(msg: impl Into<String>) -> Self {
        Self::SendFailed(msg.into())
    }
}

/// Result type for skill operations.
pub type SkillResult<T> = std::result::Result<T, SkillError>;

// ============================================================================
// Configuration Errors
// ============================================================================

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("parse: {0}")]
    Parse(#[from] serde_json::Error),

    /// Missing required field.
    #[error("missing: {0}")]
    Missing(String),

    /// Invalid value.
    #[error("invalid: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// ============================================================================
// Tests
// ============================================================================
