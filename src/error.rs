//! Error types for the AEO rule engine.
//!
//! This module provides structured error handling with:
//! - `EngineError`: Domain-specific errors for engine operations
//! - `Result<T>`: Type alias for Results using EngineError
//!
//! Individual rules use `anyhow` internally and at collaborator seams;
//! `EngineError` is what crosses the engine boundary.

use thiserror::Error;

use crate::llm::ModelCandidate;

// ============================================================================
// DOMAIN ERROR TYPE
// ============================================================================

/// Domain-specific errors for engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid or malformed URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A rule with the same id is already registered
    #[error("Duplicate rule id: {0}")]
    DuplicateRule(String),

    /// Every candidate in a provider fallback chain failed
    #[error("All LLM providers failed (last attempt: {last_candidate}): {message}")]
    AllProvidersFailed {
        last_candidate: String,
        message: String,
    },

    /// No candidate in a provider fallback chain was available to attempt
    #[error("No LLM provider available (chain of {chain_len})")]
    NoProviderAvailable { chain_len: usize },

    /// External lookup (Wikipedia, etc.) failed
    #[error("Lookup error ({service}): {message}")]
    LookupFailed { service: &'static str, message: String },

    /// A rule evaluation failed outright
    #[error("Rule '{rule_id}' failed: {message}")]
    RuleFailed { rule_id: String, message: String },

    /// Generic error with context
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    /// Create a lookup error
    pub fn lookup(service: &'static str, msg: impl Into<String>) -> Self {
        Self::LookupFailed {
            service,
            message: msg.into(),
        }
    }

    /// Create a rule failure error
    pub fn rule(rule_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::RuleFailed {
            rule_id: rule_id.into(),
            message: msg.into(),
        }
    }

    /// Create an exhausted-chain error from the last attempted candidate.
    pub fn providers_exhausted(last: &ModelCandidate, source: &anyhow::Error) -> Self {
        Self::AllProvidersFailed {
            last_candidate: last.describe(),
            message: format!("{source:#}"),
        }
    }
}

/// Result type alias using EngineError.
pub type Result<T> = std::result::Result<T, EngineError>;
