//! LLM collaborator contract.
//!
//! The engine never talks to a vendor SDK directly. LLM-backed rules hold a
//! shared [`LlmClient`] and describe *which* vendor/model they want through an
//! ordered list of [`ModelCandidate`]s; [`fallback::ProviderChain`] walks that
//! list until one candidate succeeds.
//!
//! Concrete clients (OpenAI, Anthropic, Perplexity HTTP bindings) live in the
//! embedding service and are injected at engine construction.

mod fallback;

pub use fallback::{ProviderChain, ResolvedOutput};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// PROVIDERS
// ============================================================================

/// Supported LLM vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    OpenAi,
    Anthropic,
    Perplexity,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "openai",
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::Perplexity => "perplexity",
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (provider, model) entry in a fallback chain, with call parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCandidate {
    pub provider: LlmProvider,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Whether the call may use the provider's web-access / browsing mode.
    pub web_access: bool,
}

impl ModelCandidate {
    pub fn new(provider: LlmProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.2,
            max_tokens: 2048,
            web_access: false,
        }
    }

    pub fn with_web_access(mut self) -> Self {
        self.web_access = true;
        self
    }

    /// "provider/model" label used in errors and audit records.
    pub fn describe(&self) -> String {
        format!("{}/{}", self.provider, self.model)
    }
}

// ============================================================================
// CLIENT TRAIT
// ============================================================================

/// Abstraction over multi-vendor LLM access.
///
/// Implementations must be safe for concurrent use: many rules may call the
/// same client simultaneously during one page evaluation.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Cheap availability probe (API key configured, vendor not disabled).
    /// Must not perform network I/O.
    fn is_provider_available(&self, provider: LlmProvider) -> bool;

    /// Run a structured-output extraction and return the raw JSON value,
    /// which the caller deserializes against its own schema.
    async fn structured_output(
        &self,
        candidate: &ModelCandidate,
        prompt: &str,
        schema: &Value,
    ) -> anyhow::Result<Value>;
}
