//! Engine configuration.

use std::time::Duration;

use crate::llm::{LlmProvider, ModelCandidate, ProviderChain};

/// Tunables for one engine instance. Fixed after construction.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How many rules may be in flight at once during `evaluate_all`.
    /// Bounded to respect LLM provider quotas; heuristic rules finish
    /// inline regardless.
    pub max_concurrent_rules: usize,
    /// Per-request timeout for third-party lookups (Wikipedia etc.).
    pub lookup_timeout: Duration,
    /// Character budget for page text embedded in LLM prompts.
    pub llm_content_budget: usize,
    /// Default provider fallback chain for LLM-backed rules.
    pub provider_chain: ProviderChain,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_rules: 4,
            lookup_timeout: Duration::from_secs(10),
            llm_content_budget: 12_000,
            provider_chain: ProviderChain::new(vec![
                ModelCandidate::new(LlmProvider::OpenAi, "gpt-4o-mini"),
                ModelCandidate::new(LlmProvider::Anthropic, "claude-sonnet-4-0"),
                ModelCandidate::new(LlmProvider::Perplexity, "sonar").with_web_access(),
            ]),
        }
    }
}
