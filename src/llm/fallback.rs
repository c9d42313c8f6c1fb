//! Ordered provider fallback resolution.
//!
//! A [`ProviderChain`] tries each candidate in order: unavailable providers
//! are skipped without counting as failures, the first success wins, and an
//! exhausted chain propagates the last real error. This is plain ordered
//! fallback, not a circuit breaker: no cooldown state survives between calls,
//! every resolution starts the list fresh.

use log::{debug, warn};
use serde_json::Value;

use super::{LlmClient, ModelCandidate};
use crate::error::{EngineError, Result};

/// Successful resolution: the structured output plus which candidate produced
/// it, kept for the `AiUsage` audit record.
#[derive(Debug, Clone)]
pub struct ResolvedOutput {
    pub value: Value,
    pub candidate: ModelCandidate,
}

/// An ordered list of (provider, model) candidates tried until one succeeds.
#[derive(Debug, Clone, Default)]
pub struct ProviderChain {
    candidates: Vec<ModelCandidate>,
}

impl ProviderChain {
    pub fn new(candidates: Vec<ModelCandidate>) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &[ModelCandidate] {
        &self.candidates
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Walk the chain against `client` until a candidate returns output.
    ///
    /// Errors:
    /// - `NoProviderAvailable` if every candidate was skipped as unavailable
    ///   (or the chain is empty),
    /// - `AllProvidersFailed` carrying the last attempted candidate and its
    ///   error if at least one call was made and all of them failed.
    pub async fn resolve(
        &self,
        client: &dyn LlmClient,
        prompt: &str,
        schema: &Value,
    ) -> Result<ResolvedOutput> {
        let mut last_error: Option<(ModelCandidate, anyhow::Error)> = None;

        for candidate in &self.candidates {
            if !client.is_provider_available(candidate.provider) {
                debug!("[LLM] Skipping unavailable provider: {}", candidate.describe());
                continue;
            }

            debug!("[LLM] Attempting {}", candidate.describe());
            match client.structured_output(candidate, prompt, schema).await {
                Ok(value) => {
                    debug!("[LLM] {} succeeded", candidate.describe());
                    return Ok(ResolvedOutput {
                        value,
                        candidate: candidate.clone(),
                    });
                }
                Err(e) => {
                    warn!("[LLM] {} failed: {e:#}", candidate.describe());
                    last_error = Some((candidate.clone(), e));
                }
            }
        }

        match last_error {
            Some((candidate, error)) => Err(EngineError::providers_exhausted(&candidate, &error)),
            None => Err(EngineError::NoProviderAvailable {
                chain_len: self.candidates.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmProvider;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test double: scripted availability and per-call outcomes.
    struct ScriptedClient {
        unavailable: Vec<LlmProvider>,
        fail_first_n: usize,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(unavailable: Vec<LlmProvider>, fail_first_n: usize) -> Self {
            Self {
                unavailable,
                fail_first_n,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        fn is_provider_available(&self, provider: LlmProvider) -> bool {
            !self.unavailable.contains(&provider)
        }

        async fn structured_output(
            &self,
            candidate: &ModelCandidate,
            _prompt: &str,
            _schema: &Value,
        ) -> anyhow::Result<Value> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first_n {
                anyhow::bail!("simulated outage of {}", candidate.describe());
            }
            Ok(json!({ "ok": true, "model": candidate.model }))
        }
    }

    fn chain() -> ProviderChain {
        ProviderChain::new(vec![
            ModelCandidate::new(LlmProvider::OpenAi, "gpt-4o-mini"),
            ModelCandidate::new(LlmProvider::Anthropic, "claude-sonnet"),
            ModelCandidate::new(LlmProvider::Perplexity, "sonar").with_web_access(),
        ])
    }

    #[tokio::test]
    async fn first_available_candidate_wins() {
        let client = ScriptedClient::new(vec![], 0);
        let out = chain()
            .resolve(&client, "prompt", &json!({}))
            .await
            .unwrap();
        assert_eq!(out.candidate.model, "gpt-4o-mini");
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn unavailable_providers_are_skipped_without_a_call() {
        let client = ScriptedClient::new(vec![LlmProvider::OpenAi], 0);
        let out = chain()
            .resolve(&client, "prompt", &json!({}))
            .await
            .unwrap();
        assert_eq!(out.candidate.provider, LlmProvider::Anthropic);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn failure_falls_through_to_next_candidate() {
        let client = ScriptedClient::new(vec![], 1);
        let out = chain()
            .resolve(&client, "prompt", &json!({}))
            .await
            .unwrap();
        assert_eq!(out.candidate.provider, LlmProvider::Anthropic);
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn exhausted_chain_attempts_every_candidate_and_names_the_last() {
        let client = ScriptedClient::new(vec![], usize::MAX);
        let err = chain()
            .resolve(&client, "prompt", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(client.call_count(), 3);
        match err {
            EngineError::AllProvidersFailed { last_candidate, .. } => {
                assert_eq!(last_candidate, "perplexity/sonar");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn all_unavailable_yields_no_provider_error() {
        let client = ScriptedClient::new(
            vec![
                LlmProvider::OpenAi,
                LlmProvider::Anthropic,
                LlmProvider::Perplexity,
            ],
            0,
        );
        let err = chain()
            .resolve(&client, "prompt", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(client.call_count(), 0);
        assert!(matches!(
            err,
            EngineError::NoProviderAvailable { chain_len: 3 }
        ));
    }

    #[tokio::test]
    async fn empty_chain_is_no_provider() {
        let client = ScriptedClient::new(vec![], 0);
        let err = ProviderChain::default()
            .resolve(&client, "prompt", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::NoProviderAvailable { chain_len: 0 }
        ));
    }
}
