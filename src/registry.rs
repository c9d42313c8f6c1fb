//! Rule registry and batch evaluation.
//!
//! The registry owns the full set of rule instances (constructed once at
//! startup with their collaborators injected), filters them by applicability,
//! and runs them with bounded concurrency. Its contract: one `RuleOutcome`
//! per applicable rule, always - a failing rule becomes an explicit
//! `Unavailable` marker, never a bubbled error and never a missing entry.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use url::Url;

use crate::config::EngineConfig;
use crate::domain::{PageContent, PageType, RuleOutcome};
use crate::error::{EngineError, Result};
use crate::rules::Rule;

pub struct RuleRegistry {
    rules: Vec<Arc<dyn Rule>>,
    max_concurrent: usize,
}

impl RuleRegistry {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            rules: Vec::new(),
            // A zero limit would deadlock buffer_unordered.
            max_concurrent: config.max_concurrent_rules.max(1),
        }
    }

    /// Add a rule. Duplicate ids are rejected outright: silent shadowing
    /// would make two rules' contributions indistinguishable in the trail.
    pub fn register(&mut self, rule: Arc<dyn Rule>) -> Result<()> {
        let id = &rule.info().id;
        if self.rules.iter().any(|r| &r.info().id == id) {
            return Err(EngineError::DuplicateRule(id.clone()));
        }
        log::debug!("[REGISTRY] Registered rule '{id}'");
        self.rules.push(rule);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    /// Rules applicable to the given page type (domain-level and
    /// unrestricted rules always qualify).
    pub fn select_applicable(&self, page_type: Option<&PageType>) -> Vec<Arc<dyn Rule>> {
        self.rules
            .iter()
            .filter(|rule| rule.info().applies_to(page_type))
            .cloned()
            .collect()
    }

    /// Evaluate every applicable rule against one page.
    ///
    /// Rules run with bounded concurrency (`max_concurrent_rules`); outcome
    /// order follows completion and carries no meaning - the aggregator
    /// combines results commutatively. Per-rule failures are isolated into
    /// `RuleOutcome::Unavailable`.
    pub async fn evaluate_all(&self, content: &PageContent) -> Result<Vec<RuleOutcome>> {
        let url = Url::parse(&content.url)
            .map_err(|e| EngineError::InvalidUrl(format!("{}: {e}", content.url)))?;

        let applicable = self.select_applicable(content.page_type.as_ref());
        log::info!(
            "[REGISTRY] Evaluating {}/{} rules for {}",
            applicable.len(),
            self.rules.len(),
            content.url
        );

        let url_ref = &url;
        let outcomes: Vec<RuleOutcome> = stream::iter(applicable)
            .map(|rule| async move {
                let info = rule.info();
                let (rule_id, rule_name) = (info.id.clone(), info.name.clone());
                match rule.evaluate(url_ref, content).await {
                    Ok(result) => {
                        log::debug!(
                            "[REGISTRY] Rule '{rule_id}' scored {} for {}",
                            result.score,
                            content.url
                        );
                        RuleOutcome::Evaluated(result)
                    }
                    Err(e) => {
                        log::error!(
                            "[REGISTRY] Rule '{rule_id}' unavailable for {}: {e}",
                            content.url
                        );
                        RuleOutcome::Unavailable {
                            rule_id,
                            rule_name,
                            error: e.to_string(),
                        }
                    }
                }
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EvidenceItem, RuleResult};
    use crate::rules::{RuleCategory, RuleInfo};
    use async_trait::async_trait;

    /// Fixed-score rule for registry behavior tests.
    struct StubRule {
        info: RuleInfo,
        score: u32,
        fail: bool,
    }

    impl StubRule {
        fn scored(id: &str, score: u32) -> Arc<dyn Rule> {
            Arc::new(Self {
                info: RuleInfo::new(id, id, RuleCategory::Content),
                score,
                fail: false,
            })
        }

        fn failing(id: &str) -> Arc<dyn Rule> {
            Arc::new(Self {
                info: RuleInfo::new(id, id, RuleCategory::Content),
                score: 0,
                fail: true,
            })
        }
    }

    #[async_trait]
    impl Rule for StubRule {
        fn info(&self) -> &RuleInfo {
            &self.info
        }

        async fn evaluate(&self, _url: &Url, _content: &PageContent) -> crate::error::Result<RuleResult> {
            if self.fail {
                return Err(EngineError::rule(self.info.id.clone(), "synthetic failure"));
            }
            Ok(self.build_result(self.score, vec![EvidenceItem::info("stub", "ok")]))
        }
    }

    fn page() -> PageContent {
        PageContent::new("https://example.com", "<html></html>", "text")
    }

    fn registry() -> RuleRegistry {
        RuleRegistry::new(&EngineConfig::default())
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut registry = registry();
        registry.register(StubRule::scored("dup", 50)).unwrap();
        let err = registry.register(StubRule::scored("dup", 80)).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateRule(id) if id == "dup"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn select_applicable_filters_by_page_type() {
        let mut registry = registry();
        registry
            .register(Arc::new(StubRule {
                info: RuleInfo::new("article-only", "Article Only", RuleCategory::Content)
                    .for_page_types([PageType::Article]),
                score: 50,
                fail: false,
            }))
            .unwrap();
        registry.register(StubRule::scored("everywhere", 50)).unwrap();

        assert_eq!(registry.select_applicable(Some(&PageType::Article)).len(), 2);
        assert_eq!(registry.select_applicable(Some(&PageType::Homepage)).len(), 1);
        assert_eq!(registry.select_applicable(None).len(), 1);
    }

    #[tokio::test]
    async fn one_failing_rule_does_not_abort_the_batch() {
        let mut registry = registry();
        registry.register(StubRule::scored("a", 90)).unwrap();
        registry.register(StubRule::scored("b", 80)).unwrap();
        registry.register(StubRule::failing("c")).unwrap();
        registry.register(StubRule::scored("d", 70)).unwrap();
        registry.register(StubRule::scored("e", 60)).unwrap();

        let outcomes = registry.evaluate_all(&page()).await.unwrap();

        assert_eq!(outcomes.len(), 5);
        let unavailable: Vec<_> = outcomes.iter().filter(|o| o.is_unavailable()).collect();
        assert_eq!(unavailable.len(), 1);
        assert_eq!(unavailable[0].rule_id(), "c");
    }

    #[tokio::test]
    async fn invalid_page_url_is_rejected_before_any_rule_runs() {
        let mut registry = registry();
        registry.register(StubRule::scored("a", 90)).unwrap();

        let content = PageContent::new("not a url", "<html></html>", "");
        let err = registry.evaluate_all(&content).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidUrl(_)));
    }
}
