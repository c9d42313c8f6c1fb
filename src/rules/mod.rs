//! Rule contract - the polymorphism seam of the engine.
//!
//! Every scoring rule, whatever its internals (DOM heuristics, third-party
//! lookups, LLM extraction), implements [`Rule`] and funnels its outcome
//! through [`Rule::build_result`]. That single construction path is what
//! keeps ~60 wildly different rules drop-in interchangeable to the registry
//! and aggregator.
//!
//! Rule instances are constructed once at startup with their collaborators
//! injected and hold no per-call mutable state; `evaluate` reads the page,
//! never mutates it.

pub mod heuristic;
pub mod lookup;
pub mod score;
pub mod semantic;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

use crate::domain::{EvidenceItem, PageContent, PageType, ResultParts, RuleResult};
use crate::error::Result;

// ============================================================================
// CATEGORY
// ============================================================================

/// Editorial grouping of rules, used for report subtotals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Technical,
    Content,
    Structure,
    Authority,
    MonitoringKpi,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Technical => "technical",
            RuleCategory::Content => "content",
            RuleCategory::Structure => "structure",
            RuleCategory::Authority => "authority",
            RuleCategory::MonitoringKpi => "monitoring_kpi",
        }
    }

    pub const ALL: [RuleCategory; 5] = [
        RuleCategory::Technical,
        RuleCategory::Content,
        RuleCategory::Structure,
        RuleCategory::Authority,
        RuleCategory::MonitoringKpi,
    ];
}

// ============================================================================
// RULE IDENTITY
// ============================================================================

/// Static configuration of one rule: identity, category, weighting, and
/// applicability. Fixed at construction.
#[derive(Debug, Clone)]
pub struct RuleInfo {
    /// Stable slug, e.g. `"subheading-density"`.
    pub id: String,
    pub name: String,
    pub category: RuleCategory,
    /// Editorial impact, 1-3. Out-of-range values are tolerated and simply
    /// weigh 1.0 (see [`RuleInfo::weight`]).
    pub impact_score: u8,
    /// Page types this rule applies to; empty means every page type.
    pub page_types: HashSet<PageType>,
    /// Domain-level rules judge the whole site/brand and apply to every page.
    pub is_domain_level: bool,
}

impl RuleInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: RuleCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            impact_score: 2,
            page_types: HashSet::new(),
            is_domain_level: false,
        }
    }

    pub fn with_impact(mut self, impact_score: u8) -> Self {
        self.impact_score = impact_score;
        self
    }

    pub fn for_page_types(mut self, types: impl IntoIterator<Item = PageType>) -> Self {
        self.page_types = types.into_iter().collect();
        self
    }

    pub fn domain_level(mut self) -> Self {
        self.is_domain_level = true;
        self
    }

    /// Weight lookup table: 1 -> 0.5, 2 -> 1.0, 3 -> 1.5. Anything else
    /// (misconfigured impact) defaults to 1.0 rather than failing.
    pub fn weight(&self) -> f64 {
        match self.impact_score {
            1 => 0.5,
            2 => 1.0,
            3 => 1.5,
            _ => 1.0,
        }
    }

    /// Applicability predicate. Total: domain-level rules and rules with an
    /// empty page-type set apply everywhere, including to types the rule has
    /// never seen; otherwise membership decides. A page with no classified
    /// type only matches unrestricted rules.
    pub fn applies_to(&self, page_type: Option<&PageType>) -> bool {
        if self.is_domain_level || self.page_types.is_empty() {
            return true;
        }
        match page_type {
            Some(pt) => self.page_types.contains(pt),
            None => false,
        }
    }

    pub fn application_level(&self) -> &'static str {
        if self.is_domain_level {
            "Domain"
        } else {
            "Page"
        }
    }
}

// ============================================================================
// RULE TRAIT
// ============================================================================

/// One independent scoring unit evaluating a single aspect of a page or
/// domain.
///
/// `evaluate` is the sole required operation. It may suspend on network or
/// LLM calls but must not mutate shared state; identical inputs produce the
/// same score (bit-for-bit for heuristic rules, modulo sampling for
/// LLM-backed ones).
#[async_trait]
pub trait Rule: Send + Sync {
    /// Static identity and configuration of this rule.
    fn info(&self) -> &RuleInfo;

    /// Evaluate one page and produce a result via [`Rule::build_result`].
    ///
    /// Rules with a defined degraded state (e.g. external lookups) return
    /// `Ok` with a low score on collaborator failure; rules with no non-AI
    /// fallback return `Err` so the registry can mark them unavailable.
    async fn evaluate(&self, url: &Url, content: &PageContent) -> Result<RuleResult>;

    /// Sanctioned constructor for results. Fixes `max_score = 100`, derives
    /// weight, contribution, and `passed = score >= 60`. Clamping the score
    /// into [0, 100] is the rule's own job before calling in (the
    /// [`score::ScoreCard`] does it for breakdown-based rules).
    fn build_result(&self, score: u32, evidence: Vec<EvidenceItem>) -> RuleResult {
        RuleResult::assemble(
            self.info(),
            score,
            ResultParts {
                evidence,
                ..Default::default()
            },
        )
    }

    /// [`Rule::build_result`] with issues, recommendations, details, and AI
    /// usage attached.
    fn build_result_full(&self, score: u32, parts: ResultParts) -> RuleResult {
        RuleResult::assemble(self.info(), score, parts)
    }
}

// ============================================================================
// STANDARD RULE SET
// ============================================================================

/// Construct the built-in rules with their collaborators wired from `config`.
///
/// The embedding service registers these (plus any custom rules) into a
/// [`crate::registry::RuleRegistry`] once at startup.
pub fn standard_rules(
    config: &crate::config::EngineConfig,
    llm_client: std::sync::Arc<dyn crate::llm::LlmClient>,
) -> Vec<std::sync::Arc<dyn Rule>> {
    vec![
        std::sync::Arc::new(heuristic::SubheadingDensityRule::new()),
        std::sync::Arc::new(heuristic::MetaDescriptionRule::new()),
        std::sync::Arc::new(heuristic::ImageAltRule::new()),
        std::sync::Arc::new(heuristic::HttpsRule::new()),
        std::sync::Arc::new(
            lookup::WikipediaPresenceRule::new().with_timeout(config.lookup_timeout),
        ),
        std::sync::Arc::new(
            semantic::CitationQualityRule::new(llm_client.clone(), config.provider_chain.clone())
                .with_content_budget(config.llm_content_budget),
        ),
        std::sync::Arc::new(
            semantic::DefinitionalContentRule::new(llm_client, config.provider_chain.clone())
                .with_content_budget(config.llm_content_budget),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> RuleInfo {
        RuleInfo::new("test-rule", "Test Rule", RuleCategory::Content)
    }

    #[test]
    fn weight_table_is_exact() {
        assert_eq!(info().with_impact(1).weight(), 0.5);
        assert_eq!(info().with_impact(2).weight(), 1.0);
        assert_eq!(info().with_impact(3).weight(), 1.5);
    }

    #[test]
    fn out_of_range_impact_defaults_to_weight_one() {
        assert_eq!(info().with_impact(0).weight(), 1.0);
        assert_eq!(info().with_impact(4).weight(), 1.0);
        assert_eq!(info().with_impact(255).weight(), 1.0);
    }

    #[test]
    fn domain_level_rule_applies_to_every_page_type() {
        let rule = info()
            .for_page_types([PageType::Article])
            .domain_level();
        assert!(rule.applies_to(Some(&PageType::Homepage)));
        assert!(rule.applies_to(Some(&PageType::Other("brand_new_type".into()))));
        assert!(rule.applies_to(None));
    }

    #[test]
    fn empty_page_type_set_applies_everywhere() {
        let rule = info();
        assert!(rule.applies_to(Some(&PageType::Product)));
        assert!(rule.applies_to(None));
    }

    #[test]
    fn restricted_rule_requires_membership() {
        let rule = info().for_page_types([PageType::Article, PageType::Faq]);
        assert!(rule.applies_to(Some(&PageType::Article)));
        assert!(rule.applies_to(Some(&PageType::Faq)));
        assert!(!rule.applies_to(Some(&PageType::Homepage)));
        assert!(!rule.applies_to(None));
    }

    #[test]
    fn application_level_label() {
        assert_eq!(info().application_level(), "Page");
        assert_eq!(info().domain_level().application_level(), "Domain");
    }
}
