//! Citation quality - does the page back its claims with sources?

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, OnceLock};
use url::Url;

use super::{truncate_content, CONTENT_BUDGET_CHARS};
use crate::domain::{
    AiUsage, EvidenceItem, EvidenceTrail, IssueSeverity, PageContent, ResultParts, RuleIssue,
    RuleResult,
};
use crate::error::Result;
use crate::llm::{LlmClient, ProviderChain};
use crate::rules::score::ScoreCard;
use crate::rules::{Rule, RuleCategory, RuleInfo};

const EXTERNAL_LINKS_POINTS: i32 = 20;
const RICH_CITATIONS_POINTS: i32 = 30;
const SPARSE_CITATIONS_POINTS: i32 = 10;
const AUTHORITATIVE_POINTS: i32 = 30;
const INLINE_ATTRIBUTION_POINTS: i32 = 20;

/// What the model is asked to judge.
#[derive(Debug, Deserialize)]
struct CitationJudgment {
    citation_count: u32,
    /// Fraction of cited sources the model considers authoritative, 0.0-1.0.
    authoritative_ratio: f64,
    has_inline_attribution: bool,
}

/// LLM-backed rule judging how well the page cites its sources.
pub struct CitationQualityRule {
    info: RuleInfo,
    client: Arc<dyn LlmClient>,
    chain: ProviderChain,
    content_budget: usize,
}

impl CitationQualityRule {
    pub fn new(client: Arc<dyn LlmClient>, chain: ProviderChain) -> Self {
        Self {
            info: RuleInfo::new(
                "citation-quality",
                "Citation Quality",
                RuleCategory::Authority,
            )
            .with_impact(3),
            client,
            chain,
            content_budget: CONTENT_BUDGET_CHARS,
        }
    }

    pub fn with_content_budget(mut self, budget: usize) -> Self {
        self.content_budget = budget;
        self
    }

    /// Deterministic pre-LLM signal: outbound links to other hosts.
    fn external_link_count(html: &str, own_host: Option<&str>) -> usize {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("a[href]").unwrap());

        Html::parse_document(html)
            .select(selector)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| Url::parse(href).ok())
            .filter(|link| link.host_str().is_some() && link.host_str() != own_host)
            .count()
    }

    fn prompt(&self, content: &PageContent) -> String {
        let text = truncate_content(&content.clean_content, self.content_budget);
        format!(
            "Assess how well the following page content cites its sources. \
             Count distinct cited sources, judge what fraction of them are \
             authoritative (standards bodies, journals, recognized press), and \
             whether claims carry inline attribution.\n\n\
             PAGE CONTENT:\n{text}"
        )
    }

    fn schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "citation_count": { "type": "integer", "minimum": 0 },
                "authoritative_ratio": { "type": "number", "minimum": 0, "maximum": 1 },
                "has_inline_attribution": { "type": "boolean" }
            },
            "required": ["citation_count", "authoritative_ratio", "has_inline_attribution"]
        })
    }
}

#[async_trait]
impl Rule for CitationQualityRule {
    fn info(&self) -> &RuleInfo {
        &self.info
    }

    async fn evaluate(&self, url: &Url, content: &PageContent) -> Result<RuleResult> {
        let mut trail = EvidenceTrail::new();
        let mut card = ScoreCard::new();
        let mut issues = Vec::new();

        // Deterministic signals first, before any await.
        let external_links = Self::external_link_count(&content.html, url.host_str());
        if external_links > 0 {
            card.add("external links present", EXTERNAL_LINKS_POINTS);
            trail.push(EvidenceItem::success(
                "links",
                format!("{external_links} outbound links found"),
            ));
        } else {
            card.add("no external links", 0);
            trail.push(
                EvidenceItem::warning("links", "No outbound links on the page")
                    .with_target("Link claims to their original sources"),
            );
        }

        let prompt = self.prompt(content);
        let schema = Self::schema();
        log::debug!("[RULE citation-quality] {url}: resolving provider chain");
        let resolved = self.chain.resolve(self.client.as_ref(), &prompt, &schema).await?;

        let ai_usage = AiUsage {
            model_name: resolved.candidate.describe(),
            prompt,
            response: resolved.value.to_string(),
        };

        match serde_json::from_value::<CitationJudgment>(resolved.value) {
            Ok(judgment) => {
                if judgment.citation_count >= 3 {
                    card.add("multiple sources cited", RICH_CITATIONS_POINTS);
                    trail.push(EvidenceItem::success(
                        "citations",
                        format!("Model found {} cited sources", judgment.citation_count),
                    ));
                } else {
                    card.add("few sources cited", SPARSE_CITATIONS_POINTS);
                    trail.push(EvidenceItem::warning(
                        "citations",
                        format!("Only {} cited sources", judgment.citation_count),
                    ));
                    issues.push(RuleIssue::new(
                        "citations-sparse",
                        IssueSeverity::Medium,
                        "Content cites few or no sources",
                        "Cite at least three independent sources for key claims",
                    ));
                }

                if judgment.authoritative_ratio >= 0.5 {
                    card.add("authoritative sources", AUTHORITATIVE_POINTS);
                    trail.push(EvidenceItem::success(
                        "citations",
                        format!(
                            "{:.0}% of sources judged authoritative",
                            judgment.authoritative_ratio * 100.0
                        ),
                    ));
                } else {
                    card.add("weak source authority", 0);
                    trail.push(EvidenceItem::warning(
                        "citations",
                        "Cited sources are mostly non-authoritative",
                    ));
                }

                if judgment.has_inline_attribution {
                    card.add("inline attribution", INLINE_ATTRIBUTION_POINTS);
                    trail.push(EvidenceItem::success(
                        "citations",
                        "Claims carry inline attribution",
                    ));
                } else {
                    card.add("no inline attribution", 0);
                    trail.push(
                        EvidenceItem::info("citations", "No inline attribution detected")
                            .with_target("Name the source next to each significant claim"),
                    );
                }
            }
            Err(e) => {
                // Malformed model output: those components score zero, the
                // deterministic part of the breakdown survives.
                log::warn!("[RULE citation-quality] malformed judgment: {e}");
                card.add("unusable model judgment", 0);
                trail.push(EvidenceItem::error(
                    "citations",
                    format!("Model returned malformed judgment: {e}"),
                ));
            }
        }

        let score = card.total();
        trail.push(card.calculation_evidence());

        Ok(self.build_result_full(
            score,
            ResultParts {
                evidence: trail.freeze(),
                issues,
                ai_usage: Some(ai_usage),
                ..Default::default()
            },
        ))
    }
}
