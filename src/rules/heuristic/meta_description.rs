//! Meta description quality - length band, stuffing, uniqueness.

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::OnceLock;
use url::Url;

use crate::domain::{
    EvidenceItem, EvidenceTrail, IssueSeverity, PageContent, ResultParts, RuleIssue, RuleResult,
};
use crate::error::Result;
use crate::rules::score::ScoreCard;
use crate::rules::{Rule, RuleCategory, RuleInfo};

// Length bands in characters (inclusive optimal range).
const MIN_OPTIMAL_LEN: usize = 70;
const MAX_OPTIMAL_LEN: usize = 160;

/// A word repeated this many times in one description is stuffing.
const STUFFING_REPEATS: usize = 4;

const OPTIMAL_LENGTH_POINTS: i32 = 60;
const SHORT_LENGTH_POINTS: i32 = 30;
const LONG_LENGTH_POINTS: i32 = 40;
const NO_STUFFING_POINTS: i32 = 20;
const UNIQUENESS_POINTS: i32 = 20;

/// Scores the page's meta description for answer-engine snippet quality.
pub struct MetaDescriptionRule {
    info: RuleInfo,
}

impl MetaDescriptionRule {
    pub fn new() -> Self {
        Self {
            info: RuleInfo::new(
                "meta-description",
                "Meta Description Quality",
                RuleCategory::Content,
            )
            .with_impact(3),
        }
    }

    fn extract(html: &str) -> (Option<String>, Option<String>, Option<String>) {
        static DESC: OnceLock<Selector> = OnceLock::new();
        static TITLE: OnceLock<Selector> = OnceLock::new();
        static H1: OnceLock<Selector> = OnceLock::new();
        let desc_sel = DESC.get_or_init(|| Selector::parse("meta[name='description']").unwrap());
        let title_sel = TITLE.get_or_init(|| Selector::parse("title").unwrap());
        let h1_sel = H1.get_or_init(|| Selector::parse("h1").unwrap());

        let document = Html::parse_document(html);
        let description = document
            .select(desc_sel)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let title = document
            .select(title_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty());
        let h1 = document
            .select(h1_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty());

        (description, title, h1)
    }

    /// Most-repeated meaningful word, if any word crosses the stuffing bar.
    fn stuffed_keyword(description: &str) -> Option<(String, usize)> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for word in description
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 3)
        {
            *counts.entry(word.to_string()).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .filter(|(_, n)| *n >= STUFFING_REPEATS)
            .max_by_key(|(_, n)| *n)
    }
}

impl Default for MetaDescriptionRule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Rule for MetaDescriptionRule {
    fn info(&self) -> &RuleInfo {
        &self.info
    }

    async fn evaluate(&self, url: &Url, content: &PageContent) -> Result<RuleResult> {
        let (description, title, h1) = Self::extract(&content.html);

        let mut trail = EvidenceTrail::new();
        let mut card = ScoreCard::new();
        let mut issues = Vec::new();

        let Some(description) = description else {
            log::debug!("[RULE meta-description] {url}: missing");
            card.add("missing meta description", 0);
            trail.push(
                EvidenceItem::error("meta", "Page has no meta description")
                    .with_target("Add a 70-160 character meta description summarizing the page"),
            );
            issues.push(RuleIssue::new(
                "meta-description-missing",
                IssueSeverity::High,
                "Page has no meta description",
                "Add a meta description so answer engines can quote a summary",
            ));
            let score = card.total();
            trail.push(card.calculation_evidence());
            return Ok(self.build_result_full(
                score,
                ResultParts {
                    evidence: trail.freeze(),
                    issues,
                    ..Default::default()
                },
            ));
        };

        let len = description.chars().count();
        log::debug!("[RULE meta-description] {url}: {len} chars");

        // Length band (strict pre-declared bounds, no interpolation).
        if len < MIN_OPTIMAL_LEN {
            card.add("description too short", SHORT_LENGTH_POINTS);
            trail.push(
                EvidenceItem::warning(
                    "length",
                    format!("Description is {len} chars (recommend {MIN_OPTIMAL_LEN}-{MAX_OPTIMAL_LEN})"),
                )
                .with_code(description.clone()),
            );
            issues.push(RuleIssue::new(
                "meta-description-short",
                IssueSeverity::Medium,
                format!("Meta description is only {len} characters"),
                "Expand the description toward 70-160 characters",
            ));
        } else if len <= MAX_OPTIMAL_LEN {
            card.add("optimal length", OPTIMAL_LENGTH_POINTS);
            trail.push(EvidenceItem::success(
                "length",
                format!("Description length is optimal ({len} chars)"),
            ));
        } else {
            card.add("description too long", LONG_LENGTH_POINTS);
            trail.push(
                EvidenceItem::warning(
                    "length",
                    format!("Description is {len} chars and will be truncated in snippets"),
                )
                .with_code(description.clone()),
            );
            issues.push(RuleIssue::new(
                "meta-description-long",
                IssueSeverity::Low,
                format!("Meta description is {len} characters"),
                "Trim the description to at most 160 characters",
            ));
        }

        // Keyword stuffing.
        match Self::stuffed_keyword(&description) {
            Some((word, count)) => {
                card.add("keyword stuffing", -15);
                trail.push(
                    EvidenceItem::warning(
                        "stuffing",
                        format!("Word '{word}' repeated {count} times"),
                    )
                    .with_target("Write naturally; repeat no keyword more than a few times"),
                );
                issues.push(RuleIssue::new(
                    "meta-description-stuffing",
                    IssueSeverity::Medium,
                    format!("Meta description repeats '{word}' {count} times"),
                    "Rewrite the description without keyword stuffing",
                ));
            }
            None => {
                card.add("no keyword stuffing", NO_STUFFING_POINTS);
                trail.push(EvidenceItem::success("stuffing", "No keyword stuffing detected"));
            }
        }

        // Uniqueness against title and H1.
        let duplicates_of = |other: &Option<String>| {
            other
                .as_deref()
                .map(|o| o.trim().eq_ignore_ascii_case(description.trim()))
                .unwrap_or(false)
        };
        if duplicates_of(&title) || duplicates_of(&h1) {
            card.add("duplicates title or h1", -10);
            trail.push(
                EvidenceItem::warning("uniqueness", "Description duplicates the title or H1")
                    .with_target("Write a description distinct from the title and H1"),
            );
        } else {
            card.add("unique vs title and h1", UNIQUENESS_POINTS);
            trail.push(EvidenceItem::success(
                "uniqueness",
                "Description is distinct from title and H1",
            ));
        }

        let score = card.total();
        trail.push(card.calculation_evidence());

        Ok(self.build_result_full(
            score,
            ResultParts {
                evidence: trail.freeze(),
                issues,
                ..Default::default()
            },
        ))
    }
}
