//! Subheading density - are long texts broken up for answer engines?

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::sync::OnceLock;
use url::Url;

use crate::domain::{
    EvidenceItem, EvidenceTrail, IssueSeverity, PageContent, ResultParts, RuleIssue, RuleResult,
};
use crate::error::Result;
use crate::rules::score::ScoreCard;
use crate::rules::{Rule, RuleCategory, RuleInfo};

// Density bands in words per subheading (strict upper bounds).
const BAND_EXCELLENT: usize = 100;
const BAND_GOOD: usize = 199;
const BAND_FAIR: usize = 300;

/// Pages under this many words are fine without any subheadings.
const SHORT_CONTENT_WORDS: usize = 300;

const SUBHEADINGS_PRESENT_POINTS: i32 = 40;

/// Scores how well subheadings (h2/h3) segment the visible text.
pub struct SubheadingDensityRule {
    info: RuleInfo,
}

impl SubheadingDensityRule {
    pub fn new() -> Self {
        Self {
            info: RuleInfo::new(
                "subheading-density",
                "Subheading Density",
                RuleCategory::Structure,
            )
            .with_impact(2),
        }
    }

    fn count_subheadings(html: &str) -> usize {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("h2, h3").unwrap());
        Html::parse_document(html).select(selector).count()
    }

    /// Band points for words-per-subheading density.
    fn density_points(words_per_heading: usize) -> (i32, &'static str) {
        if words_per_heading <= BAND_EXCELLENT {
            (60, "excellent density (<=100 words per subheading)")
        } else if words_per_heading <= BAND_GOOD {
            (40, "good density (<=199 words per subheading)")
        } else if words_per_heading <= BAND_FAIR {
            (20, "fair density (<=300 words per subheading)")
        } else {
            (0, "poor density (>300 words per subheading)")
        }
    }
}

impl Default for SubheadingDensityRule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Rule for SubheadingDensityRule {
    fn info(&self) -> &RuleInfo {
        &self.info
    }

    async fn evaluate(&self, url: &Url, content: &PageContent) -> Result<RuleResult> {
        let words = content.word_count();
        let subheadings = Self::count_subheadings(&content.html);
        log::debug!(
            "[RULE subheading-density] {url}: {words} words, {subheadings} subheadings"
        );

        let mut trail = EvidenceTrail::new();
        let mut card = ScoreCard::new();
        let mut issues = Vec::new();

        if subheadings == 0 {
            if words <= SHORT_CONTENT_WORDS {
                card.add("short content, subheadings optional", 70);
                trail.push(EvidenceItem::info(
                    "structure",
                    format!("{words} words with no subheadings; short content does not require them"),
                ));
            } else {
                card.add("no subheadings on long content", 10);
                trail.push(
                    EvidenceItem::warning(
                        "structure",
                        format!("{words} words without a single h2/h3"),
                    )
                    .with_target("Break the text into sections with descriptive h2/h3 headings"),
                );
                issues.push(RuleIssue::new(
                    "subheadings-missing",
                    IssueSeverity::High,
                    "Long-form content has no subheadings",
                    "Add h2/h3 headings roughly every 100-200 words",
                ));
            }
        } else {
            card.add("subheadings present", SUBHEADINGS_PRESENT_POINTS);
            trail.push(EvidenceItem::success(
                "structure",
                format!("Found {subheadings} subheadings for {words} words"),
            ));

            let words_per_heading = words / subheadings;
            let (points, label) = Self::density_points(words_per_heading);
            card.add(label, points);
            trail.push(
                EvidenceItem::info(
                    "density",
                    format!("{words_per_heading} words per subheading"),
                )
                .with_score(points),
            );

            if points == 0 {
                issues.push(RuleIssue::new(
                    "subheadings-sparse",
                    IssueSeverity::Medium,
                    "Sections are too long between subheadings",
                    "Aim for at most 300 words per subheading",
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
                ..Default::default()
            },
        ))
    }
}
