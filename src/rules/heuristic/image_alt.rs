//! Image alt coverage - can answer engines read the page's images?

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

// Coverage bands (fraction of images with alt text, strict lower bounds).
const BAND_FULL: f64 = 1.0;
const BAND_HIGH: f64 = 0.8;
const BAND_HALF: f64 = 0.5;

/// Scores alt-attribute coverage across all `<img>` elements.
pub struct ImageAltRule {
    info: RuleInfo,
}

struct AltCoverage {
    total: usize,
    with_alt: usize,
    missing_srcs: Vec<String>,
}

impl ImageAltRule {
    pub fn new() -> Self {
        Self {
            info: RuleInfo::new("image-alt", "Image Alt Coverage", RuleCategory::Content)
                .with_impact(2),
        }
    }

    fn coverage(html: &str) -> AltCoverage {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("img").unwrap());

        let document = Html::parse_document(html);
        let mut total = 0;
        let mut with_alt = 0;
        let mut missing_srcs = Vec::new();

        for img in document.select(selector) {
            total += 1;
            let alt = img.value().attr("alt");
            if alt.map(|a| !a.trim().is_empty()).unwrap_or(false) {
                with_alt += 1;
            } else {
                missing_srcs.push(img.value().attr("src").unwrap_or("(no src)").to_string());
            }
        }

        AltCoverage {
            total,
            with_alt,
            missing_srcs,
        }
    }
}

impl Default for ImageAltRule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Rule for ImageAltRule {
    fn info(&self) -> &RuleInfo {
        &self.info
    }

    async fn evaluate(&self, url: &Url, content: &PageContent) -> Result<RuleResult> {
        let coverage = Self::coverage(&content.html);
        log::debug!(
            "[RULE image-alt] {url}: {}/{} images with alt",
            coverage.with_alt,
            coverage.total
        );

        // No images means nothing to fix: full marks, no breakdown needed.
        if coverage.total == 0 {
            let evidence = vec![EvidenceItem::info("images", "No images found on page")];
            return Ok(self.build_result(100, evidence));
        }

        let mut trail = EvidenceTrail::new();
        let mut card = ScoreCard::new();
        let mut issues = Vec::new();

        let ratio = coverage.with_alt as f64 / coverage.total as f64;
        let (points, label) = if ratio >= BAND_FULL {
            (100, "all images have alt text")
        } else if ratio >= BAND_HIGH {
            (70, "most images have alt text (>=80%)")
        } else if ratio >= BAND_HALF {
            (40, "half of images have alt text (>=50%)")
        } else {
            (10, "most images lack alt text (<50%)")
        };
        card.add(label, points);

        if coverage.missing_srcs.is_empty() {
            trail.push(EvidenceItem::success(
                "images",
                format!("{}/{} images have alt text", coverage.with_alt, coverage.total),
            ));
        } else {
            let missing = coverage.missing_srcs.len();
            trail.push(
                EvidenceItem::warning(
                    "images",
                    format!(
                        "{missing} of {} images missing alt text",
                        coverage.total
                    ),
                )
                .with_target("Give every content image a descriptive alt attribute")
                .with_code(coverage.missing_srcs.join("\n")),
            );
            let severity = if ratio < BAND_HALF {
                IssueSeverity::High
            } else {
                IssueSeverity::Medium
            };
            issues.push(
                RuleIssue::new(
                    "image-alt-missing",
                    severity,
                    format!("{missing} images have no alt text"),
                    "Add alt attributes describing each image's content",
                )
                .with_affected_elements(coverage.missing_srcs),
            );
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
