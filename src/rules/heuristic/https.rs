//! Transport security - non-HTTPS pages are disqualified outright.

use async_trait::async_trait;
use url::Url;

use crate::domain::{
    EvidenceItem, EvidenceTrail, IssueSeverity, PageContent, ResultParts, RuleIssue, RuleResult,
};
use crate::error::Result;
use crate::rules::score::ScoreCard;
use crate::rules::{Rule, RuleCategory, RuleInfo};

const HTTPS_POINTS: i32 = 80;
const HSTS_POINTS: i32 = 10;
const CLEAN_CONTENT_POINTS: i32 = 10;

/// Checks HTTPS, HSTS, and mixed-content status.
///
/// Domain-level: transport security is a property of the site, so the rule
/// applies to every page type.
pub struct HttpsRule {
    info: RuleInfo,
}

impl HttpsRule {
    pub fn new() -> Self {
        Self {
            info: RuleInfo::new("https", "HTTPS Security", RuleCategory::Technical)
                .with_impact(3)
                .domain_level(),
        }
    }
}

impl Default for HttpsRule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Rule for HttpsRule {
    fn info(&self) -> &RuleInfo {
        &self.info
    }

    async fn evaluate(&self, url: &Url, content: &PageContent) -> Result<RuleResult> {
        // Plain HTTP forces zero regardless of any other signal.
        if url.scheme() != "https" {
            log::debug!("[RULE https] {url}: not served over HTTPS");
            let evidence = vec![EvidenceItem::error(
                "transport",
                format!("Page is served over {} instead of HTTPS", url.scheme()),
            )
            .with_target("Serve the site over HTTPS with a valid certificate")];
            let issues = vec![RuleIssue::new(
                "https-missing",
                IssueSeverity::Critical,
                "Page is not served over HTTPS",
                "Obtain a TLS certificate and redirect all HTTP traffic to HTTPS",
            )];
            return Ok(self.build_result_full(
                0,
                ResultParts {
                    evidence,
                    issues,
                    ..Default::default()
                },
            ));
        }

        let mut trail = EvidenceTrail::new();
        let mut card = ScoreCard::new();
        let mut issues = Vec::new();

        card.add("served over https", HTTPS_POINTS);
        trail.push(EvidenceItem::success("transport", "Page is served over HTTPS"));

        let security = content.security_info.clone().unwrap_or_default();

        if security.hsts_header {
            card.add("hsts header present", HSTS_POINTS);
            trail.push(EvidenceItem::success("transport", "HSTS header is set"));
        } else {
            card.add("hsts header missing", 0);
            trail.push(
                EvidenceItem::info("transport", "No HSTS header detected")
                    .with_target("Send Strict-Transport-Security to lock in HTTPS"),
            );
        }

        if security.mixed_content {
            card.add("mixed content", -30);
            trail.push(EvidenceItem::warning(
                "transport",
                "Page loads sub-resources over plain HTTP",
            ));
            issues.push(RuleIssue::new(
                "https-mixed-content",
                IssueSeverity::Medium,
                "Page references insecure sub-resources",
                "Load every script, style, and image over HTTPS",
            ));
        } else {
            card.add("no mixed content", CLEAN_CONTENT_POINTS);
            trail.push(EvidenceItem::success("transport", "No mixed content detected"));
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
