//! Wikipedia presence - does the brand exist in the world's reference work?

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::domain::{
    EvidenceItem, EvidenceTrail, IssueSeverity, PageContent, ResultParts, RuleIssue, RuleResult,
};
use crate::error::Result;
use crate::rules::score::ScoreCard;
use crate::rules::{Rule, RuleCategory, RuleInfo};

/// Reference timeout for third-party lookups.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";

/// Any relevant presence at all is worth at least this much.
const PRESENCE_FLOOR: i32 = 20;

const EXACT_TITLE_POINTS: i32 = 60;
const PER_RELEVANT_RESULT_POINTS: i32 = 10;
const MAX_RELEVANT_COUNTED: usize = 4;

// ====== API response shape ======

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
    #[serde(default)]
    snippet: String,
}

// ====== Rule ======

/// Domain-level authority rule: searches Wikipedia for the brand and scores
/// only the relevance-filtered subset of hits.
pub struct WikipediaPresenceRule {
    info: RuleInfo,
    client: Client,
    endpoint: String,
    brand_name: Option<String>,
}

impl WikipediaPresenceRule {
    pub fn new() -> Self {
        Self {
            info: RuleInfo::new(
                "wikipedia-presence",
                "Wikipedia Presence",
                RuleCategory::Authority,
            )
            .with_impact(2)
            .domain_level(),
            client: Client::builder()
                .timeout(LOOKUP_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            brand_name: None,
        }
    }

    /// Use a different per-request timeout (rebuilds the HTTP client).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        self
    }

    /// Fix the brand name instead of deriving it from the page host.
    pub fn with_brand_name(mut self, brand: impl Into<String>) -> Self {
        self.brand_name = Some(brand.into());
        self
    }

    /// Point the rule at a different API endpoint (tests, mirrors).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Brand heuristic: configured name, else the registrable label of the
    /// page host ("acme" from "www.acme.com").
    fn brand_for(&self, url: &Url) -> String {
        if let Some(brand) = &self.brand_name {
            return brand.clone();
        }
        url.host_str()
            .map(|host| {
                let host = host.strip_prefix("www.").unwrap_or(host);
                host.split('.').next().unwrap_or(host).to_string()
            })
            .unwrap_or_default()
    }

    async fn search(&self, brand: &str) -> anyhow::Result<Vec<SearchHit>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", brand),
                ("format", "json"),
                ("srlimit", "10"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: SearchResponse = response.json().await?;
        Ok(body.query.map(|q| q.search).unwrap_or_default())
    }

    /// Relevance filter: the brand must appear in the title or snippet.
    /// Scoring from the filtered subset keeps unrelated same-named entities
    /// from inflating the result.
    fn relevant<'a>(brand: &str, hits: &'a [SearchHit]) -> Vec<&'a SearchHit> {
        let needle = brand.to_lowercase();
        hits.iter()
            .filter(|hit| {
                hit.title.to_lowercase().contains(&needle)
                    || hit.snippet.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

impl Default for WikipediaPresenceRule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Rule for WikipediaPresenceRule {
    fn info(&self) -> &RuleInfo {
        &self.info
    }

    async fn evaluate(&self, url: &Url, _content: &PageContent) -> Result<RuleResult> {
        let brand = self.brand_for(url);
        if brand.is_empty() {
            let evidence = vec![EvidenceItem::error(
                "wikipedia",
                "Could not derive a brand name from the page URL",
            )];
            return Ok(self.build_result(0, evidence));
        }

        log::debug!("[RULE wikipedia-presence] {url}: searching for '{brand}'");

        let hits = match self.search(&brand).await {
            Ok(hits) => hits,
            Err(e) => {
                // Degraded mode: the lookup failing is not the rule failing.
                log::warn!("[RULE wikipedia-presence] lookup failed: {e:#}");
                let evidence = vec![EvidenceItem::error(
                    "wikipedia",
                    format!("Wikipedia lookup failed: {e}"),
                )];
                return Ok(self.build_result(0, evidence));
            }
        };

        let relevant = Self::relevant(&brand, &hits);
        let mut trail = EvidenceTrail::new();
        trail.push(EvidenceItem::info(
            "wikipedia",
            format!(
                "Search returned {} hits, {} relevant to '{brand}'",
                hits.len(),
                relevant.len()
            ),
        ));

        if relevant.is_empty() {
            trail.push(
                EvidenceItem::warning("wikipedia", "No relevant Wikipedia coverage found")
                    .with_target("Build notability: press coverage, citations, a Wikipedia article"),
            );
            let issues = vec![RuleIssue::new(
                "wikipedia-absent",
                IssueSeverity::Medium,
                "Brand has no relevant Wikipedia presence",
                "Establish third-party coverage that supports a Wikipedia article",
            )];
            return Ok(self.build_result_full(
                0,
                ResultParts {
                    evidence: trail.freeze(),
                    issues,
                    ..Default::default()
                },
            ));
        }

        let mut card = ScoreCard::new().with_floor(PRESENCE_FLOOR);

        let exact = relevant
            .iter()
            .find(|hit| hit.title.eq_ignore_ascii_case(&brand));
        if let Some(hit) = exact {
            card.add("dedicated article with matching title", EXACT_TITLE_POINTS);
            trail.push(
                EvidenceItem::success("wikipedia", format!("Found dedicated article '{}'", hit.title))
                    .with_code(hit.title.clone()),
            );
        }

        let counted = relevant.len().min(MAX_RELEVANT_COUNTED);
        card.add(
            format!("{counted} relevant search results"),
            counted as i32 * PER_RELEVANT_RESULT_POINTS,
        );
        for hit in relevant.iter().take(MAX_RELEVANT_COUNTED) {
            trail.push(EvidenceItem::info("wikipedia", format!("Relevant: {}", hit.title)));
        }

        let score = card.total();
        trail.push(card.calculation_evidence());

        Ok(self.build_result_full(
            score,
            ResultParts {
                evidence: trail.freeze(),
                ..Default::default()
            },
        ))
    }
}
