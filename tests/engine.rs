//! End-to-end engine tests: registry selection, bounded evaluation, failure
//! isolation, and weighted report aggregation over the built-in rules.

use std::sync::Arc;

use async_trait::async_trait;
use mockito::Matcher;
use serde_json::{json, Value};
use url::Url;

use aeo_engine::domain::{EvidenceKind, IssueSeverity, PageContent, PageType, RuleOutcome};
use aeo_engine::llm::{LlmClient, LlmProvider, ModelCandidate, ProviderChain};
use aeo_engine::rules::heuristic::{HttpsRule, ImageAltRule, MetaDescriptionRule, SubheadingDensityRule};
use aeo_engine::rules::lookup::WikipediaPresenceRule;
use aeo_engine::rules::semantic::{CitationQualityRule, DefinitionalContentRule};
use aeo_engine::{EngineConfig, PageReport, Rule, RuleRegistry};

// ============================================================================
// TEST DOUBLES
// ============================================================================

/// Answers every structured-output call with a judgment matching the
/// requested schema.
struct HelpfulClient;

#[async_trait]
impl LlmClient for HelpfulClient {
    fn is_provider_available(&self, _provider: LlmProvider) -> bool {
        true
    }

    async fn structured_output(
        &self,
        _candidate: &ModelCandidate,
        _prompt: &str,
        schema: &Value,
    ) -> anyhow::Result<Value> {
        let properties = schema["properties"].as_object().expect("schema properties");
        if properties.contains_key("citation_count") {
            Ok(json!({
                "citation_count": 4,
                "authoritative_ratio": 0.75,
                "has_inline_attribution": true
            }))
        } else {
            Ok(json!({
                "has_definition": true,
                "definition_clarity": 8,
                "covers_related_questions": true
            }))
        }
    }
}

/// Every provider is configured but every call fails.
struct DownClient;

#[async_trait]
impl LlmClient for DownClient {
    fn is_provider_available(&self, _provider: LlmProvider) -> bool {
        true
    }

    async fn structured_output(
        &self,
        candidate: &ModelCandidate,
        _prompt: &str,
        _schema: &Value,
    ) -> anyhow::Result<Value> {
        anyhow::bail!("{} is down", candidate.describe())
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

fn chain() -> ProviderChain {
    ProviderChain::new(vec![
        ModelCandidate::new(LlmProvider::OpenAi, "gpt-4o-mini"),
        ModelCandidate::new(LlmProvider::Anthropic, "claude-sonnet"),
    ])
}

/// The full built-in rule set, with the Wikipedia rule pointed at a mock
/// endpoint so tests never touch the network.
fn rule_set(client: Arc<dyn LlmClient>, wiki_endpoint: &str) -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(SubheadingDensityRule::new()),
        Arc::new(MetaDescriptionRule::new()),
        Arc::new(ImageAltRule::new()),
        Arc::new(HttpsRule::new()),
        Arc::new(WikipediaPresenceRule::new().with_endpoint(wiki_endpoint.to_string())),
        Arc::new(CitationQualityRule::new(client.clone(), chain())),
        Arc::new(DefinitionalContentRule::new(client, chain())),
    ]
}

fn registry_with(rules: Vec<Arc<dyn Rule>>) -> RuleRegistry {
    let mut registry = RuleRegistry::new(&EngineConfig::default());
    for rule in rules {
        registry.register(rule).unwrap();
    }
    registry
}

async fn wiki_mock() -> (mockito::ServerGuard, String) {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/w/api.php")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"query":{"search":[
                {"title":"Acme","snippet":"Acme is a manufacturer"},
                {"title":"Acme history","snippet":"the acme story"}
            ]}}"#,
        )
        .create_async()
        .await;
    let endpoint = format!("{}/w/api.php", server.url());
    (server, endpoint)
}

fn good_page() -> PageContent {
    let description = "Browse our catalog of precision widgets, hand finished and tested, \
with fast shipping, easy returns, and support from real machinists daily.";
    let mut body = String::new();
    for section in 0..8 {
        body.push_str(&format!("<h2>Section {section}</h2><p>"));
        body.push_str(&"carefully machined widget text ".repeat(20));
        body.push_str("</p>");
    }
    let html = format!(
        "<html><head><title>Acme Widgets - Precision Parts</title>\
         <meta name=\"description\" content=\"{description}\"></head>\
         <body><h1>Widgets for every workshop</h1>\
         <img src=\"hero.jpg\" alt=\"A finished widget\">\
         <a href=\"https://www.iso.org/standard\">ISO standard</a>{body}</body></html>"
    );
    let clean: String =
        "A widget is a small machined part. ".to_string() + &"carefully machined widget text ".repeat(160);

    PageContent::new("https://acme.com/widgets", html, clean)
        .with_page_type(PageType::Article)
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[tokio::test]
async fn full_battery_produces_one_outcome_per_rule() {
    let (_server, endpoint) = wiki_mock().await;
    let registry = registry_with(rule_set(Arc::new(HelpfulClient), &endpoint));

    let outcomes = registry.evaluate_all(&good_page()).await.unwrap();
    assert_eq!(outcomes.len(), 7);
    assert!(outcomes.iter().all(|o| !o.is_unavailable()));

    for result in outcomes.iter().filter_map(|o| o.as_result()) {
        // Score bounds and the uniform pass bar hold for every rule.
        assert!(result.score <= 100, "{} out of bounds", result.rule_id);
        assert_eq!(result.max_score, 100);
        assert_eq!(result.passed, result.score >= 60, "{}", result.rule_id);
        assert!(!result.evidence.is_empty(), "{} has no evidence", result.rule_id);

        // Wherever a score-calculation item exists, it reconstructs the
        // final score.
        if let Some(calc) = result
            .evidence
            .iter()
            .find(|e| e.kind == EvidenceKind::Score)
        {
            assert_eq!(calc.score, Some(result.score as i32), "{}", result.rule_id);
            assert!(calc.content.ends_with(&format!("= {}/100", result.score)));
        }
    }
}

#[tokio::test]
async fn report_aggregates_weighted_scores_and_categories() {
    let (_server, endpoint) = wiki_mock().await;
    let registry = registry_with(rule_set(Arc::new(HelpfulClient), &endpoint));

    let outcomes = registry.evaluate_all(&good_page()).await.unwrap();
    let report = PageReport::build(&outcomes);

    assert!(report.overall_score > 0.0 && report.overall_score <= 100.0);
    assert_eq!(report.evaluated_rules, 7);
    assert_eq!(report.unavailable_rules, 0);

    // Every category with at least one rule shows up in the subtotals.
    let categories: Vec<_> = report.category_scores.iter().map(|c| c.category).collect();
    assert!(categories.len() >= 3);

    // Full weight sanity: overall equals sum(contribution)/sum(weight)*100.
    let (contribution, weight) = outcomes
        .iter()
        .filter_map(|o| o.as_result())
        .fold((0.0, 0.0), |(c, w), r| (c + r.contribution, w + r.weight));
    assert!((report.overall_score - contribution / weight * 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn llm_outage_isolates_semantic_rules_as_unavailable() {
    let (_server, endpoint) = wiki_mock().await;
    let registry = registry_with(rule_set(Arc::new(DownClient), &endpoint));

    let outcomes = registry.evaluate_all(&good_page()).await.unwrap();
    assert_eq!(outcomes.len(), 7);

    let unavailable: Vec<_> = outcomes
        .iter()
        .filter(|o| o.is_unavailable())
        .map(|o| o.rule_id().to_string())
        .collect();
    assert_eq!(unavailable.len(), 2);
    assert!(unavailable.contains(&"citation-quality".to_string()));
    assert!(unavailable.contains(&"definitional-content".to_string()));

    // The exhaustion error names the last attempted candidate.
    for outcome in outcomes.iter().filter(|o| o.is_unavailable()) {
        if let RuleOutcome::Unavailable { error, .. } = outcome {
            assert!(error.contains("anthropic/claude-sonnet"), "{error}");
        }
    }

    // The report excludes unavailable rules instead of zeroing them.
    let report = PageReport::build(&outcomes);
    assert_eq!(report.evaluated_rules, 5);
    assert_eq!(report.unavailable_rules, 2);
    assert!(report.overall_score > 0.0);
}

#[tokio::test]
async fn insecure_page_surfaces_critical_issue_first() {
    let (_server, endpoint) = wiki_mock().await;
    let registry = registry_with(rule_set(Arc::new(HelpfulClient), &endpoint));

    let mut page = good_page();
    page.url = "http://acme.com/widgets".to_string();

    let outcomes = registry.evaluate_all(&page).await.unwrap();
    let https = outcomes
        .iter()
        .filter_map(|o| o.as_result())
        .find(|r| r.rule_id == "https")
        .unwrap();
    assert_eq!(https.score, 0);

    let report = PageReport::build(&outcomes);
    assert_eq!(report.issues[0].severity, IssueSeverity::Critical);
    assert_eq!(report.issues[0].id, "https-missing");
}

#[tokio::test]
async fn page_type_restrictions_narrow_the_selection() {
    struct ProductOnlyRule {
        info: aeo_engine::RuleInfo,
    }

    #[async_trait]
    impl Rule for ProductOnlyRule {
        fn info(&self) -> &aeo_engine::RuleInfo {
            &self.info
        }

        async fn evaluate(
            &self,
            _url: &Url,
            _content: &PageContent,
        ) -> aeo_engine::Result<aeo_engine::domain::RuleResult> {
            Ok(self.build_result(
                100,
                vec![aeo_engine::domain::EvidenceItem::info("product", "ok")],
            ))
        }
    }

    let mut registry = RuleRegistry::new(&EngineConfig::default());
    registry.register(Arc::new(HttpsRule::new())).unwrap();
    registry
        .register(Arc::new(ProductOnlyRule {
            info: aeo_engine::RuleInfo::new(
                "product-schema",
                "Product Schema",
                aeo_engine::RuleCategory::Structure,
            )
            .for_page_types([PageType::Product]),
        }))
        .unwrap();

    // Domain-level HTTPS applies everywhere; the restricted rule only to
    // product pages.
    assert_eq!(registry.select_applicable(Some(&PageType::Product)).len(), 2);
    assert_eq!(registry.select_applicable(Some(&PageType::Article)).len(), 1);
    assert_eq!(
        registry
            .select_applicable(Some(&PageType::Other("press_release".into())))
            .len(),
        1
    );
}

#[tokio::test]
async fn heuristic_results_are_identical_across_runs() {
    let registry = registry_with(vec![
        Arc::new(SubheadingDensityRule::new()) as Arc<dyn Rule>,
        Arc::new(MetaDescriptionRule::new()),
        Arc::new(ImageAltRule::new()),
        Arc::new(HttpsRule::new()),
    ]);

    let page = good_page();
    let first = registry.evaluate_all(&page).await.unwrap();
    let second = registry.evaluate_all(&page).await.unwrap();

    let scores = |outcomes: &[RuleOutcome]| {
        let mut scored: Vec<(String, u32)> = outcomes
            .iter()
            .filter_map(|o| o.as_result())
            .map(|r| (r.rule_id.clone(), r.score))
            .collect();
        scored.sort();
        scored
    };
    assert_eq!(scores(&first), scores(&second));
}
