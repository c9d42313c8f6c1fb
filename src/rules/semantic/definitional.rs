//! Definitional content - does the page answer "what is X?" directly?

use async_trait::async_trait;
use regex::Regex;
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

const DEFINITION_PATTERN_POINTS: i32 = 20;
const HAS_DEFINITION_POINTS: i32 = 40;
const HIGH_CLARITY_POINTS: i32 = 25;
const MID_CLARITY_POINTS: i32 = 15;
const RELATED_QUESTIONS_POINTS: i32 = 15;

#[derive(Debug, Deserialize)]
struct DefinitionJudgment {
    has_definition: bool,
    /// 0-10 clarity of the definition as a quotable answer.
    definition_clarity: u8,
    covers_related_questions: bool,
}

/// LLM-backed rule judging whether the page defines its subject the way an
/// answer engine can quote it.
pub struct DefinitionalContentRule {
    info: RuleInfo,
    client: Arc<dyn LlmClient>,
    chain: ProviderChain,
    content_budget: usize,
}

impl DefinitionalContentRule {
    pub fn new(client: Arc<dyn LlmClient>, chain: ProviderChain) -> Self {
        Self {
            info: RuleInfo::new(
                "definitional-content",
                "Definitional Content",
                RuleCategory::Content,
            )
            .with_impact(2),
            client,
            chain,
            content_budget: CONTENT_BUDGET_CHARS,
        }
    }

    pub fn with_content_budget(mut self, budget: usize) -> Self {
        self.content_budget = budget;
        self
    }

    /// Deterministic pre-LLM signal: copula/definition phrasing in the text.
    fn has_definition_pattern(text: &str) -> bool {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Regex::new(r"(?i)\b(is a|is an|is the|refers to|means|is defined as)\b").unwrap()
        });
        pattern.is_match(text)
    }

    fn prompt(&self, content: &PageContent) -> String {
        let text = truncate_content(&content.clean_content, self.content_budget);
        format!(
            "Judge whether the following page content contains a clear, \
             quotable definition of its main subject. Rate the clarity of \
             that definition from 0 to 10 and say whether the page also \
             answers closely related questions.\n\n\
             PAGE CONTENT:\n{text}"
        )
    }

    fn schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "has_definition": { "type": "boolean" },
                "definition_clarity": { "type": "integer", "minimum": 0, "maximum": 10 },
                "covers_related_questions": { "type": "boolean" }
            },
            "required": ["has_definition", "definition_clarity", "covers_related_questions"]
        })
    }
}

#[async_trait]
impl Rule for DefinitionalContentRule {
    fn info(&self) -> &RuleInfo {
        &self.info
    }

    async fn evaluate(&self, url: &Url, content: &PageContent) -> Result<RuleResult> {
        let mut trail = EvidenceTrail::new();
        let mut card = ScoreCard::new();
        let mut issues = Vec::new();

        if Self::has_definition_pattern(&content.clean_content) {
            card.add("definition phrasing present", DEFINITION_PATTERN_POINTS);
            trail.push(EvidenceItem::success(
                "definition",
                "Text contains definition phrasing ('is a', 'refers to', ...)",
            ));
        } else {
            card.add("no definition phrasing", 0);
            trail.push(EvidenceItem::info(
                "definition",
                "No copula-style definition phrasing found in text",
            ));
        }

        let prompt = self.prompt(content);
        let schema = Self::schema();
        log::debug!("[RULE definitional-content] {url}: resolving provider chain");
        let resolved = self.chain.resolve(self.client.as_ref(), &prompt, &schema).await?;

        let ai_usage = AiUsage {
            model_name: resolved.candidate.describe(),
            prompt,
            response: resolved.value.to_string(),
        };

        match serde_json::from_value::<DefinitionJudgment>(resolved.value) {
            Ok(judgment) => {
                if judgment.has_definition {
                    card.add("clear definition present", HAS_DEFINITION_POINTS);
                    trail.push(EvidenceItem::success(
                        "definition",
                        "Model found a quotable definition",
                    ));

                    if judgment.definition_clarity >= 7 {
                        card.add("high clarity", HIGH_CLARITY_POINTS);
                    } else if judgment.definition_clarity >= 4 {
                        card.add("moderate clarity", MID_CLARITY_POINTS);
                    } else {
                        card.add("low clarity", 0);
                    }
                    trail.push(EvidenceItem::info(
                        "definition",
                        format!("Definition clarity rated {}/10", judgment.definition_clarity),
                    ));
                } else {
                    card.add("no definition found", 0);
                    trail.push(
                        EvidenceItem::warning("definition", "Model found no definition of the subject")
                            .with_target("Open with a one-sentence definition of the subject"),
                    );
                    issues.push(RuleIssue::new(
                        "definition-missing",
                        IssueSeverity::High,
                        "Page never defines its main subject",
                        "Add a direct 'X is ...' definition near the top of the page",
                    ));
                }

                if judgment.covers_related_questions {
                    card.add("covers related questions", RELATED_QUESTIONS_POINTS);
                    trail.push(EvidenceItem::success(
                        "definition",
                        "Page also answers closely related questions",
                    ));
                }
            }
            Err(e) => {
                log::warn!("[RULE definitional-content] malformed judgment: {e}");
                card.add("unusable model judgment", 0);
                trail.push(EvidenceItem::error(
                    "definition",
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
