//! Rule evaluation results.
//!
//! A `RuleResult` is a value object: built once per (rule, page) evaluation,
//! immutable afterwards, with no identity beyond that pairing. The weighted
//! report aggregator consumes `RuleOutcome`s, which keep "the rule could not
//! run" explicitly distinguishable from a genuine score of zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::evidence::EvidenceItem;
use super::issue::RuleIssue;
use crate::rules::{RuleCategory, RuleInfo};

/// Every rule scores out of 100.
pub const MAX_SCORE: u32 = 100;

/// Uniform pass/fail bar across all rules and categories.
pub const PASS_THRESHOLD: u32 = 60;

// ====== AI usage audit ======

/// Record of the LLM call behind an AI-assisted result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiUsage {
    /// "provider/model" label of the candidate that succeeded.
    pub model_name: String,
    pub prompt: String,
    pub response: String,
}

// ====== Result ======

/// Outcome of one rule evaluated against one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule_id: String,
    pub rule_name: String,
    pub category: RuleCategory,
    /// Final score in [0, 100].
    pub score: u32,
    /// Always [`MAX_SCORE`]; kept explicit for serialized consumers.
    pub max_score: u32,
    /// Weight derived from the rule's impact score.
    pub weight: f64,
    /// `(score / max_score) * weight`.
    pub contribution: f64,
    /// `score >= PASS_THRESHOLD`.
    pub passed: bool,
    /// Ordered audit trail; order is the evaluation order.
    pub evidence: Vec<EvidenceItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<RuleIssue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_usage: Option<AiUsage>,
    pub evaluated_at: DateTime<Utc>,
}

impl RuleResult {
    /// Assemble a result from a rule's identity and raw score.
    ///
    /// This is the single construction path (rules reach it through
    /// `Rule::build_result`): it fixes `max_score`, derives weight,
    /// contribution, and the pass flag, so every rule produces a
    /// structurally uniform result regardless of its internal logic.
    /// Score clamping is the rule's own responsibility before calling in.
    pub(crate) fn assemble(info: &RuleInfo, score: u32, parts: ResultParts) -> Self {
        let weight = info.weight();
        Self {
            rule_id: info.id.clone(),
            rule_name: info.name.clone(),
            category: info.category,
            score,
            max_score: MAX_SCORE,
            weight,
            contribution: (score as f64 / MAX_SCORE as f64) * weight,
            passed: score >= PASS_THRESHOLD,
            evidence: parts.evidence,
            issues: parts.issues,
            recommendations: parts.recommendations,
            details: parts.details,
            ai_usage: parts.ai_usage,
            evaluated_at: Utc::now(),
        }
    }
}

/// Optional payloads carried alongside the score. Passed to
/// `Rule::build_result_full`; everything defaults to empty.
#[derive(Debug, Default)]
pub struct ResultParts {
    pub evidence: Vec<EvidenceItem>,
    pub issues: Vec<RuleIssue>,
    pub recommendations: Vec<String>,
    pub details: BTreeMap<String, Value>,
    pub ai_usage: Option<AiUsage>,
}

// ====== Outcome ======

/// What the registry produced for one attempted rule.
///
/// `Unavailable` is the explicit "analysis unavailable" marker required when
/// a rule fails outright (all LLM providers down, missing collaborator).
/// Conflating it with a score of 0 would corrupt the weighted aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RuleOutcome {
    Evaluated(RuleResult),
    Unavailable {
        rule_id: String,
        rule_name: String,
        error: String,
    },
}

impl RuleOutcome {
    pub fn rule_id(&self) -> &str {
        match self {
            RuleOutcome::Evaluated(result) => &result.rule_id,
            RuleOutcome::Unavailable { rule_id, .. } => rule_id,
        }
    }

    pub fn as_result(&self) -> Option<&RuleResult> {
        match self {
            RuleOutcome::Evaluated(result) => Some(result),
            RuleOutcome::Unavailable { .. } => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, RuleOutcome::Unavailable { .. })
    }
}
