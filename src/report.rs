//! Weighted report aggregation.
//!
//! Combines the `RuleOutcome`s of one page (or domain) evaluation into a
//! single report: an overall 0-100 score normalized by the weights of the
//! rules that actually ran, per-category subtotals, severity-sorted issues,
//! and deduplicated recommendations. Aggregation is commutative, so the
//! order rules completed in never changes the numbers.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::{RuleIssue, RuleOutcome};
use crate::rules::RuleCategory;

/// Subtotal for one rule category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: RuleCategory,
    /// Weighted 0-100 score across this category's evaluated rules.
    pub score: f64,
    pub rule_count: usize,
}

/// Aggregated view of one page/domain evaluation. Built fresh each time;
/// persistence belongs to the embedding service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageReport {
    /// Weighted overall score in [0, 100]. Zero when nothing was evaluated.
    pub overall_score: f64,
    pub category_scores: Vec<CategoryScore>,
    /// All issues across rules, critical first.
    pub issues: Vec<RuleIssue>,
    /// Deduplicated recommendations in first-seen order.
    pub recommendations: Vec<String>,
    pub evaluated_rules: usize,
    /// Rules that could not run (all providers down, collaborator missing).
    /// These are excluded from the score, not counted as zero.
    pub unavailable_rules: usize,
}

impl PageReport {
    pub fn build(outcomes: &[RuleOutcome]) -> Self {
        let results: Vec<_> = outcomes.iter().filter_map(|o| o.as_result()).collect();
        let unavailable_rules = outcomes.len() - results.len();

        let weighted = |filter: &dyn Fn(&RuleCategory) -> bool| -> (f64, usize) {
            let mut contribution = 0.0;
            let mut weight = 0.0;
            let mut count = 0;
            for result in results.iter().filter(|r| filter(&r.category)) {
                contribution += result.contribution;
                weight += result.weight;
                count += 1;
            }
            if weight == 0.0 {
                (0.0, count)
            } else {
                (contribution / weight * 100.0, count)
            }
        };

        let (overall_score, _) = weighted(&|_| true);

        let category_scores = RuleCategory::ALL
            .iter()
            .filter_map(|category| {
                let (score, rule_count) = weighted(&|c| c == category);
                (rule_count > 0).then_some(CategoryScore {
                    category: *category,
                    score,
                    rule_count,
                })
            })
            .collect();

        let mut issues: Vec<RuleIssue> = results
            .iter()
            .flat_map(|r| r.issues.iter().cloned())
            .collect();
        // Stable sort keeps rule order within one severity.
        issues.sort_by(|a, b| b.severity.cmp(&a.severity));

        let mut seen = HashSet::new();
        let recommendations: Vec<String> = results
            .iter()
            .flat_map(|r| r.recommendations.iter())
            .filter(|rec| seen.insert(rec.as_str().to_string()))
            .cloned()
            .collect();

        Self {
            overall_score,
            category_scores,
            issues,
            recommendations,
            evaluated_rules: results.len(),
            unavailable_rules,
        }
    }
}
