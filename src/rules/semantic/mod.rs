//! LLM-backed semantic rules - archetype (c).
//!
//! Pattern every rule in this family follows:
//! 1. Compute deterministic signals from the page (word counts, link counts,
//!    regex hits) before any LLM call; these always contribute to the
//!    breakdown even if the model's answer is unusable.
//! 2. Build a prompt embedding the visible text truncated to a fixed
//!    character budget, plus a structured-output schema.
//! 3. Resolve the provider fallback chain; the winning candidate is recorded
//!    in `ai_usage` for auditability.
//! 4. Merge the model's qualitative judgments into the score card; a
//!    malformed judgment downgrades to error evidence with zero points for
//!    those components, not a failed rule.
//! 5. If the whole chain is exhausted the rule returns `Err`: with no non-AI
//!    fallback, a silent zero would be indistinguishable from "the page
//!    genuinely lacks this content". The registry turns that `Err` into an
//!    unavailable marker.
//!
//! New rules in this family only need a prompt, a judgment struct, and a
//! point table; everything else is shared machinery.

mod citation_quality;
mod definitional;

pub use citation_quality::CitationQualityRule;
pub use definitional::DefinitionalContentRule;

/// Character budget for page text embedded in prompts.
pub(crate) const CONTENT_BUDGET_CHARS: usize = 12_000;

/// Truncate on a char boundary at the prompt budget.
pub(crate) fn truncate_content(text: &str, budget: usize) -> &str {
    if text.chars().count() <= budget {
        return text;
    }
    match text.char_indices().nth(budget) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
