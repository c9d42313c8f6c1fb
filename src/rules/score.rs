//! Score breakdown accumulation.
//!
//! Every breakdown-based rule collects `(label, signed points)` components as
//! it evaluates, then asks the card for a clamped total and a terminal
//! "score calculation" evidence item. The audit contract: given only the
//! evidence list, a reviewer can recompute the score by hand.

use serde::{Deserialize, Serialize};

use crate::domain::EvidenceItem;
use crate::domain::result::MAX_SCORE;

/// One line of a rule's score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub label: String,
    pub points: i32,
}

/// Accumulator of score components with a declared clamping range.
///
/// The default range is [0, 100]. Rules that award a floor for "has some
/// presence" declare it explicitly via [`ScoreCard::with_floor`] instead of
/// clamping ad hoc.
#[derive(Debug, Clone)]
pub struct ScoreCard {
    components: Vec<ScoreComponent>,
    floor: i32,
    ceiling: i32,
}

impl Default for ScoreCard {
    fn default() -> Self {
        Self {
            components: Vec::new(),
            floor: 0,
            ceiling: MAX_SCORE as i32,
        }
    }
}

impl ScoreCard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the clamping floor (e.g. 20 for "brand has some presence").
    pub fn with_floor(mut self, floor: i32) -> Self {
        self.floor = floor;
        self
    }

    /// Record one component of the breakdown.
    pub fn add(&mut self, label: impl Into<String>, points: i32) -> &mut Self {
        self.components.push(ScoreComponent {
            label: label.into(),
            points,
        });
        self
    }

    pub fn components(&self) -> &[ScoreComponent] {
        &self.components
    }

    /// Unclamped sum of all components.
    pub fn raw_total(&self) -> i32 {
        self.components.iter().map(|c| c.points).sum()
    }

    /// Final score: component sum clamped into [floor, ceiling].
    pub fn total(&self) -> u32 {
        self.raw_total().clamp(self.floor, self.ceiling) as u32
    }

    /// Terminal evidence item reproducing the full arithmetic, e.g.
    /// `30 (base score) + -10 (description too short) = 20/100`.
    pub fn calculation_evidence(&self) -> EvidenceItem {
        let total = self.total();
        let content = if self.components.is_empty() {
            format!("no components recorded = {total}/{MAX_SCORE}")
        } else {
            let terms: Vec<String> = self
                .components
                .iter()
                .map(|c| format!("{} ({})", c.points, c.label))
                .collect();
            format!("{} = {total}/{MAX_SCORE}", terms.join(" + "))
        };
        EvidenceItem::score_item(content).with_score(total as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_sums_components() {
        let mut card = ScoreCard::new();
        card.add("base", 40).add("headings present", 30).add("density penalty", -10);
        assert_eq!(card.raw_total(), 60);
        assert_eq!(card.total(), 60);
    }

    #[test]
    fn total_clamps_to_range() {
        let mut card = ScoreCard::new();
        card.add("everything", 150);
        assert_eq!(card.total(), 100);

        let mut card = ScoreCard::new();
        card.add("penalty", -30);
        assert_eq!(card.total(), 0);
    }

    #[test]
    fn declared_floor_is_honored() {
        let mut card = ScoreCard::new().with_floor(20);
        card.add("weak presence", 5);
        assert_eq!(card.total(), 20);
    }

    #[test]
    fn calculation_evidence_reconstructs_the_sum() {
        let mut card = ScoreCard::new();
        card.add("optimal length", 40).add("unique vs title", 35).add("keyword stuffing", -15);

        let item = card.calculation_evidence();
        assert_eq!(
            item.content,
            "40 (optimal length) + 35 (unique vs title) + -15 (keyword stuffing) = 60/100"
        );
        assert_eq!(item.score, Some(60));

        // The audit contract: the listed terms sum to the final score.
        let recomputed: i32 = card.components().iter().map(|c| c.points).sum();
        assert_eq!(recomputed as u32, card.total());
    }

    #[test]
    fn empty_card_renders_explicitly() {
        let card = ScoreCard::new();
        assert_eq!(card.total(), 0);
        assert!(card.calculation_evidence().content.contains("no components"));
    }
}
