//! Evidence model - the audit trail behind every score.
//!
//! Each `EvidenceItem` records one observation a rule made while evaluating a
//! page. Items are append-only within one evaluation and their order is
//! significant: read top to bottom they reconstruct how the rule reached its
//! score. Constructors stamp the kind discriminant and nothing else; callers
//! own score/max_score consistency.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ====== Kinds ======

/// Discriminant for evidence items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
    Info,
    Success,
    Warning,
    Error,
    Score,
    Heading,
    Base,
}

// ====== Item ======

/// One structured observation backing a rule's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub kind: EvidenceKind,
    /// Short grouping label for UI/analytics; empty for pure score/heading items.
    pub topic: String,
    /// Human-readable message.
    pub content: String,
    /// Signed point delta this item represents, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    /// Ceiling for this item's contribution, for progress display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_score: Option<i32>,
    /// Guidance describing what would improve the score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Verbatim excerpt/snippet supporting the claim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl EvidenceItem {
    fn tagged(kind: EvidenceKind, topic: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind,
            topic: topic.into(),
            content: content.into(),
            score: None,
            max_score: None,
            target: None,
            code: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn info(topic: impl Into<String>, content: impl Into<String>) -> Self {
        Self::tagged(EvidenceKind::Info, topic, content)
    }

    pub fn success(topic: impl Into<String>, content: impl Into<String>) -> Self {
        Self::tagged(EvidenceKind::Success, topic, content)
    }

    pub fn warning(topic: impl Into<String>, content: impl Into<String>) -> Self {
        Self::tagged(EvidenceKind::Warning, topic, content)
    }

    pub fn error(topic: impl Into<String>, content: impl Into<String>) -> Self {
        Self::tagged(EvidenceKind::Error, topic, content)
    }

    pub fn base(topic: impl Into<String>, content: impl Into<String>) -> Self {
        Self::tagged(EvidenceKind::Base, topic, content)
    }

    /// Pure score item; no topic by convention.
    pub fn score_item(content: impl Into<String>) -> Self {
        Self::tagged(EvidenceKind::Score, "", content)
    }

    /// Section heading within the trail; no topic by convention.
    pub fn heading(content: impl Into<String>) -> Self {
        Self::tagged(EvidenceKind::Heading, "", content)
    }

    // Builder-style optional fields.

    pub fn with_score(mut self, score: i32) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_max_score(mut self, max_score: i32) -> Self {
        self.max_score = Some(max_score);
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

// ====== Trail ======

/// Append-only evidence buffer scoped to one `evaluate` call.
///
/// Rules push into the trail as they work and hand the frozen `Vec` to
/// `build_result` at the end; nothing is removed or reordered.
#[derive(Debug, Default)]
pub struct EvidenceTrail {
    items: Vec<EvidenceItem>,
}

impl EvidenceTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: EvidenceItem) -> &mut Self {
        self.items.push(item);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Freeze the trail into the immutable snapshot stored on `RuleResult`.
    pub fn freeze(self) -> Vec<EvidenceItem> {
        self.items
    }
}
