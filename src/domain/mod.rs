//! Domain value objects shared across the engine.

pub mod evidence;
pub mod issue;
pub mod page;
pub mod result;

pub use evidence::{EvidenceItem, EvidenceKind, EvidenceTrail};
pub use issue::{IssueSeverity, RuleIssue};
pub use page::{PageContent, PageType, PerformanceMetrics, SecurityInfo};
pub use result::{AiUsage, ResultParts, RuleOutcome, RuleResult};
