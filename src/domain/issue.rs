//! Actionable issues raised by rules when a score crosses a badness threshold.

use serde::{Deserialize, Serialize};

/// Severity of a detected issue. Derived `Ord` ranks Low < Medium < High <
/// Critical, so sorting descending puts critical issues first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IssueSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::Low => "low",
            IssueSeverity::Medium => "medium",
            IssueSeverity::High => "high",
            IssueSeverity::Critical => "critical",
        }
    }
}

/// One actionable finding attached to a rule result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleIssue {
    pub id: String,
    pub severity: IssueSeverity,
    pub description: String,
    pub recommendation: String,
    /// Identifiers of offending DOM fragments, when applicable.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_elements: Vec<String>,
}

impl RuleIssue {
    pub fn new(
        id: impl Into<String>,
        severity: IssueSeverity,
        description: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            description: description.into(),
            recommendation: recommendation.into(),
            affected_elements: Vec::new(),
        }
    }

    pub fn with_affected_elements(mut self, elements: Vec<String>) -> Self {
        self.affected_elements = elements;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_low_to_critical() {
        assert!(IssueSeverity::Low < IssueSeverity::Medium);
        assert!(IssueSeverity::Medium < IssueSeverity::High);
        assert!(IssueSeverity::High < IssueSeverity::Critical);
    }
}
