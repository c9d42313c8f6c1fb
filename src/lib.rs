//! AEO rule evaluation engine.
//!
//! Turns a battery of independent scoring rules - DOM heuristics,
//! third-party lookups, LLM-backed semantic analysis - into one uniform,
//! auditable, weighted brand-visibility score:
//!
//! 1. [`registry::RuleRegistry`] selects the rules applicable to a page
//! 2. each rule's `evaluate` produces a [`domain::RuleResult`] with a
//!    reconstructible evidence trail (LLM-backed rules resolve an ordered
//!    provider fallback chain first)
//! 3. failures are isolated per rule as explicit unavailable markers
//! 4. [`report::PageReport`] combines the outcomes into a weighted score
//!    with category subtotals, sorted issues, and recommendations
//!
//! The crawler producing [`domain::PageContent`], the concrete LLM vendor
//! clients behind [`llm::LlmClient`], and persistence of the results all
//! live in the embedding service.

pub mod config;
pub mod domain;
pub mod error;
pub mod llm;
pub mod registry;
pub mod report;
pub mod rules;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use registry::RuleRegistry;
pub use report::PageReport;
pub use rules::{standard_rules, Rule, RuleCategory, RuleInfo};
