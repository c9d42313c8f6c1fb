//! Page input contract.
//!
//! `PageContent` is produced by the external crawler/fetcher and passed into
//! every rule evaluation. It is immutable for the duration of one call; rules
//! read it, never mutate it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ====== Enums ======

/// Classification of a page within the crawled site.
///
/// `Other` carries whatever label the crawler's classifier produced for page
/// kinds this engine has no special handling for; applicability checks treat
/// it like any other concrete type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Homepage,
    Article,
    Product,
    Category,
    Documentation,
    Faq,
    About,
    Other(String),
}

impl PageType {
    pub fn as_str(&self) -> &str {
        match self {
            PageType::Homepage => "homepage",
            PageType::Article => "article",
            PageType::Product => "product",
            PageType::Category => "category",
            PageType::Documentation => "documentation",
            PageType::Faq => "faq",
            PageType::About => "about",
            PageType::Other(label) => label.as_str(),
        }
    }
}

// ====== Supporting data ======

/// Transport security facts gathered at fetch time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityInfo {
    pub https: bool,
    pub hsts_header: bool,
    pub mixed_content: bool,
}

/// Load-performance metrics gathered at fetch time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub load_time_ms: Option<f64>,
    pub first_contentful_paint: Option<f64>,
    pub largest_contentful_paint: Option<f64>,
    pub total_blocking_time: Option<f64>,
    pub cumulative_layout_shift: Option<f64>,
}

// ====== Page content ======

/// Everything the crawler captured about one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    pub url: String,
    /// Raw markup as fetched.
    pub html: String,
    /// Extracted visible text (markup stripped).
    pub clean_content: String,
    pub page_type: Option<PageType>,
    pub page_category: Option<String>,
    pub security_info: Option<SecurityInfo>,
    pub performance_metrics: Option<PerformanceMetrics>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl PageContent {
    /// Minimal constructor for the common case; optional fields default off.
    pub fn new(url: impl Into<String>, html: impl Into<String>, clean_content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            clean_content: clean_content.into(),
            page_type: None,
            page_category: None,
            security_info: None,
            performance_metrics: None,
            fetched_at: None,
        }
    }

    pub fn with_page_type(mut self, page_type: PageType) -> Self {
        self.page_type = Some(page_type);
        self
    }

    /// Whitespace-delimited word count of the visible text.
    pub fn word_count(&self) -> usize {
        self.clean_content.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_count_ignores_extra_whitespace() {
        let page = PageContent::new("https://example.com", "", "one  two\n three\t four");
        assert_eq!(page.word_count(), 4);
    }

    #[test]
    fn page_type_labels() {
        assert_eq!(PageType::Homepage.as_str(), "homepage");
        assert_eq!(PageType::Other("press_release".into()).as_str(), "press_release");
    }
}
