use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of categories the enricher may assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Safety,
    Strategy,
    Policy,
    Tech,
    Economy,
    Environment,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Safety,
        Category::Strategy,
        Category::Policy,
        Category::Tech,
        Category::Economy,
        Category::Environment,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Safety => "Safety",
            Category::Strategy => "Strategy",
            Category::Policy => "Policy",
            Category::Tech => "Tech",
            Category::Economy => "Economy",
            Category::Environment => "Environment",
            Category::Other => "Other",
        }
    }

    /// Case-insensitive lookup; labels outside the closed set yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_PRIORITY: u8 = 3;

/// One normalized search hit. `link` identifies a result within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localized_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localized_snippet: Option<String>,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
            source: source.into(),
            date: None,
            category: None,
            priority: None,
            localized_title: None,
            localized_snippet: None,
        }
    }

    pub fn category_or_default(&self) -> Category {
        self.category.unwrap_or(Category::Other)
    }

    /// Priority used for ordering; unset sorts last.
    pub fn rank(&self) -> u8 {
        self.priority.unwrap_or(DEFAULT_PRIORITY)
    }

    pub fn display_title(&self) -> &str {
        self.localized_title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.title)
    }

    pub fn display_snippet(&self) -> &str {
        self.localized_snippet
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.snippet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_from_label_is_case_insensitive() {
        assert_eq!(Category::from_label("safety"), Some(Category::Safety));
        assert_eq!(Category::from_label(" Tech "), Some(Category::Tech));
        assert_eq!(Category::from_label("Sports"), None);
    }

    #[test]
    fn unenriched_result_uses_display_defaults() {
        let r = SearchResult::new("Title", "https://a.com", "Snippet", "Google-Germany");
        assert_eq!(r.category_or_default(), Category::Other);
        assert_eq!(r.rank(), 3);
        assert_eq!(r.display_title(), "Title");
        assert_eq!(r.display_snippet(), "Snippet");
    }

    #[test]
    fn localized_text_preferred_for_display() {
        let mut r = SearchResult::new("Title", "https://a.com", "Snippet", "x");
        r.localized_title = Some("제목".into());
        r.localized_snippet = Some(String::new());
        assert_eq!(r.display_title(), "제목");
        assert_eq!(r.display_snippet(), "Snippet");
    }

    #[test]
    fn serializes_camel_case_and_skips_unset_fields() {
        let mut r = SearchResult::new("T", "https://a.com", "S", "src");
        r.localized_title = Some("LT".into());
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["localizedTitle"], "LT");
        assert!(json.get("category").is_none());
        assert!(json.get("date").is_none());
    }
}
