use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::gemini::{GenerateRequest, Generator, parse_json_payload};
use crate::search::SearchResult;

const ANALYSIS_UNAVAILABLE: &str = "Analysis unavailable.";
const ANALYSIS_FAILED: &str = "Could not generate deep analysis at this time.";

/// Expanded analysis of a single article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepDive {
    pub extended_summary: String,
    pub importance: String,
}

impl DeepDive {
    fn fallback(article: &SearchResult, importance: &str) -> Self {
        Self {
            extended_summary: article.display_snippet().to_string(),
            importance: importance.to_string(),
        }
    }
}

fn dive_prompt(article: &SearchResult, language: &str) -> String {
    format!(
        r#"You are a strategic intelligence analyst for POSCO Europe.
Analyze this news item in the context of the European steel market and ArcelorMittal.

Article:
Title: {title}
Snippet: {snippet}
Source: {source}
Category: {category}

Task:
1. "extendedSummary": expand on the snippet, inferring likely industry context (e.g. "DRI in Hamburg" means hydrogen-based direct reduction). Write in {language}.
2. "importance": explain why this matters strategically for POSCO: market share threat, regulatory risk or technology benchmark. Write in {language}.

Return JSON: {{"extendedSummary": "string", "importance": "string"}}"#,
        title = article.title,
        snippet = article.snippet,
        source = article.source,
        category = article.category_or_default(),
    )
}

/// Deep-dive analysis of one article. Never fails: falls back to the article's own snippet.
pub async fn deep_dive(
    generator: &impl Generator,
    article: &SearchResult,
    language: &str,
) -> DeepDive {
    let request = GenerateRequest::new(dive_prompt(article, language)).json();

    let text = match generator.generate(&request).await {
        Ok(text) => text,
        Err(e) => {
            warn!(link = %article.link, error = %e, "deep dive failed");
            return DeepDive::fallback(article, ANALYSIS_FAILED);
        }
    };

    parse_json_payload(&text)
        .and_then(|value| serde_json::from_value::<DeepDive>(value).ok())
        .filter(|dive| !dive.extended_summary.trim().is_empty())
        .unwrap_or_else(|| {
            warn!(link = %article.link, "deep dive reply malformed");
            DeepDive::fallback(article, ANALYSIS_UNAVAILABLE)
        })
}
