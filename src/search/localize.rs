use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::gemini::{GenerateRequest, Generator, parse_json_payload};

/// Locale codes every session translates into.
pub const LOCALES: [&str; 21] = [
    "de", "fr", "es", "it", "pt", "pl", "nl", "hu", "tr", "cs", "sk", "sl", "sv", "no", "fi",
    "da", "el", "ru", "uk", "sr", "ar",
];

/// Locale code → localized query. Always holds every entry of [`LOCALES`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalizedQueries(BTreeMap<&'static str, String>);

impl LocalizedQueries {
    /// Every locale mapped to the untranslated query.
    pub fn fallback(query: &str) -> Self {
        Self(LOCALES.iter().map(|&l| (l, query.to_string())).collect())
    }

    /// Localized query for `locale`; empty for codes outside [`LOCALES`].
    pub fn get(&self, locale: &str) -> &str {
        self.0.get(locale).map(String::as_str).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    /// Overlays non-empty string entries for known locales; returns how many were applied.
    pub(crate) fn overlay(&mut self, value: &serde_json::Value) -> usize {
        let Some(object) = value.as_object() else {
            return 0;
        };
        let mut applied = 0;
        for (locale, slot) in self.0.iter_mut() {
            if let Some(text) = object.get(*locale).and_then(|v| v.as_str())
                && !text.trim().is_empty()
            {
                *slot = text.trim().to_string();
                applied += 1;
            }
        }
        applied
    }
}

fn translation_prompt(query: &str) -> String {
    format!(
        r#"You are a professional industrial translator for the steel sector.
Translate the search query: "{query}"
Context: ArcelorMittal's movements and the European steel strategy.
Produce one natural search query per target locale, using local industry terminology.
Target locale codes: {locales}
Return ONLY a raw JSON object mapping each locale code to its translated query."#,
        locales = LOCALES.join(", ")
    )
}

/// Translate `query` into every locale. Never fails: missing or broken
/// translations fall back to the original query.
pub async fn translate(generator: &impl Generator, query: &str) -> LocalizedQueries {
    let mut queries = LocalizedQueries::fallback(query);
    let request = GenerateRequest::new(translation_prompt(query)).json();

    let text = match generator.generate(&request).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "translation failed, searching with the original query");
            return queries;
        }
    };

    match parse_json_payload(&text) {
        Some(value) => {
            let applied = queries.overlay(&value);
            debug!(applied, total = LOCALES.len(), "query localized");
        }
        None => warn!("translation reply was not JSON, searching with the original query"),
    }
    queries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::test_support::MockGenerator;
    use crate::gemini::GeminiError;

    #[tokio::test]
    async fn total_failure_yields_complete_fallback() {
        let generator = MockGenerator::failing(GeminiError::RateLimited);
        let queries = translate(&generator, "foo").await;

        assert_eq!(queries.len(), 21);
        assert!(queries.iter().all(|(_, q)| q == "foo"));
        assert_eq!(queries, LocalizedQueries::fallback("foo"));
    }

    #[tokio::test]
    async fn partial_reply_overlays_known_locales() {
        let generator = MockGenerator::replying(
            "```json\n{\"de\": \"Stahlmarkt\", \"fr\": \"marché de l'acier\", \"xx\": \"ignored\", \"es\": \"\", \"it\": 7}\n```",
        );
        let queries = translate(&generator, "steel market").await;

        assert_eq!(queries.len(), 21);
        assert_eq!(queries.get("de"), "Stahlmarkt");
        assert_eq!(queries.get("fr"), "marché de l'acier");
        assert_eq!(queries.get("es"), "steel market");
        assert_eq!(queries.get("it"), "steel market");
        assert_eq!(queries.get("xx"), "");
    }

    #[tokio::test]
    async fn non_object_reply_falls_back() {
        let generator = MockGenerator::replying("[\"Stahl\"]");
        let queries = translate(&generator, "steel").await;
        assert_eq!(queries, LocalizedQueries::fallback("steel"));
    }

    #[tokio::test]
    async fn requests_json_mode_and_lists_locales() {
        let generator = MockGenerator::replying("{}");
        translate(&generator, "steel").await;

        let requests = generator.captured();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].json);
        assert!(requests[0].prompt.contains("\"steel\""));
        assert!(requests[0].prompt.contains("sr, ar"));
    }
}
