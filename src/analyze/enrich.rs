use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::AnalysisOptions;
use crate::gemini::{GenerateRequest, Generator, parse_json_payload};
use crate::search::{Category, SearchResult};

/// Maximum results sent to the model in one call.
pub const BATCH_SIZE: usize = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Enrichment {
    link: Option<String>,
    #[serde(default)]
    category: Value,
    #[serde(default)]
    priority: Value,
    #[serde(default)]
    localized_title: Value,
    #[serde(default)]
    localized_snippet: Value,
    // older prompt schema; used when the localized key is absent or empty
    #[serde(default)]
    korean_title: Value,
    #[serde(default)]
    korean_snippet: Value,
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_priority(value: &Value) -> Option<u8> {
    let n = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (1..=3).contains(&n).then_some(n as u8)
}

impl Enrichment {
    /// Applies the fields this entry carries; anything missing, empty or out of
    /// range leaves the original value in place.
    fn merge_into(&self, result: &mut SearchResult) {
        if let Some(category) = non_empty_str(&self.category).and_then(Category::from_label) {
            result.category = Some(category);
        }
        if let Some(priority) = parse_priority(&self.priority) {
            result.priority = Some(priority);
        }
        let title = non_empty_str(&self.localized_title).or(non_empty_str(&self.korean_title));
        if let Some(title) = title {
            result.localized_title = Some(title.to_string());
        }
        let snippet =
            non_empty_str(&self.localized_snippet).or(non_empty_str(&self.korean_snippet));
        if let Some(snippet) = snippet {
            result.localized_snippet = Some(snippet.to_string());
        }
    }
}

#[derive(serde::Serialize)]
struct PromptItem<'a> {
    title: &'a str,
    snippet: &'a str,
    link: &'a str,
    source: &'a str,
}

fn enrichment_prompt(batch: &[SearchResult], language: &str) -> String {
    let items: Vec<PromptItem<'_>> = batch
        .iter()
        .map(|r| PromptItem {
            title: &r.title,
            snippet: &r.snippet,
            link: &r.link,
            source: &r.source,
        })
        .collect();
    let input = serde_json::to_string(&items).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"Analyze these search results about the European steel market (focus: ArcelorMittal, green steel, CBAM).

Task:
1. Judge relevance; general SEO or marketing pages get priority 3.
2. CRITICAL RULE: NEVER drop news about accidents, fires, explosions, deaths, injuries or strikes. Such items MUST be category "Safety" with priority 1.
3. Categorize each item into exactly one of:
   - "Safety" (accidents, fires, fatalities, explosions, strikes, hazardous events)
   - "Strategy" (M&A, investments, long-term plans)
   - "Policy" (regulation, CBAM, EU taxes)
   - "Tech" (hydrogen, DRI, R&D)
   - "Economy" (prices, supply chain)
   - "Environment" (ESG, carbon reduction)
   - "Other"
4. Assign priority: 1 = safety, official regulation or high impact; 2 = industry news; 3 = general.
5. Translate title and snippet into {language} business language.

Input JSON:
{input}

Output schema (JSON array, one entry per input item, keyed by the original link):
[{{"link": "original link", "category": "Category", "priority": 1, "localizedTitle": "...", "localizedSnippet": "..."}}]"#
    )
}

/// Annotate `results` with category, priority and localized text.
///
/// Output has the same length, order and links as the input. Each batch of
/// up to [`BATCH_SIZE`] is one model call; a failed call or a reply that is not
/// a JSON array leaves that batch untouched.
pub async fn organize(
    generator: &impl Generator,
    mut results: Vec<SearchResult>,
    options: &AnalysisOptions,
) -> Vec<SearchResult> {
    let mut enriched = 0;
    for batch in results.chunks_mut(BATCH_SIZE) {
        enriched += organize_batch(generator, batch, &options.language).await;
    }
    info!(total = results.len(), enriched, "enrichment complete");
    results
}

async fn organize_batch(
    generator: &impl Generator,
    batch: &mut [SearchResult],
    language: &str,
) -> usize {
    let request = GenerateRequest::new(enrichment_prompt(batch, language)).json();

    let text = match generator.generate(&request).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, size = batch.len(), "enrichment call failed, keeping batch as-is");
            return 0;
        }
    };

    let entries = match parse_json_payload(&text) {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| {
                serde_json::from_value::<Enrichment>(item)
                    .inspect_err(|e| warn!(error = %e, "skipping undecodable enrichment entry"))
                    .ok()
            })
            .collect::<Vec<_>>(),
        _ => {
            warn!("enrichment reply was not a JSON array, keeping batch as-is");
            return 0;
        }
    };

    let mut matched = 0;
    for result in batch.iter_mut() {
        if let Some(entry) = entries
            .iter()
            .find(|e| e.link.as_deref() == Some(result.link.as_str()))
        {
            entry.merge_into(result);
            matched += 1;
        }
    }
    debug!(size = batch.len(), matched, "batch enriched");
    matched
}
