use tracing::{info, warn};

use super::AnalysisOptions;
use crate::gemini::{GeminiError, GenerateRequest, Generator};
use crate::search::SearchResult;

/// Results fed into the report context.
pub const TOP_RESULTS: usize = 20;

/// Report text when the model answers with nothing.
pub const REPORT_EMPTY: &str = "Report generation failed.";
/// Report text when the model call fails.
pub const REPORT_FAILED: &str = "Failed to generate report due to API error.";

/// The `n` highest-priority results; equal priorities keep their input order.
pub fn select_top(results: &[SearchResult], n: usize) -> Vec<&SearchResult> {
    let mut ranked: Vec<&SearchResult> = results.iter().collect();
    ranked.sort_by_key(|r| r.rank());
    ranked.truncate(n);
    ranked
}

pub fn build_context(results: &[&SearchResult]) -> String {
    results
        .iter()
        .map(|r| {
            format!(
                "[{date}] {source} ({category})\nTitle: {title}\nSummary: {snippet}\nLink: {link}",
                date = r.date.as_deref().unwrap_or("Recent"),
                source = r.source,
                category = r.category_or_default(),
                title = r.title,
                snippet = r.snippet,
                link = r.link,
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

fn system_instruction(language: &str, focus: Option<&str>) -> String {
    let mut instruction = format!(
        r#"You are the Chief Strategy Officer for POSCO Europe. Your main competitor is ArcelorMittal.

Task: write a high-level "Executive Market Strategy Report" in {language}.
Style: professional, insightful, strategic, confidential.
Format: Markdown.

Structure:
1. Critical Safety & Security Alert (if ANY safety/accident news exists, it comes FIRST).
2. Critical Strategic Moves (key competitor moves or regulatory shifts).
3. Regional Analysis (EU core vs MENA/non-EU).
4. Competitor Intel (ArcelorMittal's specific moves).
5. Strategic Recommendations for POSCO Europe."#
    );
    if let Some(focus) = focus.map(str::trim).filter(|f| !f.is_empty()) {
        instruction.push_str(&format!(
            "\n\nSPECIAL FOCUS REQUEST: \"{focus}\" - elaborate deeply on this."
        ));
    }
    instruction
}

fn report_request(
    query: &str,
    results: &[SearchResult],
    focus: Option<&str>,
    options: &AnalysisOptions,
) -> GenerateRequest {
    let top = select_top(results, TOP_RESULTS);
    let prompt = format!(
        "Query: \"{query}\"\n\nMarket Intelligence Data:\n{}\n\nGenerate the report now.",
        build_context(&top)
    );

    let request =
        GenerateRequest::new(prompt).with_system(system_instruction(&options.language, focus));
    match &options.report_model {
        Some(model) => request.with_model(model.clone()),
        None => request,
    }
}

/// Generate the executive report, surfacing model errors to the caller.
///
/// A `focus` regenerates the whole report from the same results with extra
/// emphasis on that topic.
pub async fn try_summarize(
    generator: &impl Generator,
    query: &str,
    results: &[SearchResult],
    focus: Option<&str>,
    options: &AnalysisOptions,
) -> Result<String, GeminiError> {
    let request = report_request(query, results, focus, options);
    let text = generator.generate(&request).await?;
    if text.trim().is_empty() {
        warn!("model returned an empty report");
        return Ok(REPORT_EMPTY.to_string());
    }
    info!(chars = text.len(), focused = focus.is_some(), "report generated");
    Ok(text)
}

/// Like [`try_summarize`], but a failed call yields [`REPORT_FAILED`] instead of an error.
pub async fn summarize(
    generator: &impl Generator,
    query: &str,
    results: &[SearchResult],
    focus: Option<&str>,
    options: &AnalysisOptions,
) -> String {
    try_summarize(generator, query, results, focus, options)
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "report generation failed");
            REPORT_FAILED.to_string()
        })
}
