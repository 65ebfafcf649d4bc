use serde_json::Value;
use tracing::warn;

/// Parse a JSON-mode model reply, tolerating a surrounding markdown code fence.
pub fn parse_json_payload(text: &str) -> Option<Value> {
    let cleaned = strip_code_fences(text);
    if cleaned.is_empty() {
        return None;
    }
    serde_json::from_str(&cleaned)
        .inspect_err(|e| warn!(error = %e, "failed to parse model JSON"))
        .ok()
}

fn strip_code_fences(text: &str) -> String {
    text.trim()
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
