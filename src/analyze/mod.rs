//! LLM-backed enrichment of search results: categorization, the executive
//! report and per-article deep dives. Every stage fails open.

mod dive;
mod enrich;
mod safety;
mod summarize;

pub use dive::{DeepDive, deep_dive};
pub use enrich::organize;
pub use safety::enforce_safety;
pub use summarize::{REPORT_FAILED, select_top, summarize, try_summarize};

/// Options shared by the enrichment and report prompts.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Language for localized titles/snippets and the report.
    pub language: String,
    /// Model used for the report; `None` uses the generator's default.
    pub report_model: Option<String>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            language: crate::config::DEFAULT_LANGUAGE.to_string(),
            report_model: None,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::gemini::{GeminiError, GenerateRequest, Generator};

    /// Scripted generator: replays queued replies, then a fixed reply (or an error).
    pub struct MockGenerator {
        queue: Mutex<VecDeque<Result<String, GeminiError>>>,
        repeat: Option<String>,
        requests: Mutex<Vec<GenerateRequest>>,
    }

    impl MockGenerator {
        pub fn replying(text: &str) -> Self {
            Self {
                queue: Mutex::new(VecDeque::new()),
                repeat: Some(text.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn sequence(replies: Vec<Result<String, GeminiError>>) -> Self {
            Self {
                queue: Mutex::new(replies.into()),
                repeat: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(error: GeminiError) -> Self {
            Self::sequence(vec![Err(error)])
        }

        pub fn captured(&self) -> Vec<GenerateRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Generator for MockGenerator {
        async fn generate(&self, request: &GenerateRequest) -> Result<String, GeminiError> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(reply) = self.queue.lock().unwrap().pop_front() {
                return reply;
            }
            self.repeat.clone().ok_or(GeminiError::RateLimited)
        }
    }
}
