use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::types::{ApiError, GenerateContentResponse, GenerateRequest};
use crate::config::{ApiKey, ConfigError, Config};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 2000;

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("API quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Text generation backed by an LLM.
/// Implemented by `GeminiClient` for production; mock implementations used in tests.
pub trait Generator {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GeminiError>;
}

#[derive(Debug, Clone, Copy)]
struct RetryPolicy {
    attempts: u32,
    initial_backoff_ms: u64,
}

#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
    retry: RetryPolicy,
}

impl GeminiClient {
    pub fn from_config(http: Client, config: &Config) -> Result<Self, ConfigError> {
        let api_key = config.require_gemini_key()?.clone();
        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            base_url: API_BASE.to_string(),
            retry: RetryPolicy {
                attempts: MAX_RETRIES,
                initial_backoff_ms: INITIAL_BACKOFF_MS,
            },
        })
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey::new("test-key"),
            model: crate::config::DEFAULT_MODEL.to_string(),
            base_url: base_url.to_string(),
            retry: RetryPolicy {
                attempts: MAX_RETRIES,
                initial_backoff_ms: 10,
            },
        }
    }

    async fn generate_once(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let model = request.model.as_deref().unwrap_or(&self.model);
        let url = format!("{}/{}:generateContent", self.base_url, model);

        debug_assert!(
            url.starts_with("https://") || cfg!(test),
            "API key must only be sent over HTTPS"
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose())
            .header("User-Agent", crate::USER_AGENT)
            .json(&request.to_wire())
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!(model, "Gemini API rate limited");
            return Err(GeminiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if let Ok(body) = serde_json::from_str::<GenerateContentResponse>(&text)
                && let Some(err) = &body.error
            {
                let classified = classify_api_error(err);
                warn!(error = %classified, "Gemini API error");
                return Err(classified);
            }
            let end = text.floor_char_boundary(200);
            let classified =
                classify_status(status.as_u16(), format!("HTTP {status}: {}", &text[..end]));
            warn!(error = %classified, "Gemini API error (no structured body)");
            return Err(classified);
        }

        let body: GenerateContentResponse = response.json().await?;
        debug!(model, "gemini generation complete");

        if let Some(err) = &body.error {
            let classified = classify_api_error(err);
            warn!(error = %classified, "Gemini API error in 200 response");
            return Err(classified);
        }

        Ok(body)
    }

    fn backoff_ms(&self, attempt: u32) -> u64 {
        jittered_backoff(self.retry.initial_backoff_ms, attempt)
    }
}

impl Generator for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GeminiError> {
        let mut last_err = None;
        for attempt in 0..self.retry.attempts {
            match self.generate_once(request).await {
                Ok(response) => return Ok(response.text()),
                Err(e) if is_retriable(&e) => {
                    last_err = Some(e);
                    if attempt + 1 < self.retry.attempts {
                        let delay_ms = self.backoff_ms(attempt);
                        warn!(
                            attempt = attempt + 1,
                            attempts = self.retry.attempts,
                            delay_ms,
                            "Gemini quota hit, retrying"
                        );
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or(GeminiError::RateLimited))
    }
}

/// Only quota and rate-limit signals are retried; anything else propagates at once.
fn is_retriable(e: &GeminiError) -> bool {
    matches!(e, GeminiError::RateLimited | GeminiError::QuotaExhausted(_))
}

/// Equal jitter backoff: base/2 + rand(0, base/2).
fn jittered_backoff(initial_ms: u64, attempt: u32) -> u64 {
    let base = initial_ms * 2u64.pow(attempt);
    let half = base / 2;
    half + fastrand::u64(..half.max(1))
}

fn is_quota_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("quota") || lower.contains("exhausted")
}

/// Classification for error bodies that carry no structured `error` object.
fn classify_status(code: u16, message: String) -> GeminiError {
    if code == 403 || is_quota_message(&message) {
        GeminiError::QuotaExhausted(message)
    } else {
        GeminiError::Api { code, message }
    }
}

fn classify_api_error(err: &ApiError) -> GeminiError {
    let message = err
        .message
        .clone()
        .unwrap_or_else(|| "Unknown error".to_string());

    match err.code {
        Some(429) => GeminiError::RateLimited,
        Some(403) => GeminiError::QuotaExhausted(message),
        Some(_) if is_quota_message(&message) => GeminiError::QuotaExhausted(message),
        Some(code) => GeminiError::Api { code, message },
        None => GeminiError::Api {
            code: 0,
            message: format!("Unknown error (no status code): {message}"),
        },
    }
}
