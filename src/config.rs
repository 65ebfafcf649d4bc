//! Environment-driven configuration. API keys are never embedded.

use std::env;
use std::fmt;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_REPORT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_LANGUAGE: &str = "Korean";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY not set. Get one at https://aistudio.google.com/apikey")]
    GeminiKeyNotSet,
}

/// Secret wrapper whose `Debug` output never reveals the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    #[cfg(test)]
    pub(crate) fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_key: Option<ApiKey>,
    pub model: String,
    pub report_model: String,
    pub serper_key: Option<ApiKey>,
    pub brave_key: Option<ApiKey>,
    pub language: String,
    pub strict_safety: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let text = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let key = |name: &str| text(name).map(ApiKey);

        let strict_safety = text("STEELWATCH_STRICT_SAFETY")
            .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "off" | "no"))
            .unwrap_or(true);

        Self {
            gemini_key: key("GEMINI_API_KEY"),
            model: text("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            report_model: text("GEMINI_REPORT_MODEL")
                .unwrap_or_else(|| DEFAULT_REPORT_MODEL.to_string()),
            serper_key: key("SERPER_API_KEY"),
            brave_key: key("BRAVE_API_KEY"),
            language: text("STEELWATCH_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            strict_safety,
        }
    }

    pub fn require_gemini_key(&self) -> Result<&ApiKey, ConfigError> {
        self.gemini_key.as_ref().ok_or(ConfigError::GeminiKeyNotSet)
    }
}
