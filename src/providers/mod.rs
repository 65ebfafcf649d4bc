//! Web-search provider adapters. Each normalizes its own JSON into `SearchResult`
//! and fails open: a broken provider yields no rows rather than an error.

pub mod brave;
pub mod serper;

pub use brave::BraveClient;
pub use serper::SerperClient;

use std::time::Duration;

/// Per-request timeout for provider calls.
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(15);
/// Rows requested from each provider per query.
const RESULTS_PER_QUERY: u8 = 20;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
