use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{PROVIDER_TIMEOUT, ProviderError, RESULTS_PER_QUERY};
use crate::config::ApiKey;
use crate::search::{SearchResult, TimeFilter};

const API_URL: &str = "https://api.search.brave.com/res/v1/web/search";

#[derive(Debug, Deserialize)]
struct BraveResponse {
    web: Option<WebSection>,
}

#[derive(Debug, Deserialize)]
struct WebSection {
    #[serde(default)]
    results: Vec<WebHit>,
}

#[derive(Debug, Deserialize)]
struct WebHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
    age: Option<String>,
}

/// Brave Search web results.
#[derive(Clone)]
pub struct BraveClient {
    http: Client,
    api_key: ApiKey,
    url: String,
}

impl BraveClient {
    pub fn new(http: Client, api_key: ApiKey) -> Self {
        Self {
            http,
            api_key,
            url: API_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_url(http: Client, url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey::new("test-key"),
            url: url.to_string(),
        }
    }

    /// Search globally. Never fails: errors are logged and yield no rows.
    pub async fn run(&self, query: &str, label: &str, time: TimeFilter) -> Vec<SearchResult> {
        match self.try_run(query, label, time).await {
            Ok(results) => {
                debug!(label, count = results.len(), "brave search complete");
                results
            }
            Err(e) => {
                warn!(label, error = %e, "brave search failed, continuing without it");
                Vec::new()
            }
        }
    }

    fn request_url(&self, query: &str, time: TimeFilter) -> Result<url::Url, ProviderError> {
        let count = RESULTS_PER_QUERY.to_string();
        let mut params = vec![("q", query), ("count", count.as_str())];
        if let Some(freshness) = time.brave_freshness() {
            params.push(("freshness", freshness));
        }
        Ok(url::Url::parse_with_params(&self.url, &params)?)
    }

    async fn try_run(
        &self,
        query: &str,
        label: &str,
        time: TimeFilter,
    ) -> Result<Vec<SearchResult>, ProviderError> {
        let url = self.request_url(query, time)?;

        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", self.api_key.expose())
            .header("User-Agent", crate::USER_AGENT)
            .timeout(PROVIDER_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let parsed: BraveResponse = response.json().await?;
        Ok(parsed
            .web
            .map(|w| w.results)
            .unwrap_or_default()
            .into_iter()
            .filter(|hit| !hit.url.is_empty())
            .map(|hit| SearchResult {
                date: hit.age,
                ..SearchResult::new(hit.title, hit.url, hit.description, label)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn request_url_encodes_params() {
        let client = BraveClient::with_url(Client::new(), "https://example.com/search");
        let url = client.request_url("steel & hydrogen", TimeFilter::Year).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("q".into(), "steel & hydrogen".into()),
                ("count".into(), "20".into()),
                ("freshness".into(), "py".into()),
            ]
        );
    }

    #[test]
    fn request_url_without_freshness_for_all() {
        let client = BraveClient::with_url(Client::new(), "https://example.com/search");
        let url = client.request_url("steel", TimeFilter::All).unwrap();
        assert!(url.query_pairs().all(|(k, _)| k != "freshness"));
    }

    #[tokio::test]
    async fn maps_web_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("X-Subscription-Token", "test-key"))
            .and(query_param("q", "steel news"))
            .and(query_param("freshness", "pw"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "web": {"results": [
                    {"title": "T", "url": "https://t.com", "description": "D", "age": "3 days ago"}
                ]}
            })))
            .mount(&server)
            .await;

        let client = BraveClient::with_url(Client::new(), &server.uri());
        let results = client.run("steel news", "Brave-Europe", TimeFilter::Week).await;

        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert_eq!(r.link, "https://t.com");
        assert_eq!(r.snippet, "D");
        assert_eq!(r.date.as_deref(), Some("3 days ago"));
        assert_eq!(r.source, "Brave-Europe");
    }

    #[tokio::test]
    async fn missing_web_section_yields_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "type": "search"
            })))
            .mount(&server)
            .await;

        let client = BraveClient::with_url(Client::new(), &server.uri());
        assert!(client.run("q", "x", TimeFilter::All).await.is_empty());
    }

    #[tokio::test]
    async fn rate_limited_yields_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = BraveClient::with_url(Client::new(), &server.uri());
        assert!(client.run("q", "x", TimeFilter::All).await.is_empty());
    }
}
