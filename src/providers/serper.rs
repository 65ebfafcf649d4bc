use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{PROVIDER_TIMEOUT, ProviderError, RESULTS_PER_QUERY};
use crate::config::ApiKey;
use crate::search::{SearchResult, TimeFilter};

const API_URL: &str = "https://google.serper.dev/search";

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    gl: &'a str,
    hl: &'a str,
    num: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    tbs: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicHit>,
}

#[derive(Debug, Deserialize)]
struct OrganicHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    date: Option<String>,
}

/// Google results via serper.dev.
#[derive(Clone)]
pub struct SerperClient {
    http: Client,
    api_key: ApiKey,
    url: String,
}

impl SerperClient {
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

    /// Search one region/language. Never fails: errors are logged and yield no rows.
    pub async fn run(
        &self,
        query: &str,
        gl: &str,
        hl: &str,
        label: &str,
        time: TimeFilter,
    ) -> Vec<SearchResult> {
        match self.try_run(query, gl, hl, label, time).await {
            Ok(results) => {
                debug!(label, count = results.len(), "serper search complete");
                results
            }
            Err(e) => {
                warn!(label, error = %e, "serper search failed, continuing without it");
                Vec::new()
            }
        }
    }

    async fn try_run(
        &self,
        query: &str,
        gl: &str,
        hl: &str,
        label: &str,
        time: TimeFilter,
    ) -> Result<Vec<SearchResult>, ProviderError> {
        let body = SerperRequest {
            q: query,
            gl,
            hl,
            num: RESULTS_PER_QUERY,
            tbs: time.serper_tbs(),
        };

        let response = self
            .http
            .post(&self.url)
            .header("X-API-KEY", self.api_key.expose())
            .header("User-Agent", crate::USER_AGENT)
            .json(&body)
            .timeout(PROVIDER_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let parsed: SerperResponse = response.json().await?;
        Ok(parsed
            .organic
            .into_iter()
            .filter(|hit| !hit.link.is_empty())
            .map(|hit| SearchResult {
                date: hit.date,
                ..SearchResult::new(hit.title, hit.link, hit.snippet, label)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn maps_organic_results_with_caller_label() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-API-KEY", "test-key"))
            .and(body_json(serde_json::json!({
                "q": "Stahl site:.de",
                "gl": "de",
                "hl": "de",
                "num": 20,
                "tbs": "qdr:m"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organic": [
                    {"title": "A", "link": "https://a.de", "snippet": "sa", "date": "2 days ago", "position": 1},
                    {"title": "B", "link": "https://b.de", "snippet": "sb"}
                ]
            })))
            .mount(&server)
            .await;

        let client = SerperClient::with_url(Client::new(), &server.uri());
        let results = client
            .run("Stahl site:.de", "de", "de", "Google-Germany", TimeFilter::Month)
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].link, "https://a.de");
        assert_eq!(results[0].date.as_deref(), Some("2 days ago"));
        assert_eq!(results[1].date, None);
        assert!(results.iter().all(|r| r.source == "Google-Germany"));
        assert!(results.iter().all(|r| r.category.is_none()));
    }

    #[tokio::test]
    async fn all_filter_omits_tbs() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({
                "q": "steel", "gl": "eu", "hl": "en", "num": 20
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organic": [{"title": "A", "link": "https://a.com", "snippet": "s"}]
            })))
            .mount(&server)
            .await;

        let client = SerperClient::with_url(Client::new(), &server.uri());
        let results = client.run("steel", "eu", "en", "x", TimeFilter::All).await;
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn error_status_yields_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = SerperClient::with_url(Client::new(), &server.uri());
        let results = client.run("q", "de", "de", "x", TimeFilter::Day).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn missing_organic_yields_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "searchParameters": {"q": "q"}
            })))
            .mount(&server)
            .await;

        let client = SerperClient::with_url(Client::new(), &server.uri());
        assert!(client.run("q", "de", "de", "x", TimeFilter::All).await.is_empty());
    }

    #[tokio::test]
    async fn unreachable_host_yields_empty() {
        let client = SerperClient::with_url(Client::new(), "http://127.0.0.1:1/search");
        assert!(client.run("q", "de", "de", "x", TimeFilter::All).await.is_empty());
    }
}
