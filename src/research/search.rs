use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Search depth requested from the provider on every call.
pub const SEARCH_DEPTH: &str = "basic";
/// Results requested per query.
pub const MAX_RESULTS: usize = 5;

const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";

/// One search hit as returned by the provider. Missing fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResult {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

/// A search provider queried once per planned query.
#[async_trait]
pub trait EvidenceSource: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<RawResult>>;
}

/// Tavily API client.
pub struct TavilySource {
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    search_depth: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl From<TavilyResult> for RawResult {
    fn from(r: TavilyResult) -> Self {
        RawResult {
            url: r.url.unwrap_or_default(),
            title: r.title.unwrap_or_default(),
            snippet: r.content.unwrap_or_default(),
        }
    }
}

impl TavilySource {
    pub fn new(api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { api_key, client })
    }
}

#[async_trait]
impl EvidenceSource for TavilySource {
    async fn search(&self, query: &str) -> Result<Vec<RawResult>> {
        let request = TavilyRequest {
            query,
            search_depth: SEARCH_DEPTH,
            max_results: MAX_RESULTS,
        };

        let response = self
            .client
            .post(TAVILY_ENDPOINT)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .context("Failed to send Tavily search request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Tavily API error {}: {}", status, body);
        }

        let text = response.text().await.context("Failed to read Tavily response")?;
        let mut results = parse_response(&text)?;
        results.truncate(MAX_RESULTS);

        debug!(query, count = results.len(), "Tavily search");
        Ok(results)
    }
}

fn parse_response(body: &str) -> Result<Vec<RawResult>> {
    let parsed: TavilyResponse =
        serde_json::from_str(body).context("Failed to parse Tavily response")?;
    Ok(parsed.results.into_iter().map(RawResult::from).collect())
}

/// Stand-in used when no search API key is configured. Every query fails, so
/// the report states that no external evidence could be gathered.
pub struct UnconfiguredSource;

#[async_trait]
impl EvidenceSource for UnconfiguredSource {
    async fn search(&self, _query: &str) -> Result<Vec<RawResult>> {
        anyhow::bail!("no search provider configured (TAVILY_API_KEY unset)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tavily_response() {
        let body = r#"{
            "query": "q",
            "results": [
                {"title": "Le Petit Cafe", "url": "https://lepetitcafe.ch", "content": "Bistro", "score": 0.91},
                {"url": "https://guide.michelin.com/x", "title": null}
            ]
        }"#;
        let results = parse_response(body).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].snippet, "Bistro");
        assert_eq!(results[1].title, "");
        assert_eq!(results[1].snippet, "");
    }

    #[test]
    fn test_parse_missing_results_is_empty() {
        assert!(parse_response(r#"{"answer": null}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed_is_error() {
        assert!(parse_response("<html>502</html>").is_err());
    }

    #[tokio::test]
    async fn test_unconfigured_source_fails() {
        assert!(UnconfiguredSource.search("anything").await.is_err());
    }
}
