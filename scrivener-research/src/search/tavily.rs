//! Tavily search API client

use super::WebSearcher;
use async_trait::async_trait;
use scrivener_core::{
    config_error, search_error, validation_error, ResearchResult, ScrivenerResult, SearchConfig,
    SourceDocument,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::{debug, info};

const COMPONENT: &str = "tavily_search_client";

/// Fixed request parameters; not caller-tunable
pub const SEARCH_DEPTH: &str = "advanced";
pub const MAX_RESULTS: u32 = 5;

/// Tavily search request body
#[derive(Debug, Serialize)]
struct TavilySearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'static str,
    include_answer: bool,
    include_images: bool,
    include_raw_content: bool,
    max_results: u32,
}

impl<'a> TavilySearchRequest<'a> {
    fn new(api_key: &'a str, query: &'a str) -> Self {
        Self {
            api_key,
            query,
            search_depth: SEARCH_DEPTH,
            include_answer: true,
            include_images: false,
            include_raw_content: false,
            max_results: MAX_RESULTS,
        }
    }
}

/// Tavily search response
#[derive(Debug, Deserialize)]
struct TavilySearchResponse {
    answer: Option<String>,
    results: Vec<TavilyResult>,
    #[serde(default, deserialize_with = "deserialize_seconds")]
    response_time: Option<f64>,
}

/// Single Tavily hit
#[derive(Debug, Deserialize)]
struct TavilyResult {
    title: String,
    url: String,
    content: String,
    score: Option<f64>,
}

/// `response_time` has been observed both as a number and as a numeric string
fn deserialize_seconds<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Seconds>::deserialize(deserializer)? {
        Some(Seconds::Number(value)) => Some(value),
        Some(Seconds::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}

impl From<TavilySearchResponse> for ResearchResult {
    fn from(response: TavilySearchResponse) -> Self {
        ResearchResult {
            answer: response.answer.filter(|answer| !answer.trim().is_empty()),
            sources: response
                .results
                .into_iter()
                .map(|result| SourceDocument {
                    title: result.title,
                    url: result.url,
                    content: result.content,
                    relevance_score: result.score,
                })
                .collect(),
            response_time_seconds: response.response_time,
        }
    }
}

/// Tavily search API client
pub struct TavilySearchClient {
    client: reqwest::Client,
    config: SearchConfig,
}

impl TavilySearchClient {
    /// Create a new Tavily client
    pub fn new(config: SearchConfig) -> ScrivenerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("scrivener/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                config_error!(format!("Failed to create HTTP client: {}", e), COMPONENT, e)
                    .with_operation("new")
            })?;

        info!("Created Tavily search client for {}", config.api_url);

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

#[async_trait]
impl WebSearcher for TavilySearchClient {
    async fn search(&self, topic: &str) -> ScrivenerResult<ResearchResult> {
        if topic.trim().is_empty() {
            return Err(validation_error!("Search query must not be empty", "topic", COMPONENT));
        }

        let api_key = self.config.resolved_api_key().ok_or_else(|| {
            config_error!(
                format!(
                    "Search API key not found; set {} or search.api_key",
                    self.config.api_key_env
                ),
                COMPONENT
            )
            .with_operation("search")
        })?;

        debug!("Making Tavily search request for: {}", topic);

        let response = self
            .client
            .post(&self.config.api_url)
            .json(&TavilySearchRequest::new(&api_key, topic))
            .send()
            .await
            .map_err(|e| {
                search_error!(format!("Tavily search failed: {}", e), COMPONENT, e)
                    .with_operation("send")
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(search_error!(
                format!(
                    "Tavily search failed: HTTP {}: {}",
                    status,
                    body.chars().take(200).collect::<String>()
                ),
                COMPONENT
            )
            .with_operation("send")
            .with_metadata("status", status.as_str()));
        }

        let parsed: TavilySearchResponse = response.json().await.map_err(|e| {
            search_error!(
                format!("Failed to parse Tavily response: {}", e),
                COMPONENT,
                e
            )
            .with_operation("parse_response")
        })?;

        let research = ResearchResult::from(parsed);
        info!(
            "Tavily returned {} sources (answer: {})",
            research.sources.len(),
            research.answer.is_some()
        );

        Ok(research)
    }

    fn name(&self) -> &str {
        "tavily"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_fixed_parameters() {
        let request = TavilySearchRequest::new("key", "ai trends");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["query"], "ai trends");
        assert_eq!(value["api_key"], "key");
        assert_eq!(value["search_depth"], "advanced");
        assert_eq!(value["include_answer"], true);
        assert_eq!(value["include_images"], false);
        assert_eq!(value["include_raw_content"], false);
        assert_eq!(value["max_results"], 5);
    }

    #[test]
    fn test_response_time_accepts_number_or_string() {
        let numeric: TavilySearchResponse =
            serde_json::from_str(r#"{"results": [], "response_time": 1.5}"#).unwrap();
        assert_eq!(numeric.response_time, Some(1.5));

        let text: TavilySearchResponse =
            serde_json::from_str(r#"{"results": [], "response_time": "2.25"}"#).unwrap();
        assert_eq!(text.response_time, Some(2.25));

        let absent: TavilySearchResponse = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert_eq!(absent.response_time, None);
    }

    #[test]
    fn test_conversion_keeps_order_and_drops_blank_answer() {
        let response: TavilySearchResponse = serde_json::from_str(
            r#"{
                "answer": "  ",
                "results": [
                    {"title": "First", "url": "https://a", "content": "a", "score": 0.9},
                    {"title": "Second", "url": "https://b", "content": "b"}
                ]
            }"#,
        )
        .unwrap();

        let research = ResearchResult::from(response);
        assert_eq!(research.answer, None);
        assert_eq!(research.sources[0].title, "First");
        assert_eq!(research.sources[0].relevance_score, Some(0.9));
        assert_eq!(research.sources[1].relevance_score, None);
    }
}
