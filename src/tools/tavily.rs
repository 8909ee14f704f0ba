//! Tavily web-search client (`POST /search`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::error::{ToolError, ToolResult};
use crate::models::{SearchHit, SearchResults};
use crate::tools::WebSearch;

pub struct TavilyClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    max_results: usize,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchHit>,
}

impl TavilyClient {
    pub fn new(config: &SearchConfig, api_key: Option<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            max_results: config.max_results,
        })
    }
}

#[async_trait]
impl WebSearch for TavilyClient {
    async fn search(&self, query: &str) -> ToolResult<SearchResults> {
        let api_key = self.api_key.as_deref().ok_or(ToolError::Disabled("Tavily"))?;

        debug!(query, "Web search");
        let body = serde_json::json!({
            "query": query,
            "max_results": self.max_results,
            "include_answer": true,
        });

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Tavily search rejected");
            return Err(ToolError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| ToolError::Decode(e.to_string()))?;

        Ok(SearchResults {
            query: query.to_string(),
            results: parsed.results,
            answer: parsed.answer.filter(|a| !a.trim().is_empty()),
        })
    }
}
