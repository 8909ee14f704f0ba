//! Finnhub market-data client.
//!
//! Endpoints used: `GET /quote`, `GET /search`, `GET /company-news`.
//! A non-200 status is returned as [`ToolError::Upstream`] with the raw
//! body; Finnhub reports plan restrictions as HTTP 403.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Local};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::MarketConfig;
use crate::error::{ToolError, ToolResult};
use crate::models::{NewsArticle, Quote, SymbolMatch};
use crate::tools::MarketData;

const MAX_ARTICLES: usize = 5;

pub struct FinnhubClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl FinnhubClient {
    pub fn new(config: &MarketConfig, api_key: Option<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> ToolResult<T> {
        let token = self.api_key.as_deref().ok_or(ToolError::Disabled("Finnhub"))?;

        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(params)
            .query(&[("token", token)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(path, status = status.as_u16(), "Finnhub request rejected");
            return Err(ToolError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ToolError::Decode(e.to_string()))
    }
}

#[derive(Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    c: Option<f64>,
    #[serde(default)]
    h: Option<f64>,
    #[serde(default)]
    l: Option<f64>,
    #[serde(default)]
    o: Option<f64>,
    #[serde(default)]
    pc: Option<f64>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<SearchEntry>,
}

#[derive(Deserialize)]
struct SearchEntry {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "displaySymbol")]
    display_symbol: String,
    #[serde(default, rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct NewsEntry {
    #[serde(default)]
    headline: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    summary: String,
}

#[async_trait]
impl MarketData for FinnhubClient {
    async fn quote(&self, symbol: &str) -> ToolResult<Quote> {
        debug!(symbol, "Fetching quote");
        let raw: QuoteResponse = self.get("/quote", &[("symbol", symbol)]).await?;
        Ok(Quote {
            symbol: symbol.to_string(),
            current: raw.c.unwrap_or(0.0),
            high: raw.h.unwrap_or(0.0),
            low: raw.l.unwrap_or(0.0),
            open: raw.o.unwrap_or(0.0),
            prev_close: raw.pc.unwrap_or(0.0),
        })
    }

    async fn symbol_search(&self, query: &str) -> ToolResult<Vec<SymbolMatch>> {
        debug!(query, "Searching symbols");
        let raw: SearchResponse = self.get("/search", &[("q", query)]).await?;
        Ok(raw
            .result
            .into_iter()
            .filter(|e| !e.symbol.is_empty())
            .map(|e| SymbolMatch {
                symbol: e.symbol,
                description: e.description,
                display_symbol: e.display_symbol,
                kind: e.kind,
            })
            .collect())
    }

    async fn company_news(&self, symbol: &str, days: i64) -> ToolResult<Vec<NewsArticle>> {
        let to = Local::now().date_naive();
        let from = to - ChronoDuration::days(days);
        let from = from.format("%Y-%m-%d").to_string();
        let to = to.format("%Y-%m-%d").to_string();

        debug!(symbol, %from, %to, "Fetching company news");
        let raw: Vec<NewsEntry> = self
            .get(
                "/company-news",
                &[("symbol", symbol), ("from", from.as_str()), ("to", to.as_str())],
            )
            .await?;

        Ok(raw
            .into_iter()
            .take(MAX_ARTICLES)
            .map(|e| NewsArticle {
                headline: e.headline,
                source: e.source,
                url: e.url,
                summary: e.summary,
            })
            .collect())
    }
}
