//! Domain tools: thin adapters over external data sources.
//!
//! Each tool call returns a [`ToolResult`]; HTTP failures come back as
//! [`ToolError`](crate::error::ToolError) values so the router can inspect
//! them and pick a fallback. No tool calls another tool.
//!
//! | Trait | Implementation | Upstream |
//! |-------|----------------|----------|
//! | [`MarketData`] | [`finnhub::FinnhubClient`] | quote, symbol search, company news |
//! | [`WebSearch`] | [`tavily::TavilyClient`] | ranked web results |
//!
//! Budget arithmetic ([`budget`]) is local and infallible.

pub mod budget;
pub mod finnhub;
pub mod tavily;

use async_trait::async_trait;

use crate::error::ToolResult;
use crate::models::{NewsArticle, Quote, SearchResults, SymbolMatch};

/// Market quotes, symbol search and company news.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Latest quote for `symbol`.
    async fn quote(&self, symbol: &str) -> ToolResult<Quote>;

    /// Candidate symbols for a cleaned company phrase, best match first.
    async fn symbol_search(&self, query: &str) -> ToolResult<Vec<SymbolMatch>>;

    /// Up to five articles about `symbol` from the trailing `days` days.
    async fn company_news(&self, symbol: &str, days: i64) -> ToolResult<Vec<NewsArticle>>;
}

/// Free-text web search.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> ToolResult<SearchResults>;
}
