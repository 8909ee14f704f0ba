//! Finance router: intent classification and tool fallback chains.
//!
//! Classification walks a fixed route table; the first row whose keywords
//! appear in the lowercased query wins. Table order is part of the
//! contract: "latest budget news" is time-sensitive, not a budget query.
//!
//! | # | Route | Trigger |
//! |---|-------|---------|
//! | 1 | [`Route::TimeSensitive`] | ipo, repo rate, latest, news, stock, ... |
//! | 2 | [`Route::StockPrice`] | stock price, share price, price of |
//! | 3 | [`Route::News`] | news, headline, headlines |
//! | 4 | [`Route::SavingsGoal`] | save/saving + month(s), with amount and months |
//! | 5 | [`Route::Budget`] | salary, income, budget |
//! | 6 | [`Route::Default`] | anything else |
//!
//! Tool failures never escape [`FinanceRouter::route`]: each branch either
//! falls back to another tool or hands the failure payload to the
//! formatter.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::ToolError;
use crate::formatter::ResponseFormatter;
use crate::llm::{with_history, CompletionProvider};
use crate::models::{ConversationTurn, ExtractedSignal};
use crate::session::{recent, HISTORY_WINDOW};
use crate::signals::{extract_signal, guess_ticker_from_text};
use crate::tools::budget::{savings_goal, split_budget};
use crate::tools::{MarketData, WebSearch};

/// Symbol used when no other resolution step produced one.
pub const FALLBACK_TICKER: &str = "AAPL";

/// Monthly income assumed by the budget route when the query has no amount.
pub const DEFAULT_INCOME: u64 = 50_000;

const TIME_SENSITIVE_KEYWORDS: &[&str] = &[
    "ipo",
    "upcoming",
    "repo rate",
    "interest rate",
    "latest",
    "today",
    "current",
    "deadline",
    "update",
    "announcement",
    "new rules",
    "happened on",
    "union budget",
    "news",
    "stocks",
    "stock",
    "announced",
];
const STOCK_PRICE_KEYWORDS: &[&str] = &["stock price", "share price", "price of"];
const NEWS_KEYWORDS: &[&str] = &["news", "headline", "headlines"];
const SAVE_KEYWORDS: &[&str] = &["save", "saving"];
const MONTH_KEYWORDS: &[&str] = &["month", "months"];
const BUDGET_KEYWORDS: &[&str] = &["salary", "income", "budget"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    TimeSensitive,
    StockPrice,
    News,
    SavingsGoal,
    Budget,
    Default,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::TimeSensitive => "time_sensitive",
            Route::StockPrice => "stock_price",
            Route::News => "news",
            Route::SavingsGoal => "savings_goal",
            Route::Budget => "budget",
            Route::Default => "default",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the stock-price route arrived at its symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TickerSource {
    Direct,
    SymbolSearch,
    WebGuess,
    Fallback,
}

/// The answer for one query plus the route that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct RouteOutcome {
    pub route: Route,
    pub answer: String,
    /// Structured payload handed to the formatter. `None` for the default route.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

/// Pick the route for a query. The savings row only matches when both an
/// amount and a positive month count were extracted; otherwise the query
/// continues down the table.
pub fn classify(query: &str, signal: &ExtractedSignal) -> Route {
    let q = query.to_lowercase();

    if contains_any(&q, TIME_SENSITIVE_KEYWORDS) {
        return Route::TimeSensitive;
    }
    if contains_any(&q, STOCK_PRICE_KEYWORDS) {
        return Route::StockPrice;
    }
    if contains_any(&q, NEWS_KEYWORDS) {
        return Route::News;
    }
    if contains_any(&q, SAVE_KEYWORDS)
        && contains_any(&q, MONTH_KEYWORDS)
        && signal.amount.is_some()
        && signal.months.is_some_and(|m| m > 0)
    {
        return Route::SavingsGoal;
    }
    if contains_any(&q, BUDGET_KEYWORDS) {
        return Route::Budget;
    }
    Route::Default
}

fn failure_payload(query: &str, e: &ToolError) -> Value {
    json!({
        "query": query,
        "error": e.to_string(),
        "status": e.status(),
    })
}

pub struct FinanceRouter {
    market: Arc<dyn MarketData>,
    web: Arc<dyn WebSearch>,
    llm: Arc<dyn CompletionProvider>,
    formatter: ResponseFormatter,
    news_days: i64,
}

impl FinanceRouter {
    pub fn new(
        market: Arc<dyn MarketData>,
        web: Arc<dyn WebSearch>,
        llm: Arc<dyn CompletionProvider>,
        news_days: i64,
    ) -> Self {
        Self {
            market,
            web,
            formatter: ResponseFormatter::new(llm.clone()),
            llm,
            news_days,
        }
    }

    /// Route one query and produce a natural-language answer.
    pub async fn route(&self, query: &str, history: &[ConversationTurn]) -> RouteOutcome {
        let signal = extract_signal(query);
        let route = classify(query, &signal);
        info!(%route, "Routed query");

        let payload = match route {
            Route::TimeSensitive => self.time_sensitive(query, &signal).await,
            Route::StockPrice => self.stock_price(query, &signal).await,
            Route::News => self.news(query, &signal).await,
            Route::SavingsGoal => match savings_payload(&signal) {
                Some(payload) => payload,
                // classify guarantees amount and months
                None => return self.default_answer(query, history).await,
            },
            Route::Budget => budget_payload(&signal),
            Route::Default => return self.default_answer(query, history).await,
        };

        let answer = self.formatter.format(query, &payload, history).await;
        RouteOutcome {
            route,
            answer,
            raw: Some(payload),
        }
    }

    async fn web_payload(&self, search_query: &str) -> Value {
        match self.web.search(search_query).await {
            Ok(results) => json!({ "source": "web_search", "results": results }),
            Err(e) => {
                warn!(error = %e, "Web search failed");
                failure_payload(search_query, &e)
            }
        }
    }

    async fn time_sensitive(&self, query: &str, signal: &ExtractedSignal) -> Value {
        let search_query = signal.date_query.as_deref().unwrap_or(query);
        debug!(search_query, "Time-sensitive web search");
        self.web_payload(search_query).await
    }

    /// Direct extraction, then symbol search on the cleaned phrase.
    async fn resolve_ticker(&self, signal: &ExtractedSignal) -> Option<(String, TickerSource)> {
        if let Some(ticker) = &signal.ticker {
            return Some((ticker.clone(), TickerSource::Direct));
        }
        match self.market.symbol_search(&signal.company).await {
            Ok(matches) => matches
                .into_iter()
                .next()
                .map(|m| (m.symbol, TickerSource::SymbolSearch)),
            Err(e) => {
                warn!(error = %e, company = %signal.company, "Symbol search failed");
                None
            }
        }
    }

    async fn guess_ticker_from_web(&self, query: &str) -> Option<String> {
        match self.web.search(&format!("{} ticker symbol", query)).await {
            Ok(results) => guess_ticker_from_text(&results.text_blob()),
            Err(e) => {
                warn!(error = %e, "Ticker web search failed");
                None
            }
        }
    }

    async fn stock_price(&self, query: &str, signal: &ExtractedSignal) -> Value {
        let (symbol, resolved_by) = match self.resolve_ticker(signal).await {
            Some(found) => found,
            None => match self.guess_ticker_from_web(query).await {
                Some(guess) => (guess, TickerSource::WebGuess),
                None => (FALLBACK_TICKER.to_string(), TickerSource::Fallback),
            },
        };
        debug!(%symbol, ?resolved_by, "Resolved ticker");

        let quote_problem = match self.market.quote(&symbol).await {
            Ok(quote) if quote.current != 0.0 => {
                return json!({
                    "source": "market_data",
                    "symbol": symbol,
                    "resolved_by": resolved_by,
                    "quote": quote,
                });
            }
            Ok(_) => "quote reported a zero current price".to_string(),
            Err(e) => e.to_string(),
        };

        warn!(%symbol, reason = %quote_problem, "Quote unusable, searching the web");
        let mut payload = self.web_payload(&format!("{} live stock price", query)).await;
        if let Value::Object(map) = &mut payload {
            map.insert("symbol".to_string(), json!(symbol));
            map.insert("quote_error".to_string(), json!(quote_problem));
        }
        payload
    }

    async fn news(&self, query: &str, signal: &ExtractedSignal) -> Value {
        if let Some(dated) = &signal.date_query {
            debug!(search_query = %dated, "Dated news search");
            return self.web_payload(dated).await;
        }

        let Some((symbol, _)) = self.resolve_ticker(signal).await else {
            return self.web_payload(query).await;
        };

        match self.market.company_news(&symbol, self.news_days).await {
            Ok(articles) if !articles.is_empty() => json!({
                "source": "company_news",
                "symbol": symbol,
                "articles": articles,
            }),
            Ok(_) => {
                debug!(%symbol, "No company news, searching the web");
                self.web_payload(query).await
            }
            Err(e) => {
                warn!(%symbol, error = %e, "Company news failed, searching the web");
                self.web_payload(query).await
            }
        }
    }

    async fn default_answer(&self, query: &str, history: &[ConversationTurn]) -> RouteOutcome {
        let messages = with_history(None, recent(history, HISTORY_WINDOW), query);
        let answer = match self.llm.complete(&messages).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Default completion failed");
                format!(
                    "Sorry, I couldn't generate an answer right now ({}). Please try again shortly.",
                    e
                )
            }
        };
        RouteOutcome {
            route: Route::Default,
            answer,
            raw: None,
        }
    }
}

fn savings_payload(signal: &ExtractedSignal) -> Option<Value> {
    let goal = savings_goal(signal.amount?, signal.months?)?;
    Some(json!({ "source": "savings_goal", "plan": goal }))
}

fn budget_payload(signal: &ExtractedSignal) -> Value {
    let plan = split_budget(signal.amount.unwrap_or(DEFAULT_INCOME));
    json!({
        "source": "budget",
        "assumed_income": signal.amount.is_none(),
        "plan": plan,
    })
}
