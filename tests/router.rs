use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use finsight::error::{Error, Result, ToolError, ToolResult};
use finsight::llm::{ChatMessage, CompletionProvider};
use finsight::models::{
    ConversationTurn, NewsArticle, Quote, SearchHit, SearchResults, SymbolMatch,
};
use finsight::router::{FinanceRouter, Route};
use finsight::tools::{MarketData, WebSearch};

// ============ Fakes ============

#[derive(Default)]
struct FakeMarket {
    quote: Option<ToolResult<Quote>>,
    symbols: Vec<SymbolMatch>,
    symbol_error: Option<ToolError>,
    news: Vec<NewsArticle>,
    news_error: Option<ToolError>,
    calls: Mutex<Vec<String>>,
}

impl FakeMarket {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

fn quote(symbol: &str, current: f64) -> Quote {
    Quote {
        symbol: symbol.to_string(),
        current,
        high: current,
        low: current,
        open: current,
        prev_close: current,
    }
}

#[async_trait]
impl MarketData for FakeMarket {
    async fn quote(&self, symbol: &str) -> ToolResult<Quote> {
        self.calls.lock().unwrap().push(format!("quote:{}", symbol));
        self.quote
            .clone()
            .unwrap_or_else(|| Ok(quote(symbol, 101.5)))
    }

    async fn symbol_search(&self, query: &str) -> ToolResult<Vec<SymbolMatch>> {
        self.calls.lock().unwrap().push(format!("symbol_search:{}", query));
        match &self.symbol_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.symbols.clone()),
        }
    }

    async fn company_news(&self, symbol: &str, days: i64) -> ToolResult<Vec<NewsArticle>> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("company_news:{}:{}", symbol, days));
        match &self.news_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.news.clone()),
        }
    }
}

#[derive(Default)]
struct FakeWeb {
    fail: bool,
    hits: Vec<SearchHit>,
    queries: Mutex<Vec<String>>,
}

impl FakeWeb {
    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearch for FakeWeb {
    async fn search(&self, query: &str) -> ToolResult<SearchResults> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(ToolError::Disabled("Tavily"));
        }
        Ok(SearchResults {
            query: query.to_string(),
            results: self.hits.clone(),
            answer: None,
        })
    }
}

struct FakeLlm {
    reply: Option<String>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeLlm {
    fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            reply: None,
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CompletionProvider for FakeLlm {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.reply
            .clone()
            .ok_or_else(|| Error::Completion("GROQ_API_KEY not configured".to_string()))
    }
}

fn hit(title: &str, content: &str) -> SearchHit {
    SearchHit {
        title: title.to_string(),
        url: "https://example.com".to_string(),
        content: content.to_string(),
        score: 0.8,
    }
}

fn router(market: Arc<FakeMarket>, web: Arc<FakeWeb>, llm: Arc<FakeLlm>) -> FinanceRouter {
    FinanceRouter::new(market, web, llm, 7)
}

// ============ Stock price ============

#[tokio::test]
async fn test_stock_price_direct_ticker_quote() {
    let market = Arc::new(FakeMarket::default());
    let web = Arc::new(FakeWeb::default());
    let llm = Arc::new(FakeLlm::replying("Infosys trades at 101.5."));
    let outcome = router(market.clone(), web.clone(), llm)
        .route("share price of infosys", &[])
        .await;

    assert_eq!(outcome.route, Route::StockPrice);
    assert_eq!(outcome.answer, "Infosys trades at 101.5.");
    let raw = outcome.raw.unwrap();
    assert_eq!(raw["symbol"], json!("INFOSYS"));
    assert_eq!(raw["resolved_by"], json!("direct"));
    assert_eq!(raw["quote"]["current"], json!(101.5));
    assert_eq!(market.calls(), vec!["quote:INFOSYS".to_string()]);
    assert!(web.queries().is_empty());
}

#[tokio::test]
async fn test_stock_price_403_falls_back_to_web() {
    let market = Arc::new(FakeMarket {
        quote: Some(Err(ToolError::Upstream {
            status: 403,
            body: "You don't have access to this resource.".to_string(),
        })),
        ..FakeMarket::default()
    });
    let web = Arc::new(FakeWeb {
        hits: vec![hit("RELIANCE share price live", "Reliance at 2,900")],
        ..FakeWeb::default()
    });
    let llm = Arc::new(FakeLlm::replying("Reliance is around 2,900."));
    let outcome = router(market, web.clone(), llm)
        .route("price of RELIANCE", &[])
        .await;

    assert_eq!(outcome.route, Route::StockPrice);
    assert_eq!(web.queries(), vec!["price of RELIANCE live stock price".to_string()]);
    let raw = outcome.raw.unwrap();
    assert_eq!(raw["source"], json!("web_search"));
    assert_eq!(raw["symbol"], json!("RELIANCE"));
    assert!(raw["quote_error"].as_str().unwrap().contains("403"));
}

#[tokio::test]
async fn test_stock_price_zero_quote_falls_back_to_web() {
    let market = Arc::new(FakeMarket {
        quote: Some(Ok(quote("ZZZZ", 0.0))),
        ..FakeMarket::default()
    });
    let web = Arc::new(FakeWeb::default());
    let llm = Arc::new(FakeLlm::replying("ok"));
    let outcome = router(market, web.clone(), llm)
        .route("price of ZZZZ", &[])
        .await;

    assert_eq!(web.queries(), vec!["price of ZZZZ live stock price".to_string()]);
    assert_eq!(
        outcome.raw.unwrap()["quote_error"],
        json!("quote reported a zero current price")
    );
}

#[tokio::test]
async fn test_stock_price_symbol_search_then_web_guess() {
    // every token is a stoplisted word, so nothing is extracted directly
    let market = Arc::new(FakeMarket::default());
    let web = Arc::new(FakeWeb {
        hits: vec![hit(
            "Tata Consultancy Services",
            "NSE: TCS stock quote and share price",
        )],
        ..FakeWeb::default()
    });
    let llm = Arc::new(FakeLlm::replying("ok"));
    let outcome = router(market.clone(), web.clone(), llm)
        .route("share price?", &[])
        .await;

    assert_eq!(market.calls()[0], "symbol_search:share price?");
    assert_eq!(web.queries()[0], "share price? ticker symbol");
    let raw = outcome.raw.unwrap();
    assert_eq!(raw["symbol"], json!("TATA"));
    assert_eq!(raw["resolved_by"], json!("web_guess"));
}

#[tokio::test]
async fn test_stock_price_symbol_search_hit() {
    let market = Arc::new(FakeMarket {
        symbols: vec![SymbolMatch {
            symbol: "TCS.NS".to_string(),
            description: "TATA CONSULTANCY SERV LT".to_string(),
            display_symbol: "TCS.NS".to_string(),
            kind: "Common Stock".to_string(),
        }],
        ..FakeMarket::default()
    });
    let web = Arc::new(FakeWeb::default());
    let llm = Arc::new(FakeLlm::replying("ok"));
    let outcome = router(market.clone(), web.clone(), llm)
        .route("share price?", &[])
        .await;

    let raw = outcome.raw.unwrap();
    assert_eq!(raw["symbol"], json!("TCS.NS"));
    assert_eq!(raw["resolved_by"], json!("symbol_search"));
    assert!(web.queries().is_empty());
}

#[tokio::test]
async fn test_stock_price_symbol_search_403_falls_back_to_web_guess() {
    let market = Arc::new(FakeMarket {
        symbol_error: Some(ToolError::Upstream {
            status: 403,
            body: "You don't have access to this resource.".to_string(),
        }),
        ..FakeMarket::default()
    });
    let web = Arc::new(FakeWeb {
        hits: vec![hit("NSE: INFY", "Infosys Limited")],
        ..FakeWeb::default()
    });
    let llm = Arc::new(FakeLlm::replying("ok"));
    let outcome = router(market.clone(), web.clone(), llm)
        .route("share price?", &[])
        .await;

    assert_eq!(
        market.calls(),
        vec!["symbol_search:share price?".to_string(), "quote:INFY".to_string()]
    );
    assert_eq!(web.queries(), vec!["share price? ticker symbol".to_string()]);
    let raw = outcome.raw.unwrap();
    assert_eq!(raw["symbol"], json!("INFY"));
    assert_eq!(raw["resolved_by"], json!("web_guess"));
    assert_eq!(raw["source"], json!("market_data"));
}

#[tokio::test]
async fn test_stock_price_ultimate_fallback_symbol() {
    let market = Arc::new(FakeMarket::default());
    let web = Arc::new(FakeWeb {
        fail: true,
        ..FakeWeb::default()
    });
    let llm = Arc::new(FakeLlm::replying("ok"));
    let outcome = router(market.clone(), web, llm)
        .route("share price?", &[])
        .await;

    let raw = outcome.raw.unwrap();
    assert_eq!(raw["symbol"], json!("AAPL"));
    assert_eq!(raw["resolved_by"], json!("fallback"));
    assert!(market.calls().contains(&"quote:AAPL".to_string()));
}

// ============ News and time-sensitive ============

#[tokio::test]
async fn test_news_empty_company_news_falls_back_to_web() {
    let market = Arc::new(FakeMarket::default());
    let web = Arc::new(FakeWeb::default());
    let llm = Arc::new(FakeLlm::replying("ok"));
    let outcome = router(market.clone(), web.clone(), llm)
        .route("headlines for infosys", &[])
        .await;

    assert_eq!(outcome.route, Route::News);
    assert_eq!(market.calls(), vec!["company_news:INFOSYS:7".to_string()]);
    assert_eq!(web.queries(), vec!["headlines for infosys".to_string()]);
}

#[tokio::test]
async fn test_news_transport_error_falls_back_to_web() {
    let market = Arc::new(FakeMarket {
        news_error: Some(ToolError::Transport("connection reset".to_string())),
        ..FakeMarket::default()
    });
    let web = Arc::new(FakeWeb {
        hits: vec![hit("Infosys Q2 results", "Revenue grew 4%.")],
        ..FakeWeb::default()
    });
    let llm = Arc::new(FakeLlm::replying("ok"));
    let outcome = router(market.clone(), web.clone(), llm)
        .route("headlines for infosys", &[])
        .await;

    assert_eq!(outcome.route, Route::News);
    assert_eq!(market.calls(), vec!["company_news:INFOSYS:7".to_string()]);
    assert_eq!(web.queries(), vec!["headlines for infosys".to_string()]);
    let raw = outcome.raw.unwrap();
    assert_eq!(raw["source"], json!("web_search"));
    assert_eq!(raw["results"]["results"][0]["title"], json!("Infosys Q2 results"));
}

#[tokio::test]
async fn test_news_with_articles() {
    let market = Arc::new(FakeMarket {
        news: vec![NewsArticle {
            headline: "Infosys wins deal".to_string(),
            source: "Reuters".to_string(),
            url: "https://example.com/deal".to_string(),
            summary: "A large deal.".to_string(),
        }],
        ..FakeMarket::default()
    });
    let web = Arc::new(FakeWeb::default());
    let llm = Arc::new(FakeLlm::replying("ok"));
    let outcome = router(market, web.clone(), llm)
        .route("headlines for infosys", &[])
        .await;

    let raw = outcome.raw.unwrap();
    assert_eq!(raw["source"], json!("company_news"));
    assert_eq!(raw["articles"][0]["headline"], json!("Infosys wins deal"));
    assert!(web.queries().is_empty());
}

#[tokio::test]
async fn test_dated_headlines_bypass_company_lookup() {
    let market = Arc::new(FakeMarket::default());
    let web = Arc::new(FakeWeb::default());
    let llm = Arc::new(FakeLlm::replying("ok"));
    router(market.clone(), web.clone(), llm)
        .route("headlines from 5 march 2026", &[])
        .await;

    assert!(market.calls().is_empty());
    assert_eq!(
        web.queries(),
        vec!["news headlines 5 March 2026".to_string()]
    );
}

#[tokio::test]
async fn test_time_sensitive_wins_over_budget() {
    let market = Arc::new(FakeMarket::default());
    let web = Arc::new(FakeWeb::default());
    let llm = Arc::new(FakeLlm::replying("ok"));
    let outcome = router(market, web.clone(), llm)
        .route("latest budget news", &[])
        .await;

    assert_eq!(outcome.route, Route::TimeSensitive);
    assert_eq!(web.queries(), vec!["latest budget news".to_string()]);
}

#[tokio::test]
async fn test_disabled_web_search_yields_failure_payload() {
    let market = Arc::new(FakeMarket::default());
    let web = Arc::new(FakeWeb {
        fail: true,
        ..FakeWeb::default()
    });
    let llm = Arc::new(FakeLlm::replying("Web search is not available right now."));
    let outcome = router(market, web, llm)
        .route("what is the current repo rate", &[])
        .await;

    let raw = outcome.raw.unwrap();
    assert_eq!(raw["error"], json!("Tavily is not configured"));
    assert_eq!(outcome.answer, "Web search is not available right now.");
}

// ============ Budget, savings, default ============

#[tokio::test]
async fn test_budget_without_amount_assumes_50k() {
    let market = Arc::new(FakeMarket::default());
    let web = Arc::new(FakeWeb::default());
    let llm = Arc::new(FakeLlm::replying("Here is your budget."));
    let outcome = router(market, web, llm)
        .route("help me plan a budget", &[])
        .await;

    assert_eq!(outcome.route, Route::Budget);
    let raw = outcome.raw.unwrap();
    assert_eq!(raw["plan"]["income"], json!(50000.0));
    assert_eq!(raw["plan"]["savings_possible"], json!(10000.0));
    assert_eq!(raw["plan"]["savings_rate_percent"], json!(20.0));
}

#[tokio::test]
async fn test_budget_for_salary_50k() {
    let market = Arc::new(FakeMarket::default());
    let web = Arc::new(FakeWeb::default());
    let llm = Arc::new(FakeLlm::replying("Here is your budget."));
    let outcome = router(market.clone(), web.clone(), llm)
        .route("Make a budget for salary 50k", &[])
        .await;

    assert_eq!(outcome.route, Route::Budget);
    let raw = outcome.raw.unwrap();
    assert_eq!(raw["assumed_income"], json!(false));
    assert_eq!(raw["plan"]["income"], json!(50000.0));
    assert_eq!(raw["plan"]["fixed_costs"], json!(25000.0));
    assert_eq!(raw["plan"]["variable_costs"], json!(15000.0));
    assert_eq!(raw["plan"]["savings_possible"], json!(10000.0));
    assert_eq!(raw["plan"]["savings_rate_percent"], json!(20.0));
    assert!(market.calls().is_empty());
    assert!(web.queries().is_empty());
}

#[tokio::test]
async fn test_savings_goal_in_lakh() {
    let market = Arc::new(FakeMarket::default());
    let web = Arc::new(FakeWeb::default());
    let llm = Arc::new(FakeLlm::replying("Save 20,000 a month."));
    let outcome = router(market, web, llm)
        .route("I want to save 2 lakh in 10 months", &[])
        .await;

    assert_eq!(outcome.route, Route::SavingsGoal);
    let raw = outcome.raw.unwrap();
    assert_eq!(raw["plan"]["goal_amount"], json!(200000));
    assert_eq!(raw["plan"]["monthly_saving_required"], json!(20000.0));
    assert_eq!(
        raw["plan"]["tip"],
        json!("Automate saving via SIP/RD so you don't miss months.")
    );
}

#[tokio::test]
async fn test_formatter_failure_shows_raw_payload() {
    let market = Arc::new(FakeMarket::default());
    let web = Arc::new(FakeWeb::default());
    let llm = Arc::new(FakeLlm::failing());
    let outcome = router(market, web, llm)
        .route("my salary is 80000", &[])
        .await;

    assert_eq!(outcome.route, Route::Budget);
    assert!(outcome.answer.contains("\"income\": 80000.0"));
    assert!(outcome.answer.contains("(Formatting unavailable:"));
}

#[tokio::test]
async fn test_default_route_uses_recent_history() {
    let market = Arc::new(FakeMarket::default());
    let web = Arc::new(FakeWeb::default());
    let llm = Arc::new(FakeLlm::replying("An RD is a recurring deposit."));
    let history: Vec<ConversationTurn> = (0..4)
        .flat_map(|i| {
            vec![
                ConversationTurn::user(format!("q{}", i)),
                ConversationTurn::assistant(format!("a{}", i)),
            ]
        })
        .collect();

    let outcome = router(market, web, llm.clone())
        .route("what is an RD?", &history)
        .await;

    assert_eq!(outcome.route, Route::Default);
    assert!(outcome.raw.is_none());
    let seen = llm.seen.lock().unwrap();
    let messages = &seen[0];
    // last 6 turns plus the question, no system message
    assert_eq!(messages.len(), 7);
    assert_eq!(messages[0].content, "q1");
    assert_eq!(messages[6].content, "what is an RD?");
}

#[tokio::test]
async fn test_default_route_degrades_on_completion_failure() {
    let market = Arc::new(FakeMarket::default());
    let web = Arc::new(FakeWeb::default());
    let llm = Arc::new(FakeLlm::failing());
    let outcome = router(market, web, llm)
        .route("explain compound interest", &[])
        .await;

    assert_eq!(outcome.route, Route::Default);
    assert!(outcome.answer.starts_with("Sorry, I couldn't generate an answer right now"));
}
