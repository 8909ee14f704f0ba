//! Command implementations for the `fin` binary.
//!
//! [`App`] wires the concrete clients (Finnhub, Tavily, Groq, the
//! configured embedder) from [`Config`] and [`Credentials`]; each
//! `run_*` function backs one CLI command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use crate::config::{Config, Credentials};
use crate::embedding::{create_embedder, Embedder};
use crate::feedback::{Feedback, FeedbackLog, Rating};
use crate::ingest::{collect_pdfs, ingest};
use crate::llm::{CompletionProvider, GroqClient};
use crate::rag::{AnswerStyle, RagAnswer, RagPipeline};
use crate::router::FinanceRouter;
use crate::session::Session;
use crate::tools::finnhub::FinnhubClient;
use crate::tools::tavily::TavilyClient;

pub struct App {
    pub config: Config,
    pub router: FinanceRouter,
    pub rag: RagPipeline,
    pub embedder: Arc<dyn Embedder>,
}

impl App {
    pub fn from_config(config: Config, creds: Credentials) -> Result<Self> {
        let llm: Arc<dyn CompletionProvider> =
            Arc::new(GroqClient::new(&config.llm, creds.groq_api_key)?);
        let market = Arc::new(FinnhubClient::new(&config.market, creds.finnhub_api_key)?);
        let web = Arc::new(TavilyClient::new(&config.search, creds.tavily_api_key)?);
        let embedder = create_embedder(&config.embedding)?;

        let router = FinanceRouter::new(market, web, llm.clone(), config.market.news_days);
        let rag = RagPipeline::new(&config, llm, embedder.clone());

        Ok(Self {
            config,
            router,
            rag,
            embedder,
        })
    }
}

/// Route one query with no history and print the answer.
pub async fn run_ask(app: &App, query: &str) -> Result<()> {
    let outcome = app.router.route(query, &[]).await;
    info!(route = %outcome.route, "Answered");
    println!("{}", outcome.answer);
    Ok(())
}

/// Line-oriented chat over stdin.
///
/// `/clear` drops the history, `/docs [--concise] <question>` answers
/// from the document index, `/quit` exits. End of input also exits.
pub async fn run_chat(app: &App) -> Result<()> {
    let mut session = Session::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("finsight chat. /clear resets history, /docs [--concise] <question> searches documents, /quit exits.");

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line {
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear();
                println!("History cleared.");
                continue;
            }
            _ => {}
        }

        if let Some(rest) = line.strip_prefix("/docs") {
            let Some((style, question)) = parse_docs_command(rest) else {
                println!("Usage: /docs [--concise|--detailed] <question>");
                continue;
            };
            match app.rag.ask(&mut session, question, style).await {
                Ok(answer) => print_rag_answer(&answer),
                Err(e) => println!("Document search unavailable: {}", e),
            }
            continue;
        }

        let outcome = app.router.route(line, session.history()).await;
        println!("{}\n", outcome.answer);
        session.push_user(line);
        session.push_assistant(outcome.answer);
    }

    Ok(())
}

/// Split the text after `/docs` into a style flag and the question.
/// `None` when no question is left.
fn parse_docs_command(rest: &str) -> Option<(AnswerStyle, &str)> {
    let rest = rest.trim();
    let (style, question) = if let Some(q) = rest.strip_prefix("--concise") {
        (AnswerStyle::Concise, q)
    } else if let Some(q) = rest.strip_prefix("--detailed") {
        (AnswerStyle::Detailed, q)
    } else {
        (AnswerStyle::Detailed, rest)
    };
    let question = question.trim();
    if question.is_empty() {
        None
    } else {
        Some((style, question))
    }
}

/// Build or load the index and print the report as JSON.
pub async fn run_ingest(app: &App, pdfs: Vec<PathBuf>, dir: Option<PathBuf>) -> Result<()> {
    let mut paths = pdfs;
    if let Some(dir) = dir {
        paths.extend(collect_pdfs(&dir)?);
    }

    let mut session = Session::new();
    let report = ingest(&mut session, &app.config, app.embedder.as_ref(), &paths).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub async fn run_docs(app: &App, question: &str, style: &str) -> Result<()> {
    let mut session = Session::new();
    let answer = app
        .rag
        .ask(&mut session, question, AnswerStyle::from_label(style))
        .await?;
    print_rag_answer(&answer);
    Ok(())
}

fn print_rag_answer(answer: &RagAnswer) {
    println!("{}\n", answer.answer);
    if !answer.sources.is_empty() {
        println!("Sources:");
        for source in &answer.sources {
            println!("  - {} (page {})", source.source, source.page);
        }
    }
}

fn feedback_path(config: &Config) -> Result<&Path> {
    match &config.feedback.path {
        Some(path) => Ok(path.as_path()),
        None => bail!("Feedback logging is disabled. Set [feedback] path in the config file."),
    }
}

pub async fn run_feedback_add(
    config: &Config,
    query: String,
    answer: String,
    rating: &str,
    comment: Option<String>,
) -> Result<()> {
    let rating: Rating = rating.parse().map_err(anyhow::Error::msg)?;
    let log = FeedbackLog::open(feedback_path(config)?)
        .await
        .context("Failed to open feedback log")?;
    let id = log
        .record(&Feedback {
            query,
            answer,
            rating,
            comment,
        })
        .await?;
    log.close().await;
    println!("Recorded feedback {}", id);
    Ok(())
}

pub async fn run_feedback_count(config: &Config) -> Result<()> {
    let log = FeedbackLog::open(feedback_path(config)?)
        .await
        .context("Failed to open feedback log")?;
    let count = log.count().await?;
    log.close().await;
    println!("{}", count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_docs_command_styles() {
        assert_eq!(
            parse_docs_command(" What is Section 11?"),
            Some((AnswerStyle::Detailed, "What is Section 11?"))
        );
        assert_eq!(
            parse_docs_command(" --concise What is Section 11?"),
            Some((AnswerStyle::Concise, "What is Section 11?"))
        );
        assert_eq!(
            parse_docs_command(" --detailed  repo rate "),
            Some((AnswerStyle::Detailed, "repo rate"))
        );
    }

    #[test]
    fn test_parse_docs_command_needs_question() {
        assert_eq!(parse_docs_command(""), None);
        assert_eq!(parse_docs_command("  --concise  "), None);
    }
}
