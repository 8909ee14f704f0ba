//! # finsight CLI (`fin`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fin ask "<query>"` | Route one finance question |
//! | `fin chat` | Interactive session with history |
//! | `fin ingest <pdf>...` | Build the document index, or load the existing one |
//! | `fin docs "<question>"` | Answer from the indexed PDFs with citations |
//! | `fin feedback add` | Record a rating for an answer |
//! | `fin feedback count` | Number of recorded ratings |
//!
//! Credentials come from `GROQ_API_KEY`, `TAVILY_API_KEY` and
//! `FINNHUB_API_KEY`; a `.env` file in the working directory is read first.
//! Logs go to stderr and are filtered by `RUST_LOG` (default `finsight=info`).

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finsight::app::{self, App};
use finsight::config::{self, Credentials};

/// finsight: a personal-finance assistant with document-grounded answers.
#[derive(Parser)]
#[command(name = "fin", version, about)]
struct Cli {
    /// Path to configuration file (TOML). Missing file means defaults.
    #[arg(long, global = true, default_value = "./config/fin.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Route a single question and print the answer.
    Ask {
        query: String,
    },

    /// Interactive chat. History is kept for the session.
    Chat,

    /// Ingest PDFs into the vector index.
    ///
    /// If an index already exists at `[index] path` it is loaded and the
    /// inputs are ignored. Delete the directory to rebuild.
    Ingest {
        /// PDF files to ingest.
        pdfs: Vec<PathBuf>,

        /// Also ingest every `*.pdf` below this directory.
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Ask a question against the indexed documents.
    Docs {
        question: String,

        /// Answer style: concise or detailed.
        #[arg(long, default_value = "detailed")]
        style: String,
    },

    /// Feedback log commands.
    Feedback {
        #[command(subcommand)]
        action: FeedbackAction,
    },
}

#[derive(Subcommand)]
enum FeedbackAction {
    /// Record a rating.
    Add {
        #[arg(long)]
        query: String,

        #[arg(long)]
        answer: String,

        /// up or down.
        #[arg(long)]
        rating: String,

        #[arg(long)]
        comment: Option<String>,
    },

    /// Print the number of recorded ratings.
    Count,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finsight=info,fin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cfg = config::load_config(&cli.config)?;

    // Feedback commands need no API clients.
    if let Commands::Feedback { action } = cli.command {
        return match action {
            FeedbackAction::Add {
                query,
                answer,
                rating,
                comment,
            } => app::run_feedback_add(&cfg, query, answer, &rating, comment).await,
            FeedbackAction::Count => app::run_feedback_count(&cfg).await,
        };
    }

    let app = App::from_config(cfg, Credentials::from_env())?;

    match cli.command {
        Commands::Ask { query } => app::run_ask(&app, &query).await?,
        Commands::Chat => app::run_chat(&app).await?,
        Commands::Ingest { pdfs, dir } => app::run_ingest(&app, pdfs, dir).await?,
        Commands::Docs { question, style } => app::run_docs(&app, &question, &style).await?,
        Commands::Feedback { .. } => {
            // handled above
        }
    }

    Ok(())
}
