//! # finsight
//!
//! A conversational personal-finance assistant. Free-text questions are
//! routed to live market data, company news, web search, or local budget
//! arithmetic, and the result is rendered as natural language by a
//! language model. A separate pipeline answers questions from regulatory
//! PDFs with page-level citations.
//!
//! ## Architecture
//!
//! ```text
//!              ┌──────────┐   ┌──────────────┐   ┌───────────┐
//!  query ────▶│ signals  │──▶│    router     │──▶│ formatter │──▶ answer
//!              └──────────┘   │ route table + │   └───────────┘
//!                             │ fallbacks     │
//!                             └──────┬───────┘
//!                                    ▼
//!                  tools: Finnhub · Tavily · budget
//!
//!  PDFs ──▶ pdf ──▶ chunk ──▶ embedding ──▶ store (index.json)
//!                                             │
//!  question ─────────────────────────────▶ rag ──▶ answer + citations
//! ```
//!
//! ## Usage
//!
//! ```bash
//! fin ask "share price of infosys"
//! fin chat
//! fin ingest --dir data/pdfs
//! fin docs "What powers does Section 11 give SEBI?" --style concise
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and environment credentials |
//! | [`error`] | Tool and crate error types |
//! | [`models`] | Core data types |
//! | [`signals`] | Ticker, amount, month and date extraction |
//! | [`tools`] | Market data, web search, budget math |
//! | [`llm`] | Completion provider and Groq client |
//! | [`formatter`] | Natural-language rendering of tool payloads |
//! | [`router`] | Intent classification and fallback chains |
//! | [`session`] | Conversation history and cached index |
//! | [`pdf`] | Page-tagged PDF text extraction |
//! | [`chunk`] | Overlapping character chunker |
//! | [`embedding`] | Embedding providers and cosine similarity |
//! | [`store`] | Persisted vector index |
//! | [`ingest`] | Build-once index ingestion |
//! | [`rag`] | Retrieval-augmented answering |
//! | [`feedback`] | Optional SQLite feedback log |
//! | [`app`] | CLI command implementations |

pub mod app;
pub mod chunk;
pub mod config;
pub mod embedding;
pub mod error;
pub mod feedback;
pub mod formatter;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod pdf;
pub mod rag;
pub mod router;
pub mod session;
pub mod signals;
pub mod store;
pub mod tools;
