//! Core data models used throughout finsight.
//!
//! These types represent the conversation, the tool payloads, and the
//! document chunks that flow through routing and retrieval.

use serde::{Deserialize, Serialize};

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the session history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Signals parsed out of a query. Request-scoped, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedSignal {
    pub ticker: Option<String>,
    pub company: String,
    pub amount: Option<u64>,
    pub months: Option<u32>,
    pub date_query: Option<String>,
}

/// Live quote for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub current: f64,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub prev_close: f64,
}

/// Candidate returned by symbol search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolMatch {
    pub symbol: String,
    pub description: String,
    pub display_symbol: String,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub headline: String,
    pub source: String,
    pub url: String,
    pub summary: String,
}

/// One ranked hit from the web-search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub results: Vec<SearchHit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl SearchResults {
    /// All result text flattened into one blob, for heuristic scanning.
    pub fn text_blob(&self) -> String {
        let mut blob = String::new();
        if let Some(answer) = &self.answer {
            blob.push_str(answer);
            blob.push('\n');
        }
        for hit in &self.results {
            blob.push_str(&hit.title);
            blob.push('\n');
            blob.push_str(&hit.content);
            blob.push('\n');
        }
        blob
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetPlan {
    pub income: f64,
    pub fixed_costs: f64,
    pub variable_costs: f64,
    pub savings_possible: f64,
    pub savings_rate_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub goal_amount: u64,
    pub months: u32,
    pub monthly_saving_required: f64,
    pub tip: String,
}

/// A slice of PDF text, immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub text: String,
    /// Path of the source file as given at ingestion time.
    pub source: String,
    /// 1-based page number.
    pub page: u32,
}

/// A chunk paired with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// Source reference attached to a RAG answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub source: String,
    pub page: u32,
}

impl Citation {
    pub fn from_chunk(chunk: &DocumentChunk) -> Self {
        Self {
            source: source_basename(&chunk.source),
            page: chunk.page,
        }
    }
}

/// File name component of a source path, or the input when it has none.
pub fn source_basename(source: &str) -> String {
    std::path::Path::new(source)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string())
}
