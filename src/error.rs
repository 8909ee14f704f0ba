//! Error types for finsight.
//!
//! Two layers:
//!
//! - [`ToolError`]: failures at an external tool boundary (market data,
//!   news, symbol search, web search). These are *values*: the router
//!   inspects them to decide between fallback and degradation, and they
//!   never escape to the presentation layer.
//! - [`Error`]: crate-level failures from the completion provider, the
//!   embedding provider, and the document pipelines.
//!
//! Absence of a parse match is modelled as `Option::None`, never as an error.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for crate-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result of a single Domain Tool invocation.
pub type ToolResult<T> = std::result::Result<T, ToolError>;

#[derive(Error, Debug, Clone)]
pub enum ToolError {
    /// Non-2xx response from an upstream API. Carries the status and raw body.
    #[error("upstream returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The request never produced a response (DNS, connect, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// A 2xx response whose body could not be decoded.
    #[error("could not decode upstream response: {0}")]
    Decode(String),

    /// The tool has no credential configured.
    #[error("{0} is not configured")]
    Disabled(&'static str),
}

impl ToolError {
    /// HTTP status code, when the failure came from an upstream response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ToolError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ToolError::Decode(e.to_string())
        } else {
            ToolError::Transport(e.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    /// The language-model call failed or returned nothing usable.
    #[error("completion failed: {0}")]
    Completion(String),

    /// Embedding generation failed.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// `ask` was called with no in-memory index and none persisted.
    #[error("no vector index found at {}; run ingestion first", .0.display())]
    IndexUnavailable(PathBuf),

    /// The persisted index exists but could not be read.
    #[error("vector index at {} is unreadable: {reason}", path.display())]
    IndexCorrupt { path: PathBuf, reason: String },

    /// The query embedding and the stored index disagree on vector width,
    /// usually because `[embedding]` changed after ingestion.
    #[error("query embedding has {query} dimensions but the index has {index}; rebuild the index or restore the embedding config")]
    DimensionMismatch { index: usize, query: usize },

    /// A PDF could not be opened or parsed.
    #[error("failed to load PDF {}: {reason}", path.display())]
    Pdf { path: PathBuf, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
