//! Retrieval-augmented answering over the document index.
//!
//! `ask` embeds the question, takes the top-k chunks from the session's
//! index (loading the persisted one on first use), and issues a single
//! completion whose prompt forbids knowledge outside the retrieved
//! context. Every retrieved chunk becomes a [`Citation`], in retrieval
//! order, repeats included.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::embedding::{embed_query, Embedder};
use crate::error::{Error, Result};
use crate::llm::CompletionProvider;
use crate::models::{source_basename, Citation, ScoredChunk};
use crate::session::Session;
use crate::store::VectorIndex;

const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

const CONCISE_INSTRUCTIONS: &str = "\
- Give a SHORT and PRECISE answer.
- Use bullet points only.
- Mention sections only if clearly present.
- Do not over-explain.";

const DETAILED_INSTRUCTIONS: &str = "\
- Give a DETAILED and STRUCTURED answer.
- Use headings and numbered/bulleted lists.
- Explicitly mention sections and clauses if present.
- Include inline citations like (SEBI Act, 1992 - Page 21).";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AnswerStyle {
    Concise,
    #[default]
    Detailed,
}

impl AnswerStyle {
    /// `"concise"` in any case selects [`AnswerStyle::Concise`]; anything
    /// else is detailed.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("concise") {
            AnswerStyle::Concise
        } else {
            AnswerStyle::Detailed
        }
    }

    fn instructions(&self) -> &'static str {
        match self {
            AnswerStyle::Concise => CONCISE_INSTRUCTIONS,
            AnswerStyle::Detailed => DETAILED_INSTRUCTIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RagAnswer {
    pub answer: String,
    pub sources: Vec<Citation>,
}

pub struct RagPipeline {
    llm: Arc<dyn CompletionProvider>,
    embedder: Arc<dyn Embedder>,
    index_dir: PathBuf,
    top_k: usize,
}

impl RagPipeline {
    pub fn new(config: &Config, llm: Arc<dyn CompletionProvider>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            llm,
            embedder,
            index_dir: config.index.path.clone(),
            top_k: config.retrieval.top_k,
        }
    }

    pub async fn ask(&self, session: &mut Session, query: &str, style: AnswerStyle) -> Result<RagAnswer> {
        if session.index().is_none() {
            if !VectorIndex::exists(&self.index_dir) {
                return Err(Error::IndexUnavailable(self.index_dir.clone()));
            }
            session.set_index(VectorIndex::load(&self.index_dir)?);
        }
        let index = session
            .index()
            .ok_or_else(|| Error::IndexUnavailable(self.index_dir.clone()))?;

        let query_vec = embed_query(self.embedder.as_ref(), query).await?;
        if query_vec.len() != index.dims() {
            return Err(Error::DimensionMismatch {
                index: index.dims(),
                query: query_vec.len(),
            });
        }
        let retrieved = index.search(&query_vec, self.top_k);
        debug!(retrieved = retrieved.len(), "Retrieved context");

        let prompt = build_prompt(query, &retrieved, style);
        let answer = self.llm.complete_prompt(&prompt).await?;
        info!(?style, sources = retrieved.len(), "Answered from documents");

        Ok(RagAnswer {
            answer,
            sources: retrieved.iter().map(|s| Citation::from_chunk(&s.chunk)).collect(),
        })
    }
}

/// Retrieved chunks as `Source: <file> | Page: <n>` blocks.
pub fn build_context(retrieved: &[ScoredChunk]) -> String {
    retrieved
        .iter()
        .map(|s| {
            format!(
                "Source: {} | Page: {}\n{}",
                source_basename(&s.chunk.source),
                s.chunk.page,
                s.chunk.text.trim()
            )
        })
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

pub fn build_prompt(query: &str, retrieved: &[ScoredChunk], style: AnswerStyle) -> String {
    format!(
        "You are a financial and regulatory law expert.\n\n\
         Answer STRICTLY using the context below.\n\
         Do NOT use external knowledge.\n\n\
         Instructions:\n{}\n\n\
         Context:\n{}\n\n\
         Question:\n{}\n\n\
         Answer:",
        style.instructions(),
        build_context(retrieved),
        query
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentChunk;

    fn scored(source: &str, page: u32, text: &str) -> ScoredChunk {
        ScoredChunk {
            chunk: DocumentChunk {
                id: format!("{}-{}", source, page),
                text: text.to_string(),
                source: source.to_string(),
                page,
            },
            score: 0.9,
        }
    }

    #[test]
    fn test_style_labels() {
        assert_eq!(AnswerStyle::from_label("Concise"), AnswerStyle::Concise);
        assert_eq!(AnswerStyle::from_label("concise "), AnswerStyle::Concise);
        assert_eq!(AnswerStyle::from_label("Detailed"), AnswerStyle::Detailed);
        assert_eq!(AnswerStyle::from_label("verbose"), AnswerStyle::Detailed);
    }

    #[test]
    fn test_context_blocks() {
        let context = build_context(&[
            scored("docs/SEBI_Act.pdf", 21, "  Section 11 powers.  "),
            scored("docs/RBI.pdf", 3, "Repo rate policy."),
        ]);
        assert_eq!(
            context,
            "Source: SEBI_Act.pdf | Page: 21\nSection 11 powers.\n\n---\n\nSource: RBI.pdf | Page: 3\nRepo rate policy."
        );
    }

    #[test]
    fn test_prompt_forbids_outside_knowledge() {
        let prompt = build_prompt("What does Section 11 say?", &[], AnswerStyle::Concise);
        assert!(prompt.contains("Answer STRICTLY using the context below."));
        assert!(prompt.contains("Do NOT use external knowledge."));
        assert!(prompt.contains("Use bullet points only."));
        assert!(prompt.ends_with("Question:\nWhat does Section 11 say?\n\nAnswer:"));
    }
}
