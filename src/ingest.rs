//! Document ingestion: PDFs → chunks → embeddings → persisted index.
//!
//! Ingestion is build-once. If an index already exists at `index.path`
//! it is loaded and the input PDFs are never opened, so repeated runs
//! against the same location do no embedding work. To rebuild, delete
//! the index directory.
//!
//! A build is all or nothing: any PDF that fails to load aborts the run,
//! and nothing is written until every chunk has been embedded.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::chunk::chunk_pages;
use crate::config::Config;
use crate::embedding::Embedder;
use crate::pdf::load_pdf;
use crate::session::Session;
use crate::store::{IndexEntry, VectorIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStatus {
    LoadedExistingIndex,
    BuiltNewIndex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub status: IngestStatus,
    /// Set only when a new index was built.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdfs_loaded: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks_created: Option<usize>,
}

/// Load the persisted index, or build one from `pdf_paths`. Either way the
/// index ends up cached in `session`.
pub async fn ingest(
    session: &mut Session,
    config: &Config,
    embedder: &dyn Embedder,
    pdf_paths: &[PathBuf],
) -> Result<IngestReport> {
    let dir = &config.index.path;

    if VectorIndex::exists(dir) {
        let index = VectorIndex::load(dir)?;
        if index.model() != embedder.model_name() {
            warn!(
                stored = index.model(),
                configured = embedder.model_name(),
                "Existing index was built with a different embedding model"
            );
        }
        session.set_index(index);
        return Ok(IngestReport {
            status: IngestStatus::LoadedExistingIndex,
            pdfs_loaded: None,
            chunks_created: None,
        });
    }

    if pdf_paths.is_empty() {
        bail!("No PDFs given and no index at {}", dir.display());
    }

    let mut chunks = Vec::new();
    for path in pdf_paths {
        let pages = load_pdf(path)?;
        let source = path.to_string_lossy();
        let before = chunks.len();
        chunks.extend(chunk_pages(&source, &pages, &config.chunking));
        info!(
            path = %path.display(),
            pages = pages.len(),
            chunks = chunks.len() - before,
            "Chunked PDF"
        );
    }

    if chunks.is_empty() {
        bail!("No extractable text in {} PDF(s)", pdf_paths.len());
    }

    let mut entries = Vec::with_capacity(chunks.len());
    for batch in chunks.chunks(config.embedding.batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let vectors = embedder
            .embed(&texts)
            .await
            .context("Embedding document chunks")?;
        if vectors.len() != batch.len() {
            bail!(
                "Embedding provider returned {} vectors for {} chunks",
                vectors.len(),
                batch.len()
            );
        }
        entries.extend(
            batch
                .iter()
                .cloned()
                .zip(vectors)
                .map(|(chunk, vector)| IndexEntry { chunk, vector }),
        );
    }

    let chunks_created = entries.len();
    let index = VectorIndex::build(embedder.model_name(), embedder.dims(), entries);
    index
        .save(dir)
        .with_context(|| format!("Failed to persist index to {}", dir.display()))?;
    session.set_index(index);

    info!(pdfs = pdf_paths.len(), chunks = chunks_created, "Built new index");
    Ok(IngestReport {
        status: IngestStatus::BuiltNewIndex,
        pdfs_loaded: Some(pdf_paths.len()),
        chunks_created: Some(chunks_created),
    })
}

/// Every `*.pdf` below `dir`, sorted.
pub fn collect_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        let is_pdf = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if entry.file_type().is_file() && is_pdf {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_pdfs_filters_and_sorts() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("nested")).unwrap();
        std::fs::write(tmp.path().join("b.pdf"), b"x").unwrap();
        std::fs::write(tmp.path().join("nested/a.PDF"), b"x").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), b"x").unwrap();

        let found = collect_pdfs(tmp.path()).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("b.pdf"));
        assert!(found[1].ends_with("nested/a.PDF"));
    }

    #[test]
    fn test_report_serialization() {
        let loaded = IngestReport {
            status: IngestStatus::LoadedExistingIndex,
            pdfs_loaded: None,
            chunks_created: None,
        };
        assert_eq!(
            serde_json::to_string(&loaded).unwrap(),
            r#"{"status":"loaded_existing_index"}"#
        );
    }
}
