//! Persisted brute-force vector index.
//!
//! A [`VectorIndex`] holds every [`DocumentChunk`] with its embedding and
//! answers queries by cosine similarity over all entries. It is saved as
//! one JSON file, `index.json`, inside the configured index directory.
//! The embedding model name and width are stored alongside, and a load
//! rejects a file whose vectors do not match the declared width.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::embedding::cosine_similarity;
use crate::error::{Error, Result};
use crate::models::{DocumentChunk, ScoredChunk};

pub const INDEX_FILE: &str = "index.json";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub chunk: DocumentChunk,
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    version: u32,
    model: String,
    dims: usize,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    pub fn build(model: impl Into<String>, dims: usize, entries: Vec<IndexEntry>) -> Self {
        Self {
            version: FORMAT_VERSION,
            model: model.into(),
            dims,
            entries,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn file_path(dir: &Path) -> PathBuf {
        dir.join(INDEX_FILE)
    }

    /// Whether a persisted index exists under `dir`.
    pub fn exists(dir: &Path) -> bool {
        Self::file_path(dir).is_file()
    }

    /// Write the index to `dir/index.json`, creating `dir` if needed. The
    /// file is written to a temporary name first and renamed into place.
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let path = Self::file_path(dir);
        let tmp = dir.join(format!("{}.tmp", INDEX_FILE));
        let data = serde_json::to_vec(self)?;
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &path)?;
        info!(path = %path.display(), entries = self.entries.len(), "Saved vector index");
        Ok(())
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let path = Self::file_path(dir);
        if !path.is_file() {
            return Err(Error::IndexUnavailable(dir.to_path_buf()));
        }

        let data = std::fs::read(&path)?;
        let index: VectorIndex =
            serde_json::from_slice(&data).map_err(|e| Error::IndexCorrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        if let Some(bad) = index.entries.iter().find(|e| e.vector.len() != index.dims) {
            return Err(Error::IndexCorrupt {
                path,
                reason: format!(
                    "chunk {} has {} dimensions, index declares {}",
                    bad.chunk.id,
                    bad.vector.len(),
                    index.dims
                ),
            });
        }

        info!(
            path = %path.display(),
            entries = index.entries.len(),
            model = %index.model,
            "Loaded vector index"
        );
        Ok(index)
    }

    /// The `k` most similar chunks, best first. Shorter when the index
    /// holds fewer than `k` entries.
    pub fn search(&self, query_vec: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|e| ScoredChunk {
                chunk: e.chunk.clone(),
                score: cosine_similarity(query_vec, &e.vector),
            })
            .collect();
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);
        debug!(k, returned = scored.len(), "Vector search");
        scored
    }
}
