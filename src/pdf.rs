//! Page-tagged PDF text extraction.
//!
//! Wraps `pdf-extract` so every page comes back with its 1-based page
//! number. Pages with no extractable text are dropped.

use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Text of one PDF page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 1-based.
    pub page: u32,
    pub text: String,
}

/// Read `path` and extract its text page by page.
pub fn load_pdf(path: &Path) -> Result<Vec<PageText>> {
    let bytes = std::fs::read(path).map_err(|e| Error::Pdf {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let pages = extract_pages(&bytes).map_err(|reason| Error::Pdf {
        path: path.to_path_buf(),
        reason,
    })?;
    debug!(path = %path.display(), pages = pages.len(), "Loaded PDF");
    Ok(pages)
}

/// Extract page texts from in-memory PDF bytes.
pub fn extract_pages(bytes: &[u8]) -> std::result::Result<Vec<PageText>, String> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| e.to_string())?;
    Ok(pages
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(i, text)| PageText {
            page: i as u32 + 1,
            text,
        })
        .collect())
}
