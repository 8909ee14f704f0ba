//! Overlapping character-window chunker.
//!
//! Splits each page's text into [`DocumentChunk`]s of at most
//! `chunk_size` characters. Consecutive chunks from the same page share
//! roughly `chunk_overlap` characters so a sentence cut at a boundary is
//! still whole in one of them. Cuts prefer whitespace in the second half
//! of the window and fall back to a hard cut.
//!
//! Chunk IDs are a SHA-256 digest of source, page, position and text, so
//! the same PDF always produces the same IDs.

use sha2::{Digest, Sha256};

use crate::config::ChunkingConfig;
use crate::models::DocumentChunk;
use crate::pdf::PageText;

/// Split text into overlapping windows. Lengths are in characters.
pub fn split_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let size = chunk_size.max(1);
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < len {
        while start < len && chars[start].is_whitespace() {
            start += 1;
        }
        if start >= len {
            break;
        }

        let hard_end = (start + size).min(len);
        let end = if hard_end == len {
            len
        } else {
            let floor = start + size / 2;
            (floor..hard_end)
                .rev()
                .find(|&i| chars[i].is_whitespace())
                .unwrap_or(hard_end)
        };

        let piece: String = chars[start..end].iter().collect();
        let piece = piece.trim_end();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }
        if end == len {
            break;
        }

        // Step back by the overlap, then forward to the next word start.
        let back = end.saturating_sub(chunk_overlap);
        let next = if back > start {
            (back..end)
                .find(|&i| chars[i].is_whitespace())
                .map(|i| i + 1)
                .filter(|&i| i < end)
                .unwrap_or(back)
        } else {
            end
        };
        start = next;
    }

    pieces
}

/// Chunk every page of one source file.
pub fn chunk_pages(source: &str, pages: &[PageText], config: &ChunkingConfig) -> Vec<DocumentChunk> {
    let mut chunks = Vec::new();
    for page in pages {
        for (i, text) in split_text(&page.text, config.chunk_size, config.chunk_overlap)
            .into_iter()
            .enumerate()
        {
            chunks.push(DocumentChunk {
                id: chunk_id(source, page.page, i, &text),
                text,
                source: source.to_string(),
                page: page.page,
            });
        }
    }
    chunks
}

fn chunk_id(source: &str, page: u32, position: usize, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(page.to_le_bytes());
    hasher.update((position as u64).to_le_bytes());
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
