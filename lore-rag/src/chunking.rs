//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`LineChunker`]: one chunk per non-empty line, keyed by line number
//! - [`WindowChunker`]: non-overlapping runs of a fixed number of lines
//!
//! Both are lazy: [`Chunker::chunk`] returns an iterator over the document,
//! and calling it again starts over with identical keys and ordering.

use crate::document::{Chunk, ChunkPosition, Document};
use crate::error::{RagError, Result};

/// A lazy, restartable sequence of chunks borrowed from a [`Document`].
pub type Chunks<'a> = Box<dyn Iterator<Item = Chunk> + Send + 'a>;

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata but no embeddings.
/// Embeddings are attached later by the pipeline.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks, in source order.
    fn chunk<'a>(&self, document: &'a Document) -> Chunks<'a>;

    /// Short policy name recorded in chunk metadata.
    fn policy(&self) -> &'static str;
}

/// Emits one chunk per non-empty line.
///
/// Lines are trimmed; blank lines produce nothing but still advance the
/// line counter, so `paragraph_id` is always the original 1-based line
/// number. Keys are `{document_name}_{paragraph_id}`.
///
/// # Example
///
/// ```rust,ignore
/// use lore_rag::{Chunker, Document, LineChunker};
///
/// let doc = Document::new("notes.txt", "a\n\nb");
/// let ids: Vec<_> = LineChunker.chunk(&doc).map(|c| c.position.index()).collect();
/// assert_eq!(ids, [1, 3]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LineChunker;

impl Chunker for LineChunker {
    fn chunk<'a>(&self, document: &'a Document) -> Chunks<'a> {
        let policy = self.policy();
        Box::new(document.text.lines().enumerate().filter_map(move |(i, line)| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            let paragraph_id = i + 1;
            Some(build_chunk(
                document,
                format!("{}_{paragraph_id}", document.name),
                ChunkPosition::Paragraph(paragraph_id),
                line.to_string(),
                policy,
            ))
        }))
    }

    fn policy(&self) -> &'static str {
        "line"
    }
}

/// Splits text into non-overlapping windows of `window_size` lines.
///
/// The last window may be shorter. `window_index` is zero-based and keys are
/// `{document_name}-chunk-{window_index}`. Windows made only of whitespace
/// are skipped but keep their index slot.
#[derive(Debug, Clone)]
pub struct WindowChunker {
    window_size: usize,
}

impl WindowChunker {
    /// Default number of lines per window.
    pub const DEFAULT_WINDOW_SIZE: usize = 10;

    /// Create a new `WindowChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `window_size` is zero.
    pub fn new(window_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(RagError::Config("window_size must be greater than zero".to_string()));
        }
        Ok(Self { window_size })
    }

    /// The number of lines per window.
    pub fn window_size(&self) -> usize {
        self.window_size
    }
}

impl Default for WindowChunker {
    fn default() -> Self {
        Self { window_size: Self::DEFAULT_WINDOW_SIZE }
    }
}

impl Chunker for WindowChunker {
    fn chunk<'a>(&self, document: &'a Document) -> Chunks<'a> {
        let policy = self.policy();
        let size = self.window_size;
        let mut lines = document.text.lines();
        let mut window_index = 0usize;

        Box::new(std::iter::from_fn(move || {
            loop {
                let run: Vec<&str> = lines.by_ref().take(size).collect();
                if run.is_empty() {
                    return None;
                }
                let index = window_index;
                window_index += 1;

                let text = run.join("\n");
                if text.trim().is_empty() {
                    continue;
                }
                return Some(build_chunk(
                    document,
                    format!("{}-chunk-{index}", document.name),
                    ChunkPosition::Window(index),
                    text,
                    policy,
                ));
            }
        }))
    }

    fn policy(&self) -> &'static str {
        "window"
    }
}

fn build_chunk(
    document: &Document,
    key: String,
    position: ChunkPosition,
    text: String,
    policy: &'static str,
) -> Chunk {
    let mut metadata = document.metadata.clone();
    metadata.insert("chunk_policy".to_string(), policy.to_string());
    if let Some(uri) = &document.source_uri {
        metadata.insert("source_uri".to_string(), uri.clone());
    }

    Chunk {
        key,
        document_name: document.name.clone(),
        position,
        text,
        embedding: Vec::new(),
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(chunks: Chunks<'_>) -> Vec<usize> {
        chunks.map(|c| c.position.index()).collect()
    }

    #[test]
    fn line_policy_skips_blank_lines_but_keeps_line_numbers() {
        let doc = Document::new("story.txt", "a\n\nb");
        let chunks: Vec<Chunk> = LineChunker.chunk(&doc).collect();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].position, ChunkPosition::Paragraph(1));
        assert_eq!(chunks[1].position, ChunkPosition::Paragraph(3));
        assert_eq!(chunks[0].key, "story.txt_1");
        assert_eq!(chunks[1].key, "story.txt_3");
        assert!(chunks.iter().all(|c| c.embedding.is_empty()));
    }

    #[test]
    fn line_policy_trims_and_ignores_whitespace_only_lines() {
        let doc = Document::new("d", "  first  \r\n \t \r\nsecond\n");
        let texts: Vec<String> = LineChunker.chunk(&doc).map(|c| c.text).collect();
        assert_eq!(texts, ["first", "second"]);
        assert_eq!(positions(LineChunker.chunk(&doc)), [1, 3]);
    }

    #[test]
    fn chunking_is_restartable_and_deterministic() {
        let doc = Document::new("d.txt", "one\ntwo\n\nthree");
        let first: Vec<Chunk> = LineChunker.chunk(&doc).collect();
        let second: Vec<Chunk> = LineChunker.chunk(&doc).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn window_policy_groups_lines_and_keeps_short_tail() {
        let text = (1..=25).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let doc = Document::new("lib.rs", text);
        let chunks: Vec<Chunk> = WindowChunker::default().chunk(&doc).collect();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].key, "lib.rs-chunk-0");
        assert_eq!(chunks[2].key, "lib.rs-chunk-2");
        assert_eq!(chunks[0].text.lines().count(), 10);
        assert_eq!(chunks[2].text.lines().count(), 5);
        assert!(chunks[1].text.starts_with("line 11\n"));
        assert_eq!(chunks[2].metadata.get("chunk_policy").map(String::as_str), Some("window"));
    }

    #[test]
    fn window_policy_skips_blank_windows_without_renumbering() {
        let doc = Document::new("f", "a\nb\n\n\nc");
        let chunker = WindowChunker::new(2).unwrap();
        assert_eq!(positions(chunker.chunk(&doc)), [0, 2]);
    }

    #[test]
    fn window_size_zero_is_rejected() {
        assert!(matches!(WindowChunker::new(0), Err(RagError::Config(_))));
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        let doc = Document::new("empty", "");
        assert_eq!(LineChunker.chunk(&doc).count(), 0);
        assert_eq!(WindowChunker::default().chunk(&doc).count(), 0);
    }
}
