//! Source-code indexing with the window chunking policy.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::chunking::{Chunker, WindowChunker};
use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};
use crate::keyword::KeywordStore;

/// Keyword collection used for code when the caller has no preference.
pub const DEFAULT_CODE_COLLECTION: &str = "codebase";

/// Totals for one indexing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    /// Source files read.
    pub files: usize,
    /// Windows produced across all files.
    pub chunks: usize,
}

/// Walks a repository and splits matching files into line windows.
///
/// Files are visited in sorted path order so keys and ordering are stable
/// between runs.
#[derive(Debug, Clone)]
pub struct CodeIndexer {
    chunker: WindowChunker,
    extensions: Vec<String>,
}

impl CodeIndexer {
    /// Index `.rs` files with windows of `window_size` lines.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `window_size` is zero.
    pub fn new(window_size: usize) -> Result<Self> {
        Ok(Self { chunker: WindowChunker::new(window_size)?, extensions: vec!["rs".to_string()] })
    }

    /// Replace the set of file extensions (without the dot) to index.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Matching files under `root`, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Usage`] if `root` is not a directory.
    pub fn discover(&self, root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(RagError::Usage(format!(
                "repository path not found: {}",
                root.display()
            )));
        }

        let mut files = WalkDir::new(root)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry.path().extension().is_some_and(|ext| {
                    let ext = ext.to_string_lossy().to_ascii_lowercase();
                    self.extensions.iter().any(|wanted| *wanted == ext)
                })
            })
            .map(|entry| entry.into_path())
            .collect::<Vec<_>>();

        files.sort();
        Ok(files)
    }

    /// Read and window every matching file under `root`.
    ///
    /// Each file is named by its `/`-separated path relative to `root`, so
    /// same-named files in different directories get distinct keys.
    ///
    /// # Errors
    ///
    /// [`RagError::Usage`] if `root` is missing or any matching file cannot
    /// be read; no chunks are returned in that case.
    pub fn collect_chunks(&self, root: impl AsRef<Path>) -> Result<(Vec<Chunk>, IndexSummary)> {
        let root = root.as_ref();
        let files = self.discover(root)?;
        let mut chunks = Vec::new();
        for path in &files {
            let mut document = Document::from_path(path)?;
            document.name = relative_name(root, path);
            let before = chunks.len();
            chunks.extend(self.chunker.chunk(&document));
            debug!(file = %path.display(), windows = chunks.len() - before, "indexed file");
        }

        let summary = IndexSummary { files: files.len(), chunks: chunks.len() };
        Ok((chunks, summary))
    }

    /// Save every window under `root` into `collection` of `store`.
    pub async fn index_into_keywords(
        &self,
        root: impl AsRef<Path>,
        store: &KeywordStore,
        collection: &str,
    ) -> Result<IndexSummary> {
        let (chunks, summary) = self.collect_chunks(root)?;
        for chunk in &chunks {
            store.save(collection, &chunk.key, &chunk.text).await;
        }
        info!(collection, files = summary.files, chunks = summary.chunks, "indexed code");
        Ok(summary)
    }
}

fn relative_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

impl Default for CodeIndexer {
    fn default() -> Self {
        Self { chunker: WindowChunker::default(), extensions: vec!["rs".to_string()] }
    }
}
