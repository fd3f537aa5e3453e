//! Data types for documents, chunks, and search results.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// A source document: a name used for citation plus its raw text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Source identity, e.g. the file name. Used in chunk keys and citations.
    pub name: String,
    /// The raw text content.
    pub text: String,
    /// Key-value metadata copied onto every chunk of this document.
    pub metadata: HashMap<String, String>,
    /// Optional URI pointing to the original source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<String>,
}

impl Document {
    /// Create a document from in-memory text.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self { name: name.into(), text: text.into(), metadata: HashMap::new(), source_uri: None }
    }

    /// Read a UTF-8 text file. The document name is the file name.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Usage`] if the file cannot be read or is not UTF-8.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| RagError::Usage(format!("cannot read '{}': {e}", path.display())))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            text,
            metadata: HashMap::new(),
            source_uri: Some(path.display().to_string()),
        })
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Where a chunk came from inside its document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum ChunkPosition {
    /// 1-based source line number (line policy). Gaps are meaningful.
    Paragraph(usize),
    /// 0-based run number (window policy).
    Window(usize),
}

impl ChunkPosition {
    /// The numeric index regardless of policy.
    pub fn index(self) -> usize {
        match self {
            Self::Paragraph(n) | Self::Window(n) => n,
        }
    }
}

impl fmt::Display for ChunkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paragraph(n) => write!(f, "Paragraph: {n}"),
            Self::Window(n) => write!(f, "Window: {n}"),
        }
    }
}

/// The unit of retrieval: a piece of a [`Document`] plus its embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique key within a collection, stable across re-ingestion.
    pub key: String,
    /// Name of the parent [`Document`].
    pub document_name: String,
    /// Position of this chunk inside the parent document.
    pub position: ChunkPosition,
    /// The retrievable text. Never empty.
    pub text: String,
    /// The vector embedding; empty until the ingestion pipeline fills it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,
    /// Metadata inherited from the parent document plus chunk-specific fields.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Chunk {
    /// Create a chunk without an embedding.
    pub fn new(
        key: impl Into<String>,
        document_name: impl Into<String>,
        position: ChunkPosition,
        text: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            document_name: document_name.into(),
            position,
            text: text.into(),
            embedding: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Return this chunk with `embedding` attached.
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = embedding;
        self
    }
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant, for every metric).
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_path_uses_file_name_and_reports_unreadable_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loveStory.txt");
        std::fs::write(&path, "once upon a time").unwrap();

        let doc = Document::from_path(&path).unwrap();
        assert_eq!(doc.name, "loveStory.txt");
        assert_eq!(doc.text, "once upon a time");

        let err = Document::from_path(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, RagError::Usage(_)));
    }

    #[test]
    fn position_renders_for_citation() {
        assert_eq!(ChunkPosition::Paragraph(3).to_string(), "Paragraph: 3");
        assert_eq!(ChunkPosition::Window(0).to_string(), "Window: 0");
        assert_eq!(ChunkPosition::Window(7).index(), 7);
    }
}
