//! File-based settings layered under the command line.

use std::path::Path;

use anyhow::Context;
use lore_rag::{DEFAULT_CODE_COLLECTION, RagConfig};
use serde::{Deserialize, Serialize};

/// Collection used for ingested documents when none is given.
pub const DEFAULT_DOCUMENT_COLLECTION: &str = "documents";

/// Default dimensions for the hash embedder.
pub const DEFAULT_HASH_DIMENSIONS: usize = 256;

/// Contents of the optional JSON settings file. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Retrieval pipeline configuration.
    pub rag: RagConfig,
    /// Vector collection for ingested documents.
    pub document_collection: String,
    /// Keyword collection for indexed code.
    pub code_collection: String,
    /// Extensions indexed by `index-code` and `chat --code` when none are given.
    pub code_extensions: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rag: RagConfig::default(),
            document_collection: DEFAULT_DOCUMENT_COLLECTION.to_string(),
            code_collection: DEFAULT_CODE_COLLECTION.to_string(),
            code_extensions: vec!["rs".to_string()],
        }
    }
}

impl Settings {
    /// Read and validate settings from `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&raw)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        settings.rag.validate()?;
        Ok(settings)
    }

    /// Settings from `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
