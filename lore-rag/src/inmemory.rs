//! In-memory vector store with per-collection locking.
//!
//! This module provides [`InMemoryVectorStore`], a vector store backed by
//! `HashMap`s protected by `tokio::sync::RwLock`s. The outer lock only guards
//! the name → collection table; each collection carries its own lock, so
//! writes to one collection never block readers or writers of another.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::SimilarityMetric;
use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// A stored chunk plus the sequence number of its first insertion.
#[derive(Debug)]
struct Entry {
    seq: u64,
    chunk: Chunk,
}

#[derive(Debug, Default)]
struct Collection {
    dimensions: Option<usize>,
    next_seq: u64,
    entries: HashMap<String, Entry>,
}

impl Collection {
    fn check_dimensions(&self, name: &str, actual: usize) -> Result<()> {
        match self.dimensions {
            Some(expected) if expected != actual => Err(RagError::DimensionMismatch {
                collection: name.to_string(),
                expected,
                actual,
            }),
            _ => Ok(()),
        }
    }

    /// Insert or replace. A replaced chunk keeps its original slot so
    /// tie-breaking stays stable across re-ingestion.
    fn put(&mut self, chunk: Chunk) {
        if self.dimensions.is_none() {
            self.dimensions = Some(chunk.embedding.len());
        }
        match self.entries.get_mut(&chunk.key) {
            Some(entry) => entry.chunk = chunk,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.entries.insert(chunk.key.clone(), Entry { seq, chunk });
            }
        }
    }
}

/// An in-memory vector store ranking by a configurable [`SimilarityMetric`].
///
/// Collection names are case-sensitive. Search results are ordered by
/// descending score; equal scores keep insertion order.
///
/// # Example
///
/// ```rust,ignore
/// use lore_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.ensure("docs").await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    metric: SimilarityMetric,
    collections: RwLock<HashMap<String, Arc<RwLock<Collection>>>>,
}

impl InMemoryVectorStore {
    /// Create a new empty store using cosine similarity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty store using `metric`.
    pub fn with_metric(metric: SimilarityMetric) -> Self {
        Self { metric, collections: RwLock::default() }
    }

    /// The metric this store ranks by.
    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    async fn get(&self, name: &str) -> Option<Arc<RwLock<Collection>>> {
        self.collections.read().await.get(name).cloned()
    }

    async fn get_or_create(&self, name: &str) -> Arc<RwLock<Collection>> {
        if let Some(collection) = self.get(name).await {
            return collection;
        }
        let mut collections = self.collections.write().await;
        collections.entry(name.to_string()).or_default().clone()
    }
}

fn require_embedding(chunk: &Chunk) -> Result<()> {
    if chunk.embedding.is_empty() {
        return Err(RagError::Usage(format!("chunk '{}' has no embedding", chunk.key)));
    }
    Ok(())
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn ensure(&self, collection: &str) -> Result<()> {
        self.get_or_create(collection).await;
        Ok(())
    }

    async fn ensure_with_dimensions(&self, collection: &str, dimensions: usize) -> Result<()> {
        if dimensions == 0 {
            return Err(RagError::Usage("collection dimensions must be non-zero".into()));
        }
        let handle = self.get_or_create(collection).await;
        let mut guard = handle.write().await;
        guard.check_dimensions(collection, dimensions)?;
        guard.dimensions = Some(dimensions);
        Ok(())
    }

    async fn upsert(&self, collection: &str, chunk: Chunk) -> Result<()> {
        require_embedding(&chunk)?;
        let handle = self.get_or_create(collection).await;
        let mut guard = handle.write().await;
        guard.check_dimensions(collection, chunk.embedding.len())?;

        debug!(collection, key = %chunk.key, "upserting chunk");
        guard.put(chunk);
        Ok(())
    }

    async fn upsert_batch(&self, collection: &str, chunks: Vec<Chunk>) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }
        for chunk in &chunks {
            require_embedding(chunk)?;
        }

        let handle = self.get_or_create(collection).await;
        let mut guard = handle.write().await;
        let expected = guard.dimensions.unwrap_or(chunks[0].embedding.len());
        for chunk in &chunks {
            if chunk.embedding.len() != expected {
                return Err(RagError::DimensionMismatch {
                    collection: collection.to_string(),
                    expected,
                    actual: chunk.embedding.len(),
                });
            }
        }

        debug!(collection, chunk_count = chunks.len(), "upserting chunk batch");
        for chunk in chunks {
            guard.put(chunk);
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        max_results: usize,
    ) -> Result<Vec<SearchResult>> {
        if max_results == 0 {
            return Err(RagError::Usage("max_results must be greater than zero".into()));
        }
        let Some(handle) = self.get(collection).await else {
            return Ok(Vec::new());
        };
        let guard = handle.read().await;
        if guard.entries.is_empty() {
            return Ok(Vec::new());
        }
        guard.check_dimensions(collection, embedding.len())?;

        let mut scored: Vec<(f32, &Entry)> = guard
            .entries
            .values()
            .map(|entry| (self.metric.score(&entry.chunk.embedding, embedding), entry))
            .collect();
        scored.sort_by(|(score_a, a), (score_b, b)| {
            score_b.total_cmp(score_a).then_with(|| a.seq.cmp(&b.seq))
        });
        scored.truncate(max_results);

        Ok(scored
            .into_iter()
            .map(|(score, entry)| SearchResult { chunk: entry.chunk.clone(), score })
            .collect())
    }

    async fn delete(&self, collection: &str, keys: &[&str]) -> Result<usize> {
        let Some(handle) = self.get(collection).await else {
            return Ok(0);
        };
        let mut guard = handle.write().await;
        Ok(keys.iter().filter(|key| guard.entries.remove(**key).is_some()).count())
    }

    async fn delete_collection(&self, collection: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(collection);
        Ok(())
    }

    async fn len(&self, collection: &str) -> Result<usize> {
        match self.get(collection).await {
            Some(handle) => Ok(handle.read().await.entries.len()),
            None => Ok(0),
        }
    }

    async fn collections(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.collections.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
