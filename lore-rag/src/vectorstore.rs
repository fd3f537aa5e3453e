//! Vector store trait for storing and searching vector embeddings.

use async_trait::async_trait;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// A storage backend for vector embeddings with similarity search.
///
/// Implementations manage named collections of [`Chunk`]s keyed by
/// [`Chunk::key`]. A collection springs into existence the first time it is
/// referenced by [`ensure`](VectorStore::ensure) or
/// [`upsert`](VectorStore::upsert), and every chunk in it has the same
/// embedding dimensionality.
///
/// # Example
///
/// ```rust,ignore
/// use lore_rag::{VectorStore, InMemoryVectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.ensure("docs").await?;
/// store.upsert("docs", chunk).await?;
/// let results = store.search("docs", &query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a named collection. No-op if it already exists.
    async fn ensure(&self, collection: &str) -> Result<()>;

    /// Create a named collection and pin its dimensionality.
    ///
    /// Fails with `DimensionMismatch` if the collection already holds
    /// vectors of a different size.
    async fn ensure_with_dimensions(&self, collection: &str, dimensions: usize) -> Result<()>;

    /// Insert or fully replace a chunk by key. The chunk must carry an embedding.
    async fn upsert(&self, collection: &str, chunk: Chunk) -> Result<()>;

    /// Upsert several chunks under a single write, in slice order.
    ///
    /// Either every chunk is applied or none is.
    async fn upsert_batch(&self, collection: &str, chunks: Vec<Chunk>) -> Result<()>;

    /// Search for the `max_results` chunks most similar to `embedding`.
    ///
    /// Returns results ordered by descending score, ties in insertion order.
    /// An empty or absent collection yields an empty `Vec`.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        max_results: usize,
    ) -> Result<Vec<SearchResult>>;

    /// Delete chunks by key. Returns how many were removed.
    async fn delete(&self, collection: &str, keys: &[&str]) -> Result<usize>;

    /// Delete a named collection and all its data.
    async fn delete_collection(&self, collection: &str) -> Result<()>;

    /// Number of chunks stored in `collection` (zero if absent).
    async fn len(&self, collection: &str) -> Result<usize>;

    /// Names of all collections, sorted.
    async fn collections(&self) -> Result<Vec<String>>;
}
