//! Retrieval pipeline orchestrator.
//!
//! The [`RagPipeline`] coordinates ingestion (chunk → embed → upsert) and
//! retrieval (embed → search → filter → cite) by composing an
//! [`EmbeddingProvider`], a [`VectorStore`] and a [`Chunker`].
//!
//! # Example
//!
//! ```rust,ignore
//! use lore_rag::{RagPipeline, RagConfig, InMemoryVectorStore, LineChunker};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .chunker(Arc::new(LineChunker))
//!     .build()?;
//!
//! pipeline.ingest_document("docs", &document).await?;
//! let answer = pipeline.retrieve("docs", "search query", None).await?;
//! println!("{answer}");
//! ```

use std::pin::pin;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::answer::Answer;
use crate::chunking::{Chunker, LineChunker};
use crate::config::RagConfig;
use crate::document::{Chunk, Document, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::inmemory::InMemoryVectorStore;
use crate::vectorstore::VectorStore;

/// Summary of a completed ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Target collection.
    pub collection: String,
    /// Keys upserted, in upsert order.
    pub keys: Vec<String>,
}

impl IngestReport {
    /// Number of chunks upserted.
    pub fn chunk_count(&self) -> usize {
        self.keys.len()
    }
}

/// The retrieval pipeline orchestrator.
///
/// Construct one via [`RagPipeline::builder()`]. The pipeline only holds
/// shared handles; the store it writes to outlives any single call.
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    chunker: Arc<dyn Chunker>,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Return a reference to the vector store.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    /// Create a collection pinned to the embedding provider's dimensionality.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if the collection already
    /// holds vectors of another size.
    pub async fn ensure_collection(&self, name: &str) -> Result<()> {
        let dimensions = self.embedding_provider.dimensions();
        self.vector_store.ensure_with_dimensions(name, dimensions).await.map_err(|e| {
            error!(collection = name, error = %e, "failed to ensure collection");
            e
        })
    }

    /// Embed `text`, bounded by the configured timeout.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let timeout = self.config.embed_timeout;
        match tokio::time::timeout(timeout, self.embedding_provider.embed(text)).await {
            Ok(result) => result,
            Err(_) => Err(RagError::gateway(
                self.embedding_provider.name(),
                format!("embedding timed out after {timeout:?}"),
            )),
        }
    }

    /// Embed and upsert `chunks` into `collection`, creating it if absent.
    ///
    /// Up to `embed_concurrency` embedding calls run at once, but upserts
    /// are applied strictly in input order. Each upsert is atomic, so
    /// dropping this future mid-run leaves only whole chunks behind.
    ///
    /// # Errors
    ///
    /// Aborts on the first failure with [`RagError::Ingest`] naming the
    /// failing chunk's key. Chunks before it stay upserted.
    pub async fn ingest<I>(&self, collection: &str, chunks: I) -> Result<IngestReport>
    where
        I: IntoIterator<Item = Chunk>,
        I::IntoIter: Send,
    {
        self.vector_store.ensure(collection).await?;

        let embedded = stream::iter(chunks.into_iter().map(|chunk| async move {
            let result = self.embed(&chunk.text).await;
            (chunk, result)
        }))
        .buffered(self.config.embed_concurrency);
        let mut embedded = pin!(embedded);

        let mut keys = Vec::new();
        while let Some((chunk, result)) = embedded.next().await {
            let key = chunk.key.clone();
            let embedding = result.map_err(|e| {
                error!(collection, key = %key, error = %e, "embedding failed during ingestion");
                RagError::Ingest { key: key.clone(), source: Box::new(e) }
            })?;

            debug!(collection, key = %key, dimensions = embedding.len(), "embedded chunk");
            self.vector_store.upsert(collection, chunk.with_embedding(embedding)).await.map_err(
                |e| {
                    error!(collection, key = %key, error = %e, "upsert failed during ingestion");
                    RagError::Ingest { key: key.clone(), source: Box::new(e) }
                },
            )?;
            keys.push(key);
        }

        info!(collection, chunk_count = keys.len(), "ingestion completed");
        Ok(IngestReport { collection: collection.to_string(), keys })
    }

    /// Chunk `document` with the configured chunker, then [`ingest`](Self::ingest) it.
    pub async fn ingest_document(
        &self,
        collection: &str,
        document: &Document,
    ) -> Result<IngestReport> {
        debug!(
            collection,
            document = %document.name,
            policy = self.chunker.policy(),
            "chunking document"
        );
        self.ingest(collection, self.chunker.chunk(document)).await
    }

    /// Ingest several documents in order, stopping at the first failure.
    pub async fn ingest_documents(
        &self,
        collection: &str,
        documents: &[Document],
    ) -> Result<IngestReport> {
        let mut keys = Vec::new();
        for document in documents {
            keys.extend(self.ingest_document(collection, document).await?.keys);
        }
        Ok(IngestReport { collection: collection.to_string(), keys })
    }

    /// Embed `query` and return raw search results above the threshold.
    ///
    /// `max_results` defaults to the configured `top_k`.
    ///
    /// # Errors
    ///
    /// [`RagError::Usage`] for a blank query or zero `max_results`, gateway
    /// errors from the embedder, [`RagError::DimensionMismatch`] if the
    /// query vector does not fit the collection.
    pub async fn query(
        &self,
        collection: &str,
        query: &str,
        max_results: Option<usize>,
    ) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(RagError::Usage("query must not be empty".into()));
        }
        let max_results = max_results.unwrap_or(self.config.top_k);

        let query_embedding = self.embed(query).await.map_err(|e| {
            error!(error = %e, "embedding failed during query");
            e
        })?;

        let results =
            self.vector_store.search(collection, &query_embedding, max_results).await.map_err(
                |e| {
                    error!(collection, error = %e, "vector store search failed");
                    e
                },
            )?;

        let filtered: Vec<SearchResult> = match self.config.similarity_threshold {
            Some(threshold) => results.into_iter().filter(|r| r.score >= threshold).collect(),
            None => results,
        };

        info!(collection, result_count = filtered.len(), "query completed");
        Ok(filtered)
    }

    /// Answer `query` with cited chunks from `collection`.
    ///
    /// An empty result is [`Answer::NoRelevantInformation`], not an error.
    pub async fn retrieve(
        &self,
        collection: &str,
        query: &str,
        max_results: Option<usize>,
    ) -> Result<Answer> {
        self.query(collection, query, max_results).await.map(Answer::from)
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `embedding_provider` is required. `config` defaults to
/// [`RagConfig::default()`], `chunker` to [`LineChunker`], and
/// `vector_store` to an [`InMemoryVectorStore`] ranking by the config's
/// `metric`.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if the embedding provider is missing or
    /// the config is invalid.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let vector_store = self.vector_store.unwrap_or_else(|| {
            Arc::new(InMemoryVectorStore::with_metric(config.metric)) as Arc<dyn VectorStore>
        });
        let chunker = self.chunker.unwrap_or_else(|| Arc::new(LineChunker));

        Ok(RagPipeline { config, embedding_provider, vector_store, chunker })
    }
}
