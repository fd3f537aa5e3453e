//! # lore-rag
//!
//! A minimal semantic retrieval store.
//!
//! Text is split into addressable [`Chunk`]s by a [`Chunker`], each chunk is
//! embedded by an [`EmbeddingProvider`], and chunks are upserted into a
//! per-collection [`VectorStore`] keyed by a stable identifier. Queries are
//! answered by embedding the query text and returning the closest chunks
//! with provenance (document name, paragraph or window, score).
//!
//! [`KeywordStore`] is the embedding-free fallback: collection → key → text
//! with case-insensitive lookup and substring search.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lore_rag::{Document, HashEmbedder, InMemoryVectorStore, RagPipeline};
//!
//! let pipeline = RagPipeline::builder()
//!     .embedding_provider(Arc::new(HashEmbedder::new(256)?))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .build()?;
//!
//! pipeline.ingest_document("loveStory", &Document::from_path("story.txt")?).await?;
//! println!("{}", pipeline.retrieve("loveStory", "where do they meet?", None).await?);
//! ```
//!
//! ## Features
//!
//! - `openai`: [`openai::OpenAIEmbeddingProvider`] for OpenAI-compatible endpoints.

pub mod answer;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod indexer;
pub mod inmemory;
pub mod keyword;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
pub mod tool;
pub mod vectorstore;

pub use answer::{Answer, Citation, NO_RELEVANT_INFORMATION};
pub use chunking::{Chunker, Chunks, LineChunker, WindowChunker};
pub use config::{RagConfig, RagConfigBuilder, SimilarityMetric};
pub use document::{Chunk, ChunkPosition, Document, SearchResult};
pub use embedding::{EmbeddingProvider, HashEmbedder};
pub use error::{RagError, Result};
pub use indexer::{CodeIndexer, DEFAULT_CODE_COLLECTION, IndexSummary};
pub use inmemory::InMemoryVectorStore;
pub use keyword::{KeywordStore, Lookup, Matches, NO_MATCHES, Saved};
#[cfg(feature = "openai")]
pub use openai::OpenAIEmbeddingProvider;
pub use pipeline::{IngestReport, RagPipeline, RagPipelineBuilder};
pub use tool::{
    MemoryRetrieveTool, MemorySaveTool, MemorySearchTool, RetrievalTool, Tool, memory_tools,
};
pub use vectorstore::VectorStore;
