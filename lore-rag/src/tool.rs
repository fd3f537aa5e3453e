//! Function-call adapters for a chat layer.
//!
//! Each [`Tool`] exposes a JSON-schema'd entry point over the retrieval
//! pipeline or the keyword store so an LLM agent can call it by name.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lore_rag::{RagPipeline, RetrievalTool, Tool};
//!
//! let pipeline = Arc::new(build_pipeline()?);
//! let tool = RetrievalTool::new(pipeline, "loveStory");
//!
//! // The agent calls the tool with:
//! // { "query": "Where do they meet?", "max_results": 5 }
//! let output = tool.execute(args).await?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{error, info};

use crate::error::{RagError, Result};
use crate::keyword::KeywordStore;
use crate::pipeline::RagPipeline;

/// A named operation callable with JSON arguments.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Function name presented to the model.
    fn name(&self) -> &str;

    /// What the function does, presented to the model.
    fn description(&self) -> &str;

    /// JSON schema of the arguments object.
    fn parameters_schema(&self) -> Value;

    /// Run the tool.
    async fn execute(&self, args: Value) -> Result<Value>;
}

fn required_str<'a>(args: &'a Value, field: &str) -> Result<&'a str> {
    args.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| RagError::Usage(format!("missing required '{field}' parameter")))
}

/// Semantic search over a vector collection.
///
/// Accepts a required `query` and optional `collection` and `max_results`.
/// Returns `{ "answer": <rendered markdown>, "result": <structured answer> }`.
pub struct RetrievalTool {
    pipeline: Arc<RagPipeline>,
    default_collection: String,
}

impl RetrievalTool {
    /// Create a new `RetrievalTool` backed by the given pipeline.
    ///
    /// The `default_collection` is used when the call does not name one.
    pub fn new(pipeline: Arc<RagPipeline>, default_collection: impl Into<String>) -> Self {
        Self { pipeline, default_collection: default_collection.into() }
    }
}

#[async_trait]
impl Tool for RetrievalTool {
    fn name(&self) -> &str {
        "search_vector_store"
    }

    fn description(&self) -> &str {
        "Search for data in vector store"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "collection": {
                    "type": "string",
                    "description": "The collection to search. Uses the default collection if omitted."
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let query = required_str(&args, "query")?;
        let collection =
            args.get("collection").and_then(Value::as_str).unwrap_or(&self.default_collection);
        let max_results = match args.get("max_results") {
            None | Some(Value::Null) => None,
            Some(value) => Some(value.as_u64().filter(|n| *n > 0).ok_or_else(|| {
                RagError::Usage("'max_results' must be a positive integer".into())
            })? as usize),
        };

        info!(query, collection, max_results, "search_vector_store tool called");

        let answer = self.pipeline.retrieve(collection, query, max_results).await.map_err(|e| {
            error!(error = %e, "search_vector_store failed");
            e
        })?;

        Ok(json!({ "answer": answer.to_string(), "result": answer }))
    }
}

/// Save text into the keyword memory.
pub struct MemorySaveTool {
    store: Arc<KeywordStore>,
}

impl MemorySaveTool {
    /// Create a tool writing into `store`.
    pub fn new(store: Arc<KeywordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for MemorySaveTool {
    fn name(&self) -> &str {
        "memory_save"
    }

    fn description(&self) -> &str {
        "Save a piece of text under a key in a memory collection"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "collection": { "type": "string" },
                "key": { "type": "string" },
                "text": { "type": "string" }
            },
            "required": ["collection", "key", "text"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let collection = required_str(&args, "collection")?;
        let key = required_str(&args, "key")?;
        let text = required_str(&args, "text")?;
        let saved = self.store.save(collection, key, text).await;
        Ok(json!({ "message": saved.to_string() }))
    }
}

/// Fetch text by key from the keyword memory.
pub struct MemoryRetrieveTool {
    store: Arc<KeywordStore>,
}

impl MemoryRetrieveTool {
    /// Create a tool reading from `store`.
    pub fn new(store: Arc<KeywordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for MemoryRetrieveTool {
    fn name(&self) -> &str {
        "memory_retrieve"
    }

    fn description(&self) -> &str {
        "Retrieve the text saved under a key in a memory collection"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "collection": { "type": "string" },
                "key": { "type": "string" }
            },
            "required": ["collection", "key"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let collection = required_str(&args, "collection")?;
        let key = required_str(&args, "key")?;
        let lookup = self.store.retrieve(collection, key).await;
        Ok(json!({ "message": lookup.to_string(), "result": lookup }))
    }
}

/// Case-insensitive substring search over the keyword memory.
pub struct MemorySearchTool {
    store: Arc<KeywordStore>,
}

impl MemorySearchTool {
    /// Create a tool searching `store`.
    pub fn new(store: Arc<KeywordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for MemorySearchTool {
    fn name(&self) -> &str {
        "memory_search"
    }

    fn description(&self) -> &str {
        "Find saved texts in a memory collection containing the query, ignoring case"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "collection": { "type": "string" },
                "query": { "type": "string" }
            },
            "required": ["collection", "query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let collection = required_str(&args, "collection")?;
        let query = required_str(&args, "query")?;
        let matches = self.store.search(collection, query).await;
        Ok(json!({ "message": matches.to_string(), "matches": matches }))
    }
}

/// The three keyword memory tools sharing one store.
pub fn memory_tools(store: Arc<KeywordStore>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(MemorySaveTool::new(Arc::clone(&store))),
        Arc::new(MemoryRetrieveTool::new(Arc::clone(&store))),
        Arc::new(MemorySearchTool::new(store)),
    ]
}
