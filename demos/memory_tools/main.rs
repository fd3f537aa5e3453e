//! # Memory Tools Example
//!
//! Drives the keyword memory and the vector search through the JSON tool
//! adapters, the same way a chat layer would dispatch function calls.
//!
//! Run: `cargo run --example memory_tools`

use std::sync::Arc;

use lore_rag::{
    Document, HashEmbedder, InMemoryVectorStore, KeywordStore, RagPipeline, RetrievalTool, Tool,
    memory_tools,
};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("lore_rag=info").init();

    let store = Arc::new(KeywordStore::new());
    let mut tools: Vec<Arc<dyn Tool>> = memory_tools(store.clone());

    let pipeline = Arc::new(
        RagPipeline::builder()
            .embedding_provider(Arc::new(HashEmbedder::new(128)?))
            .vector_store(Arc::new(InMemoryVectorStore::new()))
            .build()?,
    );
    pipeline
        .ingest_document(
            "recipes",
            &Document::new(
                "pancakes.txt",
                "Whisk two eggs with milk.\nFold in flour and a pinch of salt.\nFry in butter.",
            ),
        )
        .await?;
    tools.push(Arc::new(RetrievalTool::new(pipeline, "recipes")));

    println!("Available tools:");
    for tool in &tools {
        println!("  {} - {}", tool.name(), tool.description());
    }

    // Simulated function calls, as a model would emit them.
    let calls = [
        (
            "memory_save",
            json!({ "collection": "Prefs", "key": "diet", "text": "No nuts, lots of butter" }),
        ),
        ("memory_retrieve", json!({ "collection": "prefs", "key": "DIET" })),
        ("memory_retrieve", json!({ "collection": "prefs", "key": "allergies" })),
        ("memory_search", json!({ "collection": "PREFS", "query": "butter" })),
        (
            "search_vector_store",
            json!({ "query": "what do I fry the pancakes in?", "max_results": 1 }),
        ),
    ];

    for (name, args) in calls {
        let Some(tool) = tools.iter().find(|t| t.name() == name) else {
            println!("no tool named {name}");
            continue;
        };
        println!("\n> {name}({args})");
        match tool.execute(args).await {
            Ok(output) => println!("{}", serde_json::to_string_pretty(&output)?),
            Err(e) => println!("error: {e}"),
        }
    }

    println!("\nCollections in memory: {:?}", store.collections().await);
    Ok(())
}
