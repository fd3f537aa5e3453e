//! # RAG Basic Example
//!
//! Ingest a short story line by line, then ask questions about it and print
//! the cited answers.
//!
//! Uses `InMemoryVectorStore`, `LineChunker`, and the offline `HashEmbedder`
//! so it runs with **zero API keys**.
//!
//! Run: `cargo run --example rag_basic`

use std::sync::Arc;

use lore_rag::{Document, HashEmbedder, InMemoryVectorStore, LineChunker, RagConfig, RagPipeline};

const STORY: &str = "\
Elena arrived in Lisbon on a wet Tuesday in November.
She took a room above a bakery near the old tram line.

Every morning she bought coffee from a stall by the river.
Tomas ran the stall and always remembered how she took it.
They first spoke properly when the tram broke down in the rain.

By spring they were walking the river path together every evening.
";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("lore_rag=info").init();

    // -- 1. Configure the pipeline ----------------------------------------
    // top_k=3 returns the three closest lines; the threshold drops lines
    // that share nothing with the query.
    let config = RagConfig::builder().top_k(3).similarity_threshold(0.05).build()?;

    // -- 2. Build the pipeline with in-memory components ------------------
    let pipeline = RagPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(HashEmbedder::new(256)?))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .chunker(Arc::new(LineChunker))
        .build()?;

    // -- 3. Ingest --------------------------------------------------------
    let collection = "loveStory";
    let story = Document::new("story.txt", STORY);
    let report = pipeline.ingest_document(collection, &story).await?;
    println!("Ingested {} paragraphs: {:?}", report.chunk_count(), report.keys);

    // Re-ingesting replaces by key instead of duplicating.
    pipeline.ingest_document(collection, &story).await?;
    let size = pipeline.vector_store().len(collection).await?;
    println!("Collection size after re-ingest: {size}");

    // -- 4. Ask -----------------------------------------------------------
    let queries = ["Where did they first speak?", "coffee stall by the river", "quantum physics"];
    for query in queries {
        println!("\nQuery: \"{query}\"");
        println!("{}", pipeline.retrieve(collection, query, None).await?);
    }

    println!("\nDone.");
    Ok(())
}
