//! # Code Index Example
//!
//! Windows every `.rs` file under a directory into keyword memory, then runs
//! a few substring searches over the indexed code.
//!
//! Run: `cargo run --example code_index -- [DIR] [QUERY]`
//! (defaults to the current directory and `impl VectorStore`)

use std::path::PathBuf;

use lore_rag::{CodeIndexer, DEFAULT_CODE_COLLECTION, KeywordStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("lore_rag=debug").init();

    let mut args = std::env::args().skip(1);
    let root = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    let query = args.next().unwrap_or_else(|| "impl VectorStore".to_string());

    let store = KeywordStore::new();
    let indexer = CodeIndexer::default();
    let summary = indexer.index_into_keywords(&root, &store, DEFAULT_CODE_COLLECTION).await?;
    println!(
        "Indexed {} files into {} windows under '{}'",
        summary.files,
        summary.chunks,
        root.display()
    );

    let matches = store.search(DEFAULT_CODE_COLLECTION, &query).await;
    println!("\n{} window(s) mention \"{query}\":", matches.len());
    for window in matches.iter().take(3) {
        println!("----\n{window}");
    }

    let keys = store.keys(DEFAULT_CODE_COLLECTION).await;
    if let Some(first) = keys.first() {
        println!("\nFirst window key: {first}");
        println!("{}", store.retrieve(DEFAULT_CODE_COLLECTION, first).await);
    }
    Ok(())
}
