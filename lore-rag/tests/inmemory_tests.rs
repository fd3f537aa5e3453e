//! Property tests for in-memory vector store search ordering.

use std::collections::HashSet;

use lore_rag::document::{Chunk, ChunkPosition};
use lore_rag::inmemory::InMemoryVectorStore;
use lore_rag::vectorstore::VectorStore;
use proptest::prelude::*;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

/// Generate a chunk with a normalized embedding.
fn arb_chunk(dim: usize) -> impl Strategy<Value = Chunk> {
    ("[a-z]{3,8}", "[a-z ]{5,30}", arb_normalized_embedding(dim)).prop_map(
        |(key, text, embedding)| {
            Chunk::new(key, "doc_1", ChunkPosition::Paragraph(1), text).with_embedding(embedding)
        },
    )
}

fn unit(cos: f32) -> Vec<f32> {
    vec![cos, (1.0 - cos * cos).sqrt()]
}

#[tokio::test]
async fn returns_the_two_most_similar_in_descending_order() {
    let store = InMemoryVectorStore::new();
    for (key, cos) in [("mid", 0.5), ("low", 0.1), ("high", 0.9)] {
        let chunk = Chunk::new(key, "doc", ChunkPosition::Paragraph(1), key);
        store.upsert("docs", chunk.with_embedding(unit(cos))).await.unwrap();
    }

    let results = store.search("docs", &[1.0, 0.0], 2).await.unwrap();
    let keys: Vec<&str> = results.iter().map(|r| r.chunk.key.as_str()).collect();
    assert_eq!(keys, ["high", "mid"]);
    assert!((results[0].score - 0.9).abs() < 1e-5);
    assert!((results[1].score - 0.5).abs() < 1e-5);
}

#[tokio::test]
async fn max_results_above_collection_size_returns_everything() {
    let store = InMemoryVectorStore::new();
    for key in ["a", "b", "c"] {
        let chunk = Chunk::new(key, "doc", ChunkPosition::Paragraph(1), key);
        store.upsert("docs", chunk.with_embedding(vec![1.0, 0.0])).await.unwrap();
    }
    assert_eq!(store.search("docs", &[1.0, 0.0], 100).await.unwrap().len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_upserts_to_separate_collections_all_land() {
    let store = std::sync::Arc::new(InMemoryVectorStore::new());
    let mut handles = Vec::new();
    for c in 0..4 {
        for i in 0..25 {
            let store = std::sync::Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let position = ChunkPosition::Paragraph(i + 1);
                let chunk = Chunk::new(format!("k{i}"), "doc", position, "t")
                    .with_embedding(vec![1.0, i as f32]);
                store.upsert(&format!("col{c}"), chunk).await.unwrap();
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for c in 0..4 {
        assert_eq!(store.len(&format!("col{c}")).await.unwrap(), 25);
    }
}

/// *For any* set of chunks stored in an InMemoryVectorStore, searching with a
/// query embedding returns results ordered by descending cosine similarity,
/// and exactly `min(max_results, unique keys)` of them.
mod prop_inmemory_search_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_descending_and_bounded(
            chunks in proptest::collection::vec(arb_chunk(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            max_results in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (results, unique_count) = rt.block_on(async {
                let store = InMemoryVectorStore::new();

                let mut unique: HashSet<String> = HashSet::new();
                for chunk in &chunks {
                    unique.insert(chunk.key.clone());
                    store.upsert("test", chunk.clone()).await.unwrap();
                }

                let results = store.search("test", &query, max_results).await.unwrap();
                (results, unique.len())
            });

            prop_assert!(results.len() <= max_results);
            prop_assert_eq!(results.len(), unique_count.min(max_results));

            for window in results.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "results not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
            }
        }
    }
}
