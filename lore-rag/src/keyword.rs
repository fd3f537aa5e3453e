//! Keyword memory store: an embedding-free fallback.
//!
//! [`KeywordStore`] maps collection → key → text. Collection names and keys
//! are compared case-insensitively, and [`KeywordStore::search`] does a
//! case-insensitive substring match. Absence is reported through
//! [`Lookup::NotFound`] and empty [`Matches`], never through an error.
//!
//! Each collection has its own lock, mirroring [`InMemoryVectorStore`](crate::InMemoryVectorStore).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

/// Rendered when a search finds nothing.
pub const NO_MATCHES: &str = "No matches found.";

#[derive(Debug)]
struct Memory {
    seq: u64,
    key: String,
    text: String,
}

#[derive(Debug, Default)]
struct MemoryCollection {
    next_seq: u64,
    entries: HashMap<String, Memory>,
}

/// Confirmation returned by [`KeywordStore::save`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Saved {
    /// Collection name as given by the caller.
    pub collection: String,
    /// Key as given by the caller.
    pub key: String,
}

impl fmt::Display for Saved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Saved chunk '{}' to collection '{}'.", self.key, self.collection)
    }
}

/// Outcome of [`KeywordStore::retrieve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Lookup {
    /// The stored text.
    Found {
        /// Text saved under the key.
        text: String,
    },
    /// The collection or the key does not exist.
    NotFound {
        /// Collection that was searched.
        collection: String,
        /// Key that was requested.
        key: String,
    },
}

impl Lookup {
    /// The text, if found.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Found { text } => Some(text),
            Self::NotFound { .. } => None,
        }
    }

    /// Consume into the text, if found.
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Found { text } => Some(text),
            Self::NotFound { .. } => None,
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found { text } => f.write_str(text),
            Self::NotFound { collection, key } => {
                write!(f, "No entry for key '{key}' in '{collection}'.")
            }
        }
    }
}

/// Outcome of [`KeywordStore::search`]: matching texts in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Matches(pub Vec<String>);

impl Matches {
    /// Whether nothing matched.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of matching texts.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the matching texts.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for Matches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str(NO_MATCHES);
        }
        for (i, text) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "- {text}")?;
        }
        Ok(())
    }
}

/// In-process keyword memory shared by every caller that holds it.
#[derive(Debug, Default)]
pub struct KeywordStore {
    collections: RwLock<HashMap<String, Arc<RwLock<MemoryCollection>>>>,
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}

impl KeywordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn get(&self, collection: &str) -> Option<Arc<RwLock<MemoryCollection>>> {
        self.collections.read().await.get(&fold(collection)).cloned()
    }

    /// Store `text` under `key`, creating the collection if needed.
    /// An existing entry for the same key is replaced.
    pub async fn save(&self, collection: &str, key: &str, text: &str) -> Saved {
        let handle = match self.get(collection).await {
            Some(handle) => handle,
            None => self.collections.write().await.entry(fold(collection)).or_default().clone(),
        };

        let mut guard = handle.write().await;
        let memories = &mut *guard;
        let folded = fold(key);
        match memories.entries.get_mut(&folded) {
            Some(memory) => {
                memory.key = key.to_string();
                memory.text = text.to_string();
            }
            None => {
                let seq = memories.next_seq;
                memories.next_seq += 1;
                memories
                    .entries
                    .insert(folded, Memory { seq, key: key.to_string(), text: text.to_string() });
            }
        }
        debug!(collection, key, "saved keyword memory");

        Saved { collection: collection.to_string(), key: key.to_string() }
    }

    /// Fetch the text saved under `key`.
    pub async fn retrieve(&self, collection: &str, key: &str) -> Lookup {
        let not_found =
            || Lookup::NotFound { collection: collection.to_string(), key: key.to_string() };
        let Some(handle) = self.get(collection).await else {
            return not_found();
        };
        let guard = handle.read().await;
        match guard.entries.get(&fold(key)) {
            Some(memory) => Lookup::Found { text: memory.text.clone() },
            None => not_found(),
        }
    }

    /// Every text in `collection` containing `query`, ignoring case.
    pub async fn search(&self, collection: &str, query: &str) -> Matches {
        let Some(handle) = self.get(collection).await else {
            return Matches::default();
        };
        let needle = query.to_lowercase();
        let guard = handle.read().await;
        let mut hits: Vec<&Memory> =
            guard.entries.values().filter(|m| m.text.to_lowercase().contains(&needle)).collect();
        hits.sort_by_key(|m| m.seq);
        Matches(hits.into_iter().map(|m| m.text.clone()).collect())
    }

    /// Remove `key`. Returns whether an entry was removed.
    pub async fn delete(&self, collection: &str, key: &str) -> bool {
        match self.get(collection).await {
            Some(handle) => handle.write().await.entries.remove(&fold(key)).is_some(),
            None => false,
        }
    }

    /// Keys stored in `collection`, in insertion order, with original casing.
    pub async fn keys(&self, collection: &str) -> Vec<String> {
        let Some(handle) = self.get(collection).await else {
            return Vec::new();
        };
        let guard = handle.read().await;
        let mut memories: Vec<&Memory> = guard.entries.values().collect();
        memories.sort_by_key(|m| m.seq);
        memories.into_iter().map(|m| m.key.clone()).collect()
    }

    /// Folded (lowercase) names of all collections, sorted.
    pub async fn collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_retrieve_round_trips() {
        let store = KeywordStore::new();
        let saved = store.save("docs", "k1", "hello world").await;
        assert_eq!(saved.to_string(), "Saved chunk 'k1' to collection 'docs'.");

        let found = store.retrieve("docs", "k1").await;
        assert_eq!(found.text(), Some("hello world"));
    }

    #[tokio::test]
    async fn missing_key_or_collection_is_a_value() {
        let store = KeywordStore::new();
        store.save("docs", "k1", "hello world").await;

        let missing = store.retrieve("docs", "missing").await;
        assert!(matches!(missing, Lookup::NotFound { .. }));
        assert_eq!(missing.to_string(), "No entry for key 'missing' in 'docs'.");

        assert!(store.retrieve("other", "k1").await.text().is_none());
    }

    #[tokio::test]
    async fn collection_and_key_ignore_case() {
        let store = KeywordStore::new();
        store.save("Docs", "Key", "first").await;
        store.save("DOCS", "KEY", "second").await;

        assert_eq!(store.retrieve("docs", "key").await.into_text().as_deref(), Some("second"));
        assert_eq!(store.keys("docs").await, ["KEY"]);
        assert_eq!(store.collections().await, ["docs"]);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring_in_insertion_order() {
        let store = KeywordStore::new();
        store.save("docs", "k1", "Hello World").await;
        store.save("docs", "k2", "goodbye").await;
        store.save("docs", "k3", "say HELLO again").await;

        let matches = store.search("docs", "hello").await;
        assert_eq!(matches.len(), 2);
        assert_eq!(matches.to_string(), "- Hello World\n- say HELLO again");
    }

    #[tokio::test]
    async fn empty_search_renders_sentinel() {
        let store = KeywordStore::new();
        store.save("docs", "k1", "Hello World").await;

        assert!(store.search("docs", "absent").await.is_empty());
        assert_eq!(store.search("nowhere", "hello").await.to_string(), NO_MATCHES);
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let store = KeywordStore::new();
        store.save("docs", "k1", "text").await;
        assert!(store.delete("DOCS", "K1").await);
        assert!(!store.delete("docs", "k1").await);
        assert!(store.search("docs", "text").await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_saves_lose_no_updates() {
        let store = Arc::new(KeywordStore::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.save("shared", &format!("k{i}"), &format!("value {i}")).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.keys("shared").await.len(), 32);
        assert_eq!(store.search("shared", "value").await.len(), 32);
    }
}
