//! Composition root: wires the embedder, stores and pipeline from arguments
//! and settings, and runs each subcommand.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use lore_rag::{
    CodeIndexer, Document, EmbeddingProvider, HashEmbedder, InMemoryVectorStore, IndexSummary,
    KeywordStore, RagPipeline,
};
use tracing::info;

use crate::cli::{Cli, Command, EmbedderArgs, EmbedderKind};
use crate::repl;
use crate::settings::{DEFAULT_HASH_DIMENSIONS, Settings};

/// Shared state for one process.
pub struct App {
    pub settings: Settings,
    pub pipeline: Arc<RagPipeline>,
    pub memory: Arc<KeywordStore>,
}

impl App {
    /// Build the pipeline over a fresh in-memory store.
    pub fn new(settings: Settings, embedder: Arc<dyn EmbeddingProvider>) -> anyhow::Result<Self> {
        let pipeline = RagPipeline::builder()
            .config(settings.rag.clone())
            .embedding_provider(embedder)
            .vector_store(Arc::new(InMemoryVectorStore::with_metric(settings.rag.metric)))
            .build()
            .context("building retrieval pipeline")?;

        Ok(Self { settings, pipeline: Arc::new(pipeline), memory: Arc::new(KeywordStore::new()) })
    }

    /// Read each path and ingest it into `collection`, in argument order.
    pub async fn ingest_paths(&self, collection: &str, paths: &[PathBuf]) -> anyhow::Result<usize> {
        let documents = paths
            .iter()
            .map(|path| {
                Document::from_path(path).with_context(|| format!("loading {}", path.display()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let report = self.pipeline.ingest_documents(collection, &documents).await?;
        info!(
            collection,
            documents = documents.len(),
            chunks = report.chunk_count(),
            "documents ingested"
        );
        Ok(report.chunk_count())
    }

    /// Window the repository at `root` into the code collection.
    pub async fn index_code(
        &self,
        root: &Path,
        extensions: &[String],
    ) -> anyhow::Result<IndexSummary> {
        let extensions = if extensions.is_empty() {
            self.settings.code_extensions.as_slice()
        } else {
            extensions
        };
        let indexer =
            CodeIndexer::new(self.settings.rag.window_size)?.with_extensions(extensions.iter());
        let summary = indexer
            .index_into_keywords(root, &self.memory, &self.settings.code_collection)
            .await?;
        Ok(summary)
    }
}

/// Pick the embedding gateway named on the command line.
pub fn build_embedder(args: &EmbedderArgs) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    match args.embedder {
        EmbedderKind::Hash => {
            let dimensions = args.dimensions.unwrap_or(DEFAULT_HASH_DIMENSIONS);
            Ok(Arc::new(HashEmbedder::new(dimensions)?))
        }
        EmbedderKind::OpenAi => build_openai(args),
    }
}

#[cfg(feature = "openai")]
fn build_openai(args: &EmbedderArgs) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    use lore_rag::OpenAIEmbeddingProvider;
    use lore_rag::openai::AuthScheme;

    let Some(api_key) = args.api_key.as_deref() else {
        bail!("--embedder openai needs --api-key or OPENAI_API_KEY");
    };
    let mut provider = OpenAIEmbeddingProvider::new(api_key)?;
    if let Some(url) = &args.embeddings_url {
        provider = provider.with_url(url);
    }
    if let Some(model) = &args.model {
        provider = provider.with_model(model);
    }
    if let Some(dimensions) = args.dimensions {
        provider = provider.with_dimensions(dimensions);
    }
    if args.azure {
        provider = provider.with_auth(AuthScheme::ApiKeyHeader);
    }
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "openai"))]
fn build_openai(_args: &EmbedderArgs) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    bail!("this build of lore has no openai support; rebuild with `--features openai`")
}

/// Run the parsed command line to completion.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load_or_default(cli.config.as_deref())?;
    let embedder = build_embedder(&cli.embedder)?;
    info!(embedder = embedder.name(), dimensions = embedder.dimensions(), "embedder ready");
    let app = App::new(settings, embedder)?;

    match cli.command {
        Command::Ask { docs, collection, max_results, query } => {
            let collection =
                collection.unwrap_or_else(|| app.settings.document_collection.clone());
            app.ingest_paths(&collection, &docs).await?;
            let answer = app.pipeline.retrieve(&collection, &query, max_results).await?;
            println!("{answer}");
        }
        Command::Chat { docs, code } => {
            let collection = app.settings.document_collection.clone();
            if !docs.is_empty() {
                let chunks = app.ingest_paths(&collection, &docs).await?;
                println!("Ingested {chunks} chunks into '{collection}'.");
            }
            if let Some(root) = code {
                let summary = app.index_code(&root, &[]).await?;
                println!(
                    "Indexed {} files ({} windows) into '{}'.",
                    summary.files, summary.chunks, app.settings.code_collection
                );
            }
            repl::run(&app, &collection).await?;
        }
        Command::IndexCode { path, extensions, find } => {
            let summary = app.index_code(&path, &extensions).await?;
            println!(
                "Indexed {} files ({} windows) into '{}'.",
                summary.files, summary.chunks, app.settings.code_collection
            );
            if let Some(query) = find {
                println!("{}", app.memory.search(&app.settings.code_collection, &query).await);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lore_rag::Lookup;

    fn hash_app() -> App {
        let args = EmbedderArgs {
            embedder: EmbedderKind::Hash,
            dimensions: Some(256),
            api_key: None,
            embeddings_url: None,
            model: None,
            azure: false,
        };
        App::new(Settings::default(), build_embedder(&args).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn ask_flow_cites_the_matching_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.txt");
        std::fs::write(&path, "They met at a small cafe in Paris.\n\nThe rain never stopped.")
            .unwrap();

        let app = hash_app();
        assert_eq!(app.ingest_paths("loveStory", &[path]).await.unwrap(), 2);

        let answer =
            app.pipeline.retrieve("loveStory", "small cafe in Paris", Some(1)).await.unwrap();
        let citation = &answer.citations()[0];
        assert_eq!(citation.document_name, "story.txt");
        assert_eq!(citation.key, "story.txt_1");
    }

    #[tokio::test]
    async fn missing_document_fails_before_ingesting() {
        let app = hash_app();
        let err = app
            .ingest_paths("docs", &[PathBuf::from("/definitely/not/here.txt")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("loading"));
        assert!(app.pipeline.vector_store().collections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn index_code_uses_configured_collection() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.rs"), "fn main() {}\n").unwrap();
        std::fs::write(dir.path().join("notes.md"), "not code\n").unwrap();

        let app = hash_app();
        let summary = app.index_code(dir.path(), &[]).await.unwrap();
        assert_eq!(summary, IndexSummary { files: 1, chunks: 1 });

        let lookup = app.memory.retrieve("CODEBASE", "main.rs-chunk-0").await;
        assert!(matches!(lookup, Lookup::Found { .. }));
    }

    #[cfg(not(feature = "openai"))]
    #[test]
    fn openai_without_feature_is_an_error() {
        let args = EmbedderArgs {
            embedder: EmbedderKind::OpenAi,
            dimensions: None,
            api_key: Some("sk-test".into()),
            embeddings_url: None,
            model: None,
            azure: false,
        };
        assert!(build_embedder(&args).is_err());
    }
}
