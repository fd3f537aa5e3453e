//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Semantic retrieval over local documents and code.
#[derive(Debug, Parser)]
#[command(name = "lore")]
#[command(about = "Ingest documents, index code, and ask questions with cited answers")]
#[command(version)]
pub struct Cli {
    /// JSON settings file (retrieval config and collection names)
    #[arg(long, env = "LORE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub embedder: EmbedderArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest documents, answer one query, and exit
    Ask {
        /// Plain-text documents to ingest, one chunk per non-empty line
        #[arg(long = "doc", value_name = "PATH", required = true)]
        docs: Vec<PathBuf>,

        /// Collection to ingest into and search
        #[arg(long)]
        collection: Option<String>,

        /// Maximum number of cited chunks
        #[arg(long)]
        max_results: Option<usize>,

        /// The question
        query: String,
    },

    /// Interactive session over ingested documents and indexed code
    Chat {
        /// Plain-text documents to ingest at startup
        #[arg(long = "doc", value_name = "PATH")]
        docs: Vec<PathBuf>,

        /// Repository to index into keyword memory at startup
        #[arg(long, value_name = "DIR")]
        code: Option<PathBuf>,
    },

    /// Index source files into keyword memory and optionally search them
    IndexCode {
        /// Repository root
        path: PathBuf,

        /// File extensions to index (repeatable)
        #[arg(long = "ext", value_name = "EXT")]
        extensions: Vec<String>,

        /// Case-insensitive text to look for once indexing is done
        #[arg(long)]
        find: Option<String>,
    },
}

/// Which embedding gateway to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmbedderKind {
    /// Offline feature-hashing embedder
    Hash,
    /// OpenAI-compatible HTTP endpoint (requires the `openai` feature)
    #[value(name = "openai")]
    OpenAi,
}

#[derive(Debug, Clone, Args)]
pub struct EmbedderArgs {
    /// Embedding gateway
    #[arg(long, value_enum, default_value = "hash", global = true)]
    pub embedder: EmbedderKind,

    /// Vector dimensions for the hash embedder, or requested dimensions for openai
    #[arg(long, global = true)]
    pub dimensions: Option<usize>,

    /// API key for the openai embedder
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Embeddings endpoint URL for the openai embedder
    #[arg(long, env = "LORE_EMBEDDINGS_URL", global = true)]
    pub embeddings_url: Option<String>,

    /// Model name for the openai embedder
    #[arg(long, env = "LORE_EMBEDDINGS_MODEL", global = true)]
    pub model: Option<String>,

    /// Send the key as an `api-key` header (Azure OpenAI)
    #[arg(long, global = true)]
    pub azure: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_ask_with_repeated_docs() {
        let cli = Cli::try_parse_from([
            "lore", "ask", "--doc", "a.txt", "--doc", "b.txt", "--max-results", "3", "who?",
        ])
        .unwrap();
        match cli.command {
            Command::Ask { docs, max_results, query, .. } => {
                assert_eq!(docs.len(), 2);
                assert_eq!(max_results, Some(3));
                assert_eq!(query, "who?");
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.embedder.embedder, EmbedderKind::Hash);
    }

    #[test]
    fn ask_requires_a_document() {
        assert!(Cli::try_parse_from(["lore", "ask", "who?"]).is_err());
    }
}
