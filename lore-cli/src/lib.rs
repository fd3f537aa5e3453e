//! # lore-cli
//!
//! The `lore` command: ingest plain-text documents, index a repository's
//! code into keyword memory, and answer questions with cited chunks.
//!
//! ```text
//! lore ask --doc story.txt "where do they meet?"
//! lore index-code . --find "fn main"
//! lore chat --doc story.txt --code .
//! ```

pub mod app;
pub mod cli;
pub mod repl;
pub mod settings;
pub mod telemetry;

pub use app::{App, build_embedder, run};
pub use cli::{Cli, Command, EmbedderArgs, EmbedderKind};
pub use settings::Settings;
