//! Logging setup for the binary.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a stderr `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise debug for the lore crates with
/// `--verbose` and `info` without.
pub fn init(verbose: bool) {
    let default = if verbose { "lore_rag=debug,lore_cli=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}
