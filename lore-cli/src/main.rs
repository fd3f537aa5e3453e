use clap::Parser;
use lore_cli::{Cli, run, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);
    run(cli).await
}
