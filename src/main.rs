use anyhow::Context;
use clap::Parser;
use mesoplot::cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).await.context("mesoplot run failed")
}
