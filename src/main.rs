use anyhow::Context;
use clap::Parser;
use slotbid::adapter::inbound::cli::{command::Cli, run::run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // logging starts once the command has loaded its configuration
    run(cli).await.context("slotbid failed")
}
