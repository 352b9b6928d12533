mod auth;
mod cli;
mod config;
mod controller;
mod error;
mod output;
mod providers;
mod schemas;
mod store;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting pipelines-exporter");
    cli.execute().await?;

    Ok(())
}
