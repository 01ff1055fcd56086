// ABOUTME: Entry point for the piper-provision plugin binary.
// ABOUTME: Parses flags/environment, sets up logging, and serves host callbacks.

use anyhow::{Context, Result};
use clap::Parser;
use piper::{PluginArgs, PluginConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = PluginConfig::try_from(PluginArgs::parse()).context("Invalid configuration")?;

    match &config.log_file {
        Some(path) => piper_log::init_file(path),
        None => piper_log::init(),
    }

    piper::run(config).await
}
