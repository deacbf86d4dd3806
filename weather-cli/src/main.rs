//! Binary crate for the `weather` dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration and suggestion picking
//! - Human-friendly output formatting

use clap::Parser;
use weather_core::logging;

mod cli;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    logging::init(&cmd.log_level)?;
    cmd.run().await
}
