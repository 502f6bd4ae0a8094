//! Chat widget terminal host
//!
//! Reads one message per line from stdin and prints the transcript as
//! replies arrive.

use anyhow::Context;
use chat_widget::config::{AppConfig, Cli};
use chat_widget::{telemetry, terminal};
use clap::Parser;
use dotenvy::dotenv;
use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let cli = Cli::parse();
    let config = AppConfig::from_cli(&cli).context("Configuration error")?;

    telemetry::init(&config.logging);

    terminal::run(&config, cli.html_out.as_deref()).await
}
