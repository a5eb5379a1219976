//! bagport CLI entry point.

mod app;
mod config;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Structured logging; quiet by default so prompts stay readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = app::Args::parse();
    let config = config::Config::load()?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(app::run(args, config))
}
