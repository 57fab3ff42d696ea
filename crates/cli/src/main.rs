//! eightify CLI entry point

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod args;
mod commands;
mod config;
mod server;

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // --log-level, then RUST_LOG, then general.log_level
    let configured_level = config::AppConfig::load(cli.config.as_deref())
        .map(|c| c.general.log_level)
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.log_level.as_deref(), &configured_level)?;

    // Execute command
    match cli.command {
        Commands::Serve(args) => commands::serve::execute(args, cli.config).await,
        Commands::Summarize(args) => commands::summarize::execute(args, cli.config).await,
        Commands::Comments(args) => commands::comments::execute(args, cli.config).await,
        Commands::Config(args) => commands::config::execute(args, cli.config).await,
        Commands::Doctor(args) => commands::doctor::execute(args, cli.config).await,
    }
}

fn init_logging(cli_level: Option<&str>, configured_level: &str) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(configured_level))?,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}
