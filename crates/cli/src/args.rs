//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// eightify: summarize YouTube videos and surface insights from their comments
#[derive(Parser, Debug)]
#[command(name = "eightify")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),

    /// Summarize a video into key points
    Summarize(SummarizeArgs),

    /// Cluster a video's comments into topics
    Comments(CommentsArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides server.bind_addr)
    #[arg(long)]
    pub bind_addr: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// Video URL or 11-character ID
    pub video: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CommentsArgs {
    /// Video URL or 11-character ID
    pub video: String,

    /// What you want to learn from the comments
    #[arg(long)]
    pub insight: Option<String>,

    /// Summarize the video first and give the summary to the model as context
    #[arg(long)]
    pub with_summary: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
