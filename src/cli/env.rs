use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::rank::RankArgs;
use super::serve::ServeArgs;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Enable debug mode
    #[arg(short, long)]
    pub debug: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Metrics server port (set to 0 to disable)
    #[arg(long, default_value_t = 9090)]
    pub metrics_port: u16,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Connect to the upstream backend and answer run requests until it disconnects
    Serve(ServeArgs),

    /// Rank one request payload offline and print the response
    Rank(RankArgs),
}
