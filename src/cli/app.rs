use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use super::context::CliContext;
use super::env::{CliArgs, Commands};
use super::rank::cmd_rank;
use super::runtime::{init_logging, load_config, LoadedConfig};
use super::serve::cmd_serve;

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();

    init_logging(&cli.log_level, cli.debug, cli.log_json)?;

    info!("Starting ZeroWaste v{}", env!("CARGO_PKG_VERSION"));

    let LoadedConfig { mut config, path } = load_config(cli.config.as_ref()).await?;
    config.apply_env()?;
    let cli_context = CliContext::new(config, path, cli.metrics_port);

    let result = match cli.command.clone() {
        Commands::Serve(args) => cmd_serve(args, &cli_context).await,
        Commands::Rank(args) => cmd_rank(args, &cli_context).await,
    };

    match result {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {:#}", err);
            Err(err)
        }
    }
}
