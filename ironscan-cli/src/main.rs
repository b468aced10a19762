//! Ironscan CLI -- enumerate a Nessus plugin catalog from the command line.
//!
//! Exit codes: 0 success, 1 command failure, 2 configuration error,
//! 3 scanner error, 10 I/O error.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;

use ironscan_core::config::GeneralConfig;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);
    let config = commands::load_config(&cli.config, cli.log_level.as_deref()).await;

    // 설정이 깨져 있어도 로깅은 켜서 원인을 남긴다
    let general = match &config {
        Ok(config) => config.general.clone(),
        Err(_) => GeneralConfig {
            log_level: cli.log_level.clone().unwrap_or_else(|| "warn".to_owned()),
            ..GeneralConfig::default()
        },
    };
    logging::init_tracing(&general).map_err(|e| CliError::Config(e.to_string()))?;

    tracing::debug!(config = %cli.config.display(), "ironscan starting");

    match cli.command {
        Commands::Families => commands::families::execute(&config?, &writer).await,
        Commands::Plugins(args) => commands::plugins::execute(args, &config?, &writer).await,
        Commands::Plugin(args) => commands::plugin::execute(args, &config?, &writer).await,
        Commands::Server => commands::server::execute(&config?, &writer).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    }
}
