mod config_cmd;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config_cmd::ConfigCommands;
use crate::search::SearchArgs;

#[derive(Debug, Parser)]
#[command(name = "placegrid")]
#[command(about = "Find every business in an area by searching it as a grid")]
struct Cli {
    /// YAML config file (defaults to $PLACEGRID_CONFIG, then ./placegrid.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search an area for businesses and export the results as JSON
    Search(SearchArgs),
    /// Inspect or update the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = placegrid_core::load_app_config(cli.config.as_deref());
    let log_level = config
        .as_ref()
        .map_or_else(|_| "info".to_string(), |c| c.log_level.clone());
    init_tracing(&log_level)?;

    match cli.command {
        Commands::Search(args) => {
            let config = config.map_err(|e| anyhow::anyhow!("failed to load config: {e}"))?;
            search::run_search(&args, &config).await
        }
        Commands::Config {
            command: ConfigCommands::Show,
        } => {
            let config = config.map_err(|e| anyhow::anyhow!("failed to load config: {e}"))?;
            config_cmd::run_show(cli.config.as_deref(), &config);
            Ok(())
        }
        Commands::Config {
            command: ConfigCommands::SetApiKey { key },
        } => config_cmd::run_set_api_key(cli.config.as_deref(), &key),
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
/// Logs go to stderr so JSON results on stdout stay clean.
fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
