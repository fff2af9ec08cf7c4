//! `config` command handlers.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use placegrid_core::{AppConfig, ConfigFile, DEFAULT_CONFIG_FILE};

/// Sub-commands available under `config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration with the API key redacted
    Show,
    /// Store an API key in the config file
    SetApiKey {
        /// Places API key
        key: String,
    },
}

/// Print the effective configuration and the file it was read from.
pub(crate) fn run_show(explicit: Option<&Path>, config: &AppConfig) {
    match placegrid_core::resolve_config_path(explicit) {
        Some(path) => println!("config file: {}", path.display()),
        None => println!("config file: none (defaults and environment only)"),
    }
    println!("{config:#?}");
}

/// Write `key` into the config file, keeping every other setting already in it.
///
/// # Errors
///
/// Returns an error if the key is blank or the file cannot be read or written.
pub(crate) fn run_set_api_key(explicit: Option<&Path>, key: &str) -> anyhow::Result<()> {
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    let path = target_path(explicit);
    let mut file = if path.exists() {
        placegrid_core::load_config_file(&path)?
    } else {
        ConfigFile::default()
    };
    file.api.key = Some(key.to_string());
    placegrid_core::save_config_file(&path, &file)?;

    tracing::info!(path = %path.display(), "API key saved");
    println!("API key saved to {}", path.display());
    Ok(())
}

fn target_path(explicit: Option<&Path>) -> PathBuf {
    placegrid_core::resolve_config_path(explicit)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}
