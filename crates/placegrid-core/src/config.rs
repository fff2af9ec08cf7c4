use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "placegrid.yaml";

pub const DEFAULT_API_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place/";
pub const DEFAULT_SUB_RADIUS: f64 = 3_000.0;
pub const DEFAULT_MIN_SUB_RADIUS: f64 = 500.0;
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// On-disk YAML configuration. Every field is optional; environment
/// variables override whatever the file sets.
///
/// ```yaml
/// api:
///   key: AIza...
/// search:
///   sub_radius: 3500
///   max_workers: 6
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub api: ApiSection,
    pub search: SearchSection,
    pub http: HttpSection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_sub_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adaptive_sub_radius: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_backoff_base_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_delay_ms: Option<u64>,
}

/// Load application configuration from the config file and environment.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
/// The file is `path` when given, else `$PLACEGRID_CONFIG`, else
/// [`DEFAULT_CONFIG_FILE`] if it exists. A missing default file is not an error.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed, or if any
/// value is invalid.
pub fn load_app_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    let file = match resolve_config_path(path) {
        Some(path) => load_config_file(&path)?,
        None => ConfigFile::default(),
    };
    build_app_config(&file, |key| std::env::var(key))
}

/// Pick the config file to read, if any.
#[must_use]
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var("PLACEGRID_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    default.exists().then_some(default)
}

/// Read and parse a YAML config file.
///
/// # Errors
///
/// Returns `ConfigError::FileIo` or `ConfigError::FileParse`.
pub fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    // An empty file deserializes to unit, not a mapping.
    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str(&content).map_err(ConfigError::FileParse)
}

/// Write `file` as YAML to `path`, creating parent directories.
///
/// # Errors
///
/// Returns `ConfigError::FileIo` on filesystem failure or
/// `ConfigError::FileParse` if serialization fails.
pub fn save_config_file(path: &Path, file: &ConfigFile) -> Result<(), ConfigError> {
    let io_err = |e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let yaml = serde_yaml::to_string(file).map_err(ConfigError::FileParse)?;
    std::fs::write(path, yaml).map_err(io_err)
}

/// Build application configuration from a parsed file and an env-var lookup.
///
/// Precedence is env var, then file, then built-in default. Decoupled from
/// the real environment so it can be tested with a `HashMap` lookup.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unparseable env values and
/// `ConfigError::Validation` for out-of-range settings.
pub fn build_app_config<F>(file: &ConfigFile, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let string = |var: &str, from_file: Option<&String>, default: &str| -> String {
        lookup(var)
            .ok()
            .or_else(|| from_file.cloned())
            .unwrap_or_else(|| default.to_string())
    };

    let api_key = lookup("GOOGLE_API_KEY")
        .ok()
        .or_else(|| file.api.key.clone())
        .filter(|k| !k.trim().is_empty());
    let api_base_url = string(
        "PLACEGRID_API_BASE_URL",
        file.api.base_url.as_ref(),
        DEFAULT_API_BASE_URL,
    );
    let log_level = string("PLACEGRID_LOG_LEVEL", file.log_level.as_ref(), "info");
    let user_agent = string(
        "PLACEGRID_USER_AGENT",
        file.http.user_agent.as_ref(),
        "placegrid/0.1",
    );

    let search = &file.search;
    let http = &file.http;
    let sub_radius = parse_var(&lookup, "PLACEGRID_SUB_RADIUS")?
        .or(search.sub_radius)
        .unwrap_or(DEFAULT_SUB_RADIUS);
    let min_sub_radius = parse_var(&lookup, "PLACEGRID_MIN_SUB_RADIUS")?
        .or(search.min_sub_radius)
        .unwrap_or(DEFAULT_MIN_SUB_RADIUS);
    let max_workers = parse_var(&lookup, "PLACEGRID_MAX_WORKERS")?
        .or(search.max_workers)
        .unwrap_or(DEFAULT_MAX_WORKERS);
    let adaptive_sub_radius = parse_bool_var(&lookup, "PLACEGRID_ADAPTIVE_SUB_RADIUS")?
        .or(search.adaptive_sub_radius)
        .unwrap_or(false);
    let request_timeout_secs = parse_var(&lookup, "PLACEGRID_REQUEST_TIMEOUT_SECS")?
        .or(http.timeout_secs)
        .unwrap_or(30);
    let max_retries = parse_var(&lookup, "PLACEGRID_MAX_RETRIES")?
        .or(http.max_retries)
        .unwrap_or(2);
    let retry_backoff_base_secs = parse_var(&lookup, "PLACEGRID_RETRY_BACKOFF_BASE_SECS")?
        .or(http.retry_backoff_base_secs)
        .unwrap_or(2);
    let page_delay_ms = parse_var(&lookup, "PLACEGRID_PAGE_DELAY_MS")?
        .or(http.page_delay_ms)
        .unwrap_or(200);
    let next_page_delay_ms = parse_var(&lookup, "PLACEGRID_NEXT_PAGE_DELAY_MS")?
        .or(http.next_page_delay_ms)
        .unwrap_or(2_000);
    let detail_delay_ms = parse_var(&lookup, "PLACEGRID_DETAIL_DELAY_MS")?
        .or(http.detail_delay_ms)
        .unwrap_or(200);

    for (name, value) in [("sub_radius", sub_radius), ("min_sub_radius", min_sub_radius)] {
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "{name} must be a positive number of metres, got {value}"
            )));
        }
    }
    if max_workers == 0 {
        return Err(ConfigError::Validation(
            "max_workers must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        api_key,
        api_base_url,
        log_level,
        sub_radius,
        min_sub_radius,
        max_workers,
        adaptive_sub_radius,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        page_delay_ms,
        next_page_delay_ms,
        detail_delay_ms,
    })
}

/// Parse an optional env var with `FromStr`. Absent → `Ok(None)`.
fn parse_var<T, F>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    match lookup(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

/// Like [`parse_var`] but also accepts `1/0`, `yes/no`, `on/off`.
fn parse_bool_var<F>(lookup: &F, var: &str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let Ok(raw) = lookup(var) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
