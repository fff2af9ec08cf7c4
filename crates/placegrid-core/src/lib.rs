pub mod app_config;
pub mod cache_key;
pub mod config;
pub mod places;

pub use app_config::AppConfig;
pub use cache_key::cache_key;
pub use config::{
    build_app_config, load_app_config, load_config_file, resolve_config_path, save_config_file,
    ApiSection, ConfigFile, HttpSection, SearchSection, DEFAULT_API_BASE_URL,
    DEFAULT_CONFIG_FILE,
};
pub use places::{
    BusinessRecord, Coordinate, OpenStatus, SearchFilters, SearchRequest, ValidationError,
    MAX_PRICE_LEVEL,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to access config file {path}: {source}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    FileParse(#[source] serde_yaml::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
