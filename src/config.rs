use crate::search::{IndexMode, SearchConfig};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Managed search service configuration
    pub search: SearchConfig,

    /// Blob storage configuration
    pub storage: StorageConfig,

    /// Import pipeline configuration
    #[serde(default)]
    pub import: ImportConfig,

    /// What to do with the indexes at start-up
    #[serde(default)]
    pub startup: StartupConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: PROPERTY_SEARCH)
            .add_source(
                config::Environment::with_prefix("PROPERTY_SEARCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Configuration baked into the binary, without file or environment overrides
    pub fn embedded() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Blob service root, e.g. `https://account.blob.core.windows.net`
    pub account_url: String,

    /// Shared access signature appended to every blob request (without leading `?`)
    #[serde(default)]
    pub sas_token: String,

    /// Container holding property transaction blobs
    #[serde(default = "default_properties_container")]
    pub properties_container: String,

    /// Container holding postcode blobs
    #[serde(default = "default_postcodes_container")]
    pub postcodes_container: String,

    /// HTTP timeout for blob calls (seconds)
    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Maximum documents written per blob
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StartupIndexMode {
    /// Leave the indexes alone
    Skip,
    #[default]
    CreateIfMissing,
    ForceReset,
}

impl StartupIndexMode {
    /// Lifecycle mode to run at start-up, if any
    pub fn as_index_mode(self) -> Option<IndexMode> {
        match self {
            StartupIndexMode::Skip => None,
            StartupIndexMode::CreateIfMissing => Some(IndexMode::CreateIfMissing),
            StartupIndexMode::ForceReset => Some(IndexMode::ForceReset),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StartupConfig {
    #[serde(default)]
    pub index_mode: StartupIndexMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_upstream_timeout() -> u64 {
    30
}

fn default_properties_container() -> String {
    "properties".to_string()
}

fn default_postcodes_container() -> String {
    "postcodes".to_string()
}

fn default_batch_size() -> usize {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_parses() {
        let config = Config::embedded().unwrap();
        assert_eq!(config.server.http_port, 8080);
        assert_eq!(config.search.properties_index, "properties");
        assert_eq!(config.search.postcodes_index, "postcodes");
        assert_eq!(config.storage.properties_container, "properties");
        assert_eq!(config.import.batch_size, 1000);
        assert_eq!(config.startup.index_mode, StartupIndexMode::CreateIfMissing);
    }

    #[test]
    fn test_startup_mode_mapping() {
        assert_eq!(StartupIndexMode::Skip.as_index_mode(), None);
        assert_eq!(
            StartupIndexMode::ForceReset.as_index_mode(),
            Some(IndexMode::ForceReset)
        );
    }
}
