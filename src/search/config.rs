//! Search service configuration

use serde::{Deserialize, Serialize};

/// Managed search service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Service root, e.g. `https://my-service.search.windows.net`
    pub endpoint: String,

    /// Admin API key sent as the `api-key` header
    #[serde(default)]
    pub api_key: String,

    /// REST API version sent with every request
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Name of the property transaction index
    #[serde(default = "default_properties_index")]
    pub properties_index: String,

    /// Name of the postcode lookup index
    #[serde(default = "default_postcodes_index")]
    pub postcodes_index: String,

    /// HTTP timeout for search calls (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// ISO 8601 duration between scheduled indexer runs
    #[serde(default = "default_indexer_interval")]
    pub indexer_interval: String,
}

fn default_api_version() -> String {
    "2023-11-01".to_string()
}

fn default_properties_index() -> String {
    "properties".to_string()
}

fn default_postcodes_index() -> String {
    "postcodes".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_indexer_interval() -> String {
    "PT5M".to_string()
}

impl SearchConfig {
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::new()
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://localhost.search.windows.net".to_string(),
            api_key: String::new(),
            api_version: default_api_version(),
            properties_index: default_properties_index(),
            postcodes_index: default_postcodes_index(),
            timeout_secs: default_timeout_secs(),
            indexer_interval: default_indexer_interval(),
        }
    }
}

/// Builder for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.config.api_version = version.into();
        self
    }

    pub fn properties_index(mut self, name: impl Into<String>) -> Self {
        self.config.properties_index = name.into();
        self
    }

    pub fn postcodes_index(mut self, name: impl Into<String>) -> Self {
        self.config.postcodes_index = name.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn indexer_interval(mut self, interval: impl Into<String>) -> Self {
        self.config.indexer_interval = interval.into();
        self
    }

    pub fn build(self) -> SearchConfig {
        self.config
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
