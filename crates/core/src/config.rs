use serde::Deserialize;

use crate::types::ErrorCountPolicy;

/// Pattern creatives are audited against when a dashboard does not supply
/// its own recommended template.
pub const DEFAULT_REQUIRED_PATTERN: &str =
    "utm_source=SOURCE&utm_medium=MEDIUM&utm_campaign=CAMPAIGN&utm_content=CONTENT";

/// Root application configuration. Loaded from environment variables
/// with the prefix `UTM_AUDIT__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory the file-backed fetcher reads dashboard payloads from.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub bulk: BulkConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub error_count_policy: ErrorCountPolicy,
    #[serde(default = "default_required_pattern")]
    pub required_pattern: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkConfig {
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

// Default functions
fn default_data_dir() -> String {
    "./data".to_string()
}
fn default_required_pattern() -> String {
    DEFAULT_REQUIRED_PATTERN.to_string()
}
fn default_max_concurrent_fetches() -> usize {
    8
}
fn default_fetch_timeout_ms() -> u64 {
    30_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            error_count_policy: ErrorCountPolicy::default(),
            required_pattern: default_required_pattern(),
        }
    }
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent_fetches(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            engine: EngineConfig::default(),
            bulk: BulkConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("UTM_AUDIT")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
