//! Configuration infrastructure
//!
//! Configuration is layered, lowest precedence first:
//! 1. Built-in defaults (`AppConfig::default()`)
//! 2. Optional config file (`$STOCK_SYNC_CONFIG`, `./stock-sync.toml`, or
//!    `<config dir>/stock-sync/config.toml`)
//! 3. `STOCK_SYNC_<SECTION>__<KEY>` environment variables
//! 4. The plain variables the job has always read (`SHOPIFY_ACCESS_TOKEN`,
//!    `SHOPIFY_LOCATION_ID`, ...)
//!
//! Credentials never have a default; a run without them is refused.

#![allow(clippy::uninlined_format_args)]

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::domain::constants::{feed, shopify, sync};

/// File-name stem looked up in the working directory
pub const LOCAL_CONFIG_STEM: &str = "stock-sync";

/// Environment prefix for layered overrides
pub const ENV_PREFIX: &str = "STOCK_SYNC";

/// Explicit config file path
pub const CONFIG_PATH_VAR: &str = "STOCK_SYNC_CONFIG";

/// Plain environment variables mapped onto config keys
const LEGACY_ENV_KEYS: [(&str, &str); 5] = [
    ("SHOPIFY_ACCESS_TOKEN", "shopify.access_token"),
    ("SHOPIFY_LOCATION_ID", "shopify.location_id"),
    ("SHOPIFY_SHOP_NAME", "shopify.shop_name"),
    ("FEED_USER_ID", "feed.user_id"),
    ("FEED_PASSWORD", "feed.password"),
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// String whose value must never reach a log line.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Secret(<unset>)")
        } else {
            f.write_str("Secret(***)")
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub shopify: ShopifyConfig,
    pub sync: SyncConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

/// How the feed is acquired before parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    /// Parse the HTTP body straight from memory
    #[default]
    Stream,
    /// Save the HTTP body to `download_path`, then parse the file
    Download,
    /// Parse an already downloaded file at `local_path`
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub base_url: String,
    pub user_id: String,
    pub password: Secret,
    pub format: String,
    pub language_code: String,
    pub mode: FeedMode,
    pub download_path: PathBuf,
    pub local_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopifyConfig {
    /// Shop subdomain (`<shop_name>.myshopify.com`)
    pub shop_name: String,
    pub api_version: String,
    pub access_token: Secret,
    pub location_id: String,
    /// Full Admin API base URL; overrides `shop_name` when set
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub pacing_base_ms: u64,
    pub pacing_jitter_ms: u64,
    pub retry_backoff_ms: u64,
    pub max_write_attempts: u32,
}

impl SyncConfig {
    pub const fn pacing_base(&self) -> Duration {
        Duration::from_millis(self.pacing_base_ms)
    }

    pub const fn pacing_jitter(&self) -> Duration {
        Duration::from_millis(self.pacing_jitter_ms)
    }

    pub const fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    /// Per-request timeout; `None` leaves the transport default in place
    pub timeout_seconds: Option<u64>,
    pub max_requests_per_second: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Write JSON lines to the log file
    pub json_format: bool,

    pub console_output: bool,

    pub file_output: bool,

    /// Log directory; defaults to `logs/` next to the executable
    pub directory: Option<PathBuf>,

    pub file_name: String,

    /// Number of log files to keep (older files will be deleted)
    pub max_files: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: feed::DEFAULT_BASE_URL.to_string(),
            user_id: String::new(),
            password: Secret::default(),
            format: feed::DEFAULT_FORMAT.to_string(),
            language_code: feed::DEFAULT_LANGUAGE_CODE.to_string(),
            mode: FeedMode::Stream,
            download_path: PathBuf::from("feed.csv"),
            local_path: None,
        }
    }
}

impl Default for ShopifyConfig {
    fn default() -> Self {
        Self {
            shop_name: String::new(),
            api_version: shopify::DEFAULT_API_VERSION.to_string(),
            access_token: Secret::default(),
            location_id: String::new(),
            base_url: None,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            pacing_base_ms: sync::DEFAULT_PACING_BASE_MS,
            pacing_jitter_ms: sync::DEFAULT_PACING_JITTER_MS,
            retry_backoff_ms: sync::DEFAULT_RETRY_BACKOFF_MS,
            max_write_attempts: sync::DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("stock-sync/{}", env!("CARGO_PKG_VERSION")),
            timeout_seconds: None,
            max_requests_per_second: shopify::DEFAULT_MAX_REQUESTS_PER_SECOND,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            console_output: true,
            file_output: true,
            directory: None,
            file_name: "stock-sync.log".to_string(),
            max_files: 10,
        }
    }
}

impl AppConfig {
    /// Load from the process environment and the default file locations.
    pub fn load() -> Result<Self, ConfigError> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::load_from(&env, None)
    }

    /// Load with an explicit environment map and optional config file.
    pub fn load_from(
        env: &HashMap<String, String>,
        file: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?);

        match file.or_else(|| env.get(CONFIG_PATH_VAR).map(PathBuf::from)) {
            Some(path) => {
                info!("Loading configuration file: {:?}", path);
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                builder = builder.add_source(config::File::with_name(LOCAL_CONFIG_STEM).required(false));
                if let Some(dir) = dirs::config_dir() {
                    builder = builder.add_source(
                        config::File::from(dir.join("stock-sync").join("config")).required(false),
                    );
                }
            }
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .source(Some(env.clone())),
        );

        for (var, key) in LEGACY_ENV_KEYS {
            builder = builder.set_override_option(key, env.get(var).cloned())?;
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations a run cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| {
            Err(ConfigError::Validation {
                message: message.to_string(),
            })
        };

        if self.shopify.access_token.is_empty() {
            return invalid("shopify.access_token is required (SHOPIFY_ACCESS_TOKEN)");
        }
        if self.shopify.location_id.trim().is_empty() {
            return invalid("shopify.location_id is required (SHOPIFY_LOCATION_ID)");
        }
        if self.shopify.shop_name.trim().is_empty() && self.shopify.base_url.is_none() {
            return invalid("shopify.shop_name or shopify.base_url is required");
        }

        match self.feed.mode {
            FeedMode::Stream | FeedMode::Download => {
                if self.feed.user_id.trim().is_empty() || self.feed.password.is_empty() {
                    return invalid("feed.user_id and feed.password are required (FEED_USER_ID, FEED_PASSWORD)");
                }
            }
            FeedMode::File => {
                if self.feed.local_path.is_none() {
                    return invalid("feed.local_path is required when feed.mode = \"file\"");
                }
            }
        }

        if self.sync.max_write_attempts == 0 {
            return invalid("sync.max_write_attempts must be greater than 0");
        }
        if self.http.max_requests_per_second == 0 {
            return invalid("http.max_requests_per_second must be greater than 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn complete_env() -> HashMap<String, String> {
        env(&[
            ("SHOPIFY_ACCESS_TOKEN", "shpat_test"),
            ("SHOPIFY_LOCATION_ID", "655441491"),
            ("SHOPIFY_SHOP_NAME", "demo-shop"),
            ("FEED_USER_ID", "1000"),
            ("FEED_PASSWORD", "hunter2"),
        ])
    }

    fn empty_config_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "# empty").unwrap();
        file
    }

    #[test]
    fn defaults_match_reconciliation_policy() {
        let config = AppConfig::default();
        assert_eq!(config.sync.pacing_base(), Duration::from_millis(500));
        assert_eq!(config.sync.pacing_jitter(), Duration::from_millis(200));
        assert_eq!(config.sync.retry_backoff(), Duration::from_millis(3000));
        assert_eq!(config.sync.max_write_attempts, 3);
        assert_eq!(config.feed.mode, FeedMode::Stream);
        assert!(config.http.timeout_seconds.is_none());
    }

    #[test]
    fn plain_environment_variables_are_honoured() {
        let file = empty_config_file();
        let config = AppConfig::load_from(&complete_env(), Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.shopify.access_token.expose(), "shpat_test");
        assert_eq!(config.shopify.location_id, "655441491");
        assert_eq!(config.feed.user_id, "1000");
    }

    #[test]
    fn prefixed_environment_overrides_nested_keys() {
        let file = empty_config_file();
        let mut vars = complete_env();
        vars.insert("STOCK_SYNC_SYNC__PACING_BASE_MS".to_string(), "50".to_string());
        vars.insert("STOCK_SYNC_FEED__MODE".to_string(), "download".to_string());
        let config = AppConfig::load_from(&vars, Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.sync.pacing_base_ms, 50);
        assert_eq!(config.feed.mode, FeedMode::Download);
    }

    #[test]
    fn config_file_values_are_loaded() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[sync]\nretry_backoff_ms = 10\n\n[logging]\nfile_output = false").unwrap();
        let config = AppConfig::load_from(&complete_env(), Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.sync.retry_backoff_ms, 10);
        assert!(!config.logging.file_output);
    }

    #[test]
    fn missing_access_token_is_fatal() {
        let file = empty_config_file();
        let mut vars = complete_env();
        vars.remove("SHOPIFY_ACCESS_TOKEN");
        let error = AppConfig::load_from(&vars, Some(file.path().to_path_buf())).unwrap_err();
        assert!(matches!(error, ConfigError::Validation { .. }));
        assert!(error.to_string().contains("access_token"));
    }

    #[test]
    fn file_mode_needs_no_feed_credentials() {
        let mut config = AppConfig::default();
        config.shopify.access_token = Secret::new("token");
        config.shopify.location_id = "1".to_string();
        config.shopify.shop_name = "demo".to_string();
        config.feed.mode = FeedMode::File;
        assert!(config.validate().is_err());
        config.feed.local_path = Some(PathBuf::from("feed.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let mut config = AppConfig::default();
        config.shopify.access_token = Secret::new("shpat_very_secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("shpat_very_secret"));
        assert!(rendered.contains("Secret(***)"));
    }
}
