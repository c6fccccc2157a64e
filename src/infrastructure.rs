//! Infrastructure layer: configuration, logging, HTTP, feed acquisition and
//! parsing, and the storefront API client.

pub mod config;
pub mod feed_parser;
pub mod feed_source;
pub mod http_client;
pub mod logging;
pub mod shopify_client;

pub use config::{AppConfig, ConfigError, FeedMode};
pub use feed_parser::{FeedParser, ParseStats};
pub use feed_source::{DownloadFeedSource, FeedSource, FileFeedSource, StreamFeedSource, feed_source_from_config};
pub use http_client::HttpClient;
pub use logging::{init_logging, init_logging_with_config, log_system_info};
pub use shopify_client::ShopifyClient;
