//! Feed acquisition strategies
//!
//! The reconciliation core only needs a readable byte stream. Whether the
//! body is parsed from memory, saved to disk first, or read from a file
//! fetched earlier is a matter of which [`FeedSource`] is plugged in.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

use crate::domain::errors::FetchError;
use crate::infrastructure::config::{FeedConfig, FeedMode};
use crate::infrastructure::http_client::HttpClient;

#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Acquire the feed and hand back a reader positioned at the header row.
    async fn open(&self) -> Result<Box<dyn Read + Send>, FetchError>;

    /// Log-safe description of where the feed comes from
    fn describe(&self) -> String;
}

/// Build the wholesaler feed URL with its credentials as query parameters.
pub fn build_feed_url(config: &FeedConfig) -> Result<Url, FetchError> {
    Url::parse_with_params(
        &config.base_url,
        &[
            ("user_id", config.user_id.as_str()),
            ("pass", config.password.expose()),
            ("format", config.format.as_str()),
            ("language_code", config.language_code.as_str()),
        ],
    )
    .map_err(|e| FetchError::InvalidUrl {
        url: config.base_url.clone(),
        reason: e.to_string(),
    })
}

/// URL without query string or userinfo, safe to log.
pub fn redact_url(url: &Url) -> String {
    let mut redacted = url.clone();
    redacted.set_query(None);
    let _ = redacted.set_password(None);
    let _ = redacted.set_username("");
    redacted.to_string()
}

async fn get_feed(http: &HttpClient, url: &Url) -> Result<reqwest::Response, FetchError> {
    let safe_url = redact_url(url);
    info!("Starting feed download from {}", safe_url);

    let response = http
        .ready()
        .await
        .get(url.clone())
        .send()
        .await
        .map_err(|e| FetchError::Request {
            url: safe_url.clone(),
            source: e.without_url(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: safe_url,
            status: status.as_u16(),
        });
    }

    debug!("Feed endpoint answered {}", status);
    Ok(response)
}

/// Parses the response body from memory; nothing touches the disk.
pub struct StreamFeedSource {
    http: HttpClient,
    url: Url,
}

impl StreamFeedSource {
    pub const fn new(http: HttpClient, url: Url) -> Self {
        Self { http, url }
    }
}

#[async_trait]
impl FeedSource for StreamFeedSource {
    async fn open(&self) -> Result<Box<dyn Read + Send>, FetchError> {
        let response = get_feed(&self.http, &self.url).await?;
        let body = response.bytes().await.map_err(|e| FetchError::Request {
            url: redact_url(&self.url),
            source: e.without_url(),
        })?;
        info!("Feed received ({} bytes)", body.len());
        Ok(Box::new(Cursor::new(body)))
    }

    fn describe(&self) -> String {
        format!("stream {}", redact_url(&self.url))
    }
}

/// Streams the response body into a file, then parses that file.
pub struct DownloadFeedSource {
    http: HttpClient,
    url: Url,
    path: PathBuf,
}

impl DownloadFeedSource {
    pub const fn new(http: HttpClient, url: Url, path: PathBuf) -> Self {
        Self { http, url, path }
    }

    fn io_error(&self, source: std::io::Error) -> FetchError {
        FetchError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl FeedSource for DownloadFeedSource {
    async fn open(&self) -> Result<Box<dyn Read + Send>, FetchError> {
        let response = get_feed(&self.http, &self.url).await?;

        let mut file = tokio::fs::File::create(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        let mut written: u64 = 0;
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| FetchError::Request {
                url: redact_url(&self.url),
                source: e.without_url(),
            })?;
            file.write_all(&chunk).await.map_err(|e| self.io_error(e))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| self.io_error(e))?;
        drop(file);

        info!("Feed saved to {:?} ({} bytes)", self.path, written);
        open_local(&self.path)
    }

    fn describe(&self) -> String {
        format!("download {} -> {}", redact_url(&self.url), self.path.display())
    }
}

/// Reads a feed file fetched by an earlier run.
pub struct FileFeedSource {
    path: PathBuf,
}

impl FileFeedSource {
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl FeedSource for FileFeedSource {
    async fn open(&self) -> Result<Box<dyn Read + Send>, FetchError> {
        open_local(&self.path)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

fn open_local(path: &Path) -> Result<Box<dyn Read + Send>, FetchError> {
    let file = std::fs::File::open(path).map_err(|source| FetchError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Box::new(std::io::BufReader::new(file)))
}

/// Pick the acquisition strategy configured in `feed.mode`.
pub fn feed_source_from_config(
    config: &FeedConfig,
    http: &HttpClient,
) -> Result<Box<dyn FeedSource>, FetchError> {
    Ok(match config.mode {
        FeedMode::Stream => Box::new(StreamFeedSource::new(http.clone(), build_feed_url(config)?)),
        FeedMode::Download => Box::new(DownloadFeedSource::new(
            http.clone(),
            build_feed_url(config)?,
            config.download_path.clone(),
        )),
        FeedMode::File => {
            let path = config
                .local_path
                .clone()
                .ok_or(FetchError::NotConfigured { key: "feed.local_path" })?;
            Box::new(FileFeedSource::new(path))
        }
    })
}
