//! Shared HTTP client with a request-rate ceiling
//!
//! Both the feed download and the catalog calls go through this client so a
//! single `reqwest` connection pool and a single token bucket are used.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, direct::NotKeyed},
};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, USER_AGENT},
};

use crate::infrastructure::config::HttpConfig;

/// Cheap to clone; clones share the pool and the rate limiter.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    config: HttpConfig,
}

impl HttpClient {
    pub fn new(config: HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );

        let mut builder = Client::builder().default_headers(headers);
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.max_requests_per_second)
                .context("Rate limit must be greater than 0")?,
        );

        Ok(Self {
            client,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            config,
        })
    }

    /// Underlying client, after waiting for a rate-limit permit.
    pub async fn ready(&self) -> &Client {
        self.rate_limiter.until_ready().await;
        &self.client
    }

    pub const fn config(&self) -> &HttpConfig {
        &self.config
    }
}
