//! Jittered pause between items
//!
//! Keeps the request rate against the storefront API under its limits. The
//! pause is applied after every item whatever its outcome.

use std::time::Duration;

use crate::infrastructure::config::SyncConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    base: Duration,
    jitter: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self::from_config(&SyncConfig::default())
    }
}

impl Pacing {
    pub const fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    pub const fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.pacing_base(), config.pacing_jitter())
    }

    /// Pause length drawn from `[base, base + jitter)`
    pub fn sample(&self) -> Duration {
        let jitter_ms = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        if jitter_ms == 0 {
            return self.base;
        }
        self.base + Duration::from_millis(fastrand::u64(0..jitter_ms))
    }

    pub async fn pause(&self) -> Duration {
        let delay = self.sample();
        tokio::time::sleep(delay).await;
        delay
    }
}
