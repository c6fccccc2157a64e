//! Write retry policy
//!
//! Which catalog errors are worth retrying is an explicit enumeration
//! ([`RETRYABLE_ERRORS`]) and the decision is made by [`classify`], never by
//! matching on error strings at the call site.

use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::constants::sync::{DEFAULT_MAX_WRITE_ATTEMPTS, DEFAULT_RETRY_BACKOFF_MS};
use crate::domain::errors::CatalogError;
use crate::infrastructure::config::SyncConfig;

/// Transient failure kinds that justify retrying the same write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetryableErrorType {
    /// The peer reset the TCP connection mid-request
    ConnectionReset,
}

/// Every error kind the inventory write is retried on
pub const RETRYABLE_ERRORS: &[RetryableErrorType] = &[RetryableErrorType::ConnectionReset];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClassification {
    Transient(RetryableErrorType),
    Permanent,
}

impl ErrorClassification {
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

fn retryable_kind(error: &(dyn StdError + 'static)) -> Option<RetryableErrorType> {
    let io_error = error.downcast_ref::<io::Error>()?;
    match io_error.kind() {
        io::ErrorKind::ConnectionReset => Some(RetryableErrorType::ConnectionReset),
        _ => None,
    }
}

/// Classify a catalog error by walking its source chain.
///
/// Only transport failures can be transient; anything the platform answered
/// (validation errors, 4xx/5xx bodies) and undecodable responses are
/// permanent for this run.
pub fn classify(error: &CatalogError) -> ErrorClassification {
    let CatalogError::Transport { source, .. } = error else {
        return ErrorClassification::Permanent;
    };

    let root: &(dyn StdError + 'static) = &**source;
    std::iter::successors(Some(root), |&e| e.source())
        .find_map(retryable_kind)
        .filter(|kind| RETRYABLE_ERRORS.contains(kind))
        .map_or(ErrorClassification::Permanent, ErrorClassification::Transient)
}

/// Bounded, fixed-backoff retry for one inventory write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, initial one included
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            max_attempts: config.max_write_attempts.max(1),
            backoff: config.retry_backoff(),
        }
    }

    /// Whether attempt number `attempt` (1-based) that failed with
    /// `classification` may be followed by another one.
    pub const fn should_retry(&self, classification: ErrorClassification, attempt: u32) -> bool {
        classification.is_transient() && attempt < self.max_attempts
    }
}
