//! Application layer: the reconciliation loop and the policies around it.

pub mod outcome;
pub mod pacing;
pub mod reconciliation;
pub mod retry_policy;
pub mod summary;
pub mod sync_service;

pub use outcome::{AbandonReason, ItemOutcome, ItemState, SkipReason};
pub use pacing::Pacing;
pub use reconciliation::StockReconciler;
pub use retry_policy::{ErrorClassification, RETRYABLE_ERRORS, RetryPolicy, RetryableErrorType, classify};
pub use summary::RunSummary;
pub use sync_service::SyncService;
