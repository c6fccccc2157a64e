//! Feed-to-inventory reconciliation loop
//!
//! Items are handled strictly one after another in feed order. Every
//! per-item failure is contained here; the loop always reaches the end of
//! the feed.

use std::sync::Arc;

use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::application::outcome::{AbandonReason, ItemOutcome, ItemState, SkipReason};
use crate::application::pacing::Pacing;
use crate::application::retry_policy::{RetryPolicy, classify};
use crate::application::summary::RunSummary;
use crate::domain::catalog::{InventoryAssignment, LocationId};
use crate::domain::repositories::CatalogClient;
use crate::domain::stock_update::StockUpdate;

pub struct StockReconciler<C: ?Sized> {
    catalog: Arc<C>,
    location_id: LocationId,
    pacing: Pacing,
    retry_policy: RetryPolicy,
}

impl<C: CatalogClient + ?Sized> StockReconciler<C> {
    pub fn new(catalog: Arc<C>, location_id: LocationId) -> Self {
        Self {
            catalog,
            location_id,
            pacing: Pacing::default(),
            retry_policy: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub const fn location_id(&self) -> &LocationId {
        &self.location_id
    }

    /// Process every update in order, pausing after each one.
    ///
    /// The returned summary is not finished; the caller adds the parse
    /// statistics once the feed is exhausted.
    pub async fn reconcile<I>(&self, updates: I) -> RunSummary
    where
        I: IntoIterator<Item = StockUpdate>,
    {
        let mut summary = RunSummary::start();
        info!("Reconciliation run {} started (location {})", summary.run_id, self.location_id);

        for (index, update) in updates.into_iter().enumerate() {
            let span = info_span!("item", index, ean = %update.barcode());
            let outcome = self.process(&update).instrument(span).await;
            summary.record(&outcome);

            let delay = self.pacing.pause().await;
            debug!("Paused {:?} after item {}", delay, index);
        }

        summary
    }

    /// Drive one update to a terminal state.
    pub async fn process(&self, update: &StockUpdate) -> ItemOutcome {
        let barcode = update.barcode();
        info!("📦 Syncing stock for EAN: {}, Stock: {}", barcode, update.quantity());
        debug!(state = ?ItemState::Pending);

        let items = match self.catalog.find_items_by_barcode(barcode).await {
            Ok(items) => items,
            Err(e) => {
                let diagnostic = e.diagnostic();
                error!("❌ Error looking up EAN {}: {}", barcode, diagnostic);
                return ItemOutcome::Abandoned {
                    reason: AbandonReason::LookupFailed,
                    attempts: 0,
                    diagnostic,
                };
            }
        };
        debug!(state = ?ItemState::LookedUp, matches = items.len());

        let Some(item) = items.first() else {
            warn!("⚠️ No product found with barcode: {}", barcode);
            return ItemOutcome::Skipped {
                reason: SkipReason::NoCatalogMatch,
            };
        };
        if items.len() > 1 {
            debug!("{} catalog items share barcode {}; using product {}", items.len(), barcode, item.id);
        }

        let Some(inventory_item_id) = item.first_inventory_item_id() else {
            warn!("⚠️ No valid inventory_item_id found for product with barcode: {}", barcode);
            return ItemOutcome::Skipped {
                reason: SkipReason::MissingInventoryItem,
            };
        };
        debug!(state = ?ItemState::Resolved, inventory_item_id = %inventory_item_id);

        let assignment = InventoryAssignment {
            location_id: self.location_id.clone(),
            inventory_item_id: inventory_item_id.clone(),
            available: update.quantity(),
        };
        self.write_with_retry(barcode, &assignment).await
    }

    async fn write_with_retry(&self, barcode: &str, assignment: &InventoryAssignment) -> ItemOutcome {
        let mut attempt = 1;
        loop {
            let e = match self.catalog.set_inventory_level(assignment).await {
                Ok(()) => {
                    info!("✅ Stock updated for EAN {} -> {}", barcode, assignment.available);
                    return ItemOutcome::Written { attempts: attempt };
                }
                Err(e) => e,
            };

            let classification = classify(&e);
            if self.retry_policy.should_retry(classification, attempt) {
                warn!(
                    "🔁 {:?} on EAN {}, retrying in {:?} (attempt {}/{})",
                    classification,
                    barcode,
                    self.retry_policy.backoff,
                    attempt,
                    self.retry_policy.max_attempts
                );
                tokio::time::sleep(self.retry_policy.backoff).await;
                attempt += 1;
                continue;
            }

            let reason = if classification.is_transient() {
                AbandonReason::RetriesExhausted
            } else {
                AbandonReason::WriteRejected
            };
            let diagnostic = e.diagnostic();
            error!(
                "❌ Error updating stock for EAN {} after {} attempt(s): {}",
                barcode, attempt, diagnostic
            );
            return ItemOutcome::Abandoned {
                reason,
                attempts: attempt,
                diagnostic,
            };
        }
    }
}
