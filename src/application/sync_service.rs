//! One sync run: acquire the feed, parse it, reconcile it

use tracing::{debug, info};

use crate::application::reconciliation::StockReconciler;
use crate::application::summary::RunSummary;
use crate::domain::errors::FetchError;
use crate::domain::repositories::CatalogClient;
use crate::infrastructure::feed_parser::FeedParser;
use crate::infrastructure::feed_source::FeedSource;

pub struct SyncService<C: ?Sized> {
    feed: Box<dyn FeedSource>,
    reconciler: StockReconciler<C>,
}

impl<C: CatalogClient + ?Sized> SyncService<C> {
    pub fn new(feed: Box<dyn FeedSource>, reconciler: StockReconciler<C>) -> Self {
        Self { feed, reconciler }
    }

    /// Run once over the whole feed.
    ///
    /// Only a failure to acquire the feed is returned as an error; everything
    /// that goes wrong for individual rows or items ends up in the summary.
    pub async fn run(&self) -> Result<RunSummary, FetchError> {
        info!("Starting feed acquisition: {}", self.feed.describe());
        let reader = self.feed.open().await?;

        let mut parser = FeedParser::new(reader);
        let mut summary = self.reconciler.reconcile(parser.by_ref()).await;
        summary.finish(parser.stats());

        let parse = summary.parse;
        info!(
            "✅ Feed processed: {} rows read, {} valid, {} rejected{}",
            parse.rows_read,
            parse.rows_accepted,
            parse.rows_rejected,
            if parse.truncated { " (stream ended early)" } else { "" }
        );
        info!(
            "Run {} finished: {} written, {} without catalog match, {} without inventory item, {} abandoned, {} write retries",
            summary.run_id,
            summary.written,
            summary.skipped_no_match,
            summary.skipped_no_inventory_item,
            summary.abandoned,
            summary.write_retries
        );
        if let Ok(json) = serde_json::to_string(&summary) {
            debug!("Run summary: {}", json);
        }

        Ok(summary)
    }
}
