//! Run summary

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::application::outcome::{ItemOutcome, SkipReason};
use crate::infrastructure::feed_parser::ParseStats;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub parse: ParseStats,
    pub written: u64,
    pub skipped_no_match: u64,
    pub skipped_no_inventory_item: u64,
    pub abandoned: u64,
    /// Write attempts beyond the first one, summed over all items
    pub write_retries: u64,
}

impl RunSummary {
    pub fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            parse: ParseStats::default(),
            written: 0,
            skipped_no_match: 0,
            skipped_no_inventory_item: 0,
            abandoned: 0,
            write_retries: 0,
        }
    }

    pub fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Written { .. } => self.written += 1,
            ItemOutcome::Skipped {
                reason: SkipReason::NoCatalogMatch,
            } => self.skipped_no_match += 1,
            ItemOutcome::Skipped {
                reason: SkipReason::MissingInventoryItem,
            } => self.skipped_no_inventory_item += 1,
            ItemOutcome::Abandoned { .. } => self.abandoned += 1,
        }
        self.write_retries += u64::from(outcome.write_attempts().saturating_sub(1));
    }

    pub fn finish(&mut self, parse: ParseStats) {
        self.parse = parse;
        self.finished_at = Some(Utc::now());
    }

    pub const fn items_processed(&self) -> u64 {
        self.written + self.skipped_no_match + self.skipped_no_inventory_item + self.abandoned
    }
}
