//! `;`-delimited feed parser
//!
//! Turns the feed byte stream into a lazy sequence of [`StockUpdate`]s.
//! Rows that fail validation are logged and skipped; the sequence only ends
//! early when the underlying reader itself fails.

use std::collections::HashMap;
use std::io::Read;

use csv::{ErrorKind, ReaderBuilder, StringRecord, StringRecordsIntoIter};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::domain::constants::feed::DELIMITER;
use crate::domain::errors::ParseValidationError;
use crate::domain::stock_update::{FeedRecord, StockUpdate};

/// Row counters for one pass over the feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub rows_read: u64,
    pub rows_accepted: u64,
    pub rows_rejected: u64,
    /// Set when the reader failed and the remaining rows were never seen
    pub truncated: bool,
}

pub struct FeedParser<R: Read> {
    headers: Option<StringRecord>,
    records: StringRecordsIntoIter<R>,
    stats: ParseStats,
    done: bool,
}

impl<R: Read> FeedParser<R> {
    pub fn new(reader: R) -> Self {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut stats = ParseStats::default();
        let headers = match csv_reader.headers() {
            Ok(headers) => Some(headers.clone()),
            Err(e) => {
                error!("Failed to read feed header row: {}", e);
                stats.truncated = true;
                None
            }
        };
        let done = headers.is_none();

        Self {
            headers,
            records: csv_reader.into_records(),
            stats,
            done,
        }
    }

    pub const fn stats(&self) -> ParseStats {
        self.stats
    }

    fn to_feed_record(headers: &StringRecord, row: u64, record: &StringRecord) -> FeedRecord {
        let fields: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        FeedRecord::new(row, fields)
    }

    fn reject(&mut self, error: &ParseValidationError) {
        self.stats.rows_rejected += 1;
        match error.field() {
            Some(field) => warn!("⚠️ Skipping row ({} failed): {}", field, error),
            None => warn!("⚠️ Skipping row: {}", error),
        }
    }
}

impl<R: Read> Iterator for FeedParser<R> {
    type Item = StockUpdate;

    fn next(&mut self) -> Option<StockUpdate> {
        if self.done {
            return None;
        }

        loop {
            let Some(next) = self.records.next() else {
                self.done = true;
                return None;
            };
            self.stats.rows_read += 1;
            let row = self.stats.rows_read;

            let record = match next {
                Ok(record) => record,
                Err(e) if matches!(e.kind(), ErrorKind::Io(_)) => {
                    error!("Feed stream failed after {} rows: {}", row - 1, e);
                    self.stats.rows_read -= 1;
                    self.stats.truncated = true;
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.reject(&ParseValidationError::MalformedRow {
                        row,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let Some(headers) = self.headers.as_ref() else {
                self.done = true;
                return None;
            };
            let feed_record = Self::to_feed_record(headers, row, &record);
            debug!("Row received: {:?}", feed_record.fields);

            match StockUpdate::from_record(&feed_record) {
                Ok(update) => {
                    self.stats.rows_accepted += 1;
                    return Some(update);
                }
                Err(error) => self.reject(&error),
            }
        }
    }
}
