//! Feed rows and the validated stock updates built from them

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::constants::feed::{EAN_COLUMN, STOCK_COLUMN};
use crate::domain::errors::ParseValidationError;

/// One raw feed row keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedRecord {
    /// 1-based position among data rows (the header is not counted)
    pub row: u64,
    pub fields: HashMap<String, String>,
}

impl FeedRecord {
    pub fn new(row: u64, fields: HashMap<String, String>) -> Self {
        Self { row, fields }
    }

    /// Field by exact, case-sensitive header name
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    fn require(&self, column: &str) -> Result<&str, ParseValidationError> {
        self.get(column)
            .ok_or_else(|| ParseValidationError::MissingColumn {
                row: self.row,
                column: column.to_string(),
            })
    }
}

/// Validated unit of work: set the stock of `barcode` to `quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockUpdate {
    barcode: String,
    quantity: u32,
}

impl StockUpdate {
    /// Validate a barcode/raw stock pair coming from feed row `row`.
    pub fn parse(row: u64, barcode: &str, raw_stock: &str) -> Result<Self, ParseValidationError> {
        if barcode.trim().is_empty() {
            return Err(ParseValidationError::EmptyBarcode {
                row,
                raw: barcode.to_string(),
            });
        }

        let stock: i64 = raw_stock
            .trim()
            .parse()
            .map_err(|_| ParseValidationError::InvalidStock {
                row,
                raw: raw_stock.to_string(),
            })?;
        if stock < 0 {
            return Err(ParseValidationError::NegativeStock {
                row,
                raw: raw_stock.to_string(),
            });
        }
        let quantity = u32::try_from(stock).map_err(|_| ParseValidationError::InvalidStock {
            row,
            raw: raw_stock.to_string(),
        })?;

        Ok(Self {
            barcode: barcode.to_string(),
            quantity,
        })
    }

    pub fn from_record(record: &FeedRecord) -> Result<Self, ParseValidationError> {
        let barcode = record.require(EAN_COLUMN)?;
        let stock = record.require(STOCK_COLUMN)?;
        Self::parse(record.row, barcode, stock)
    }

    pub fn barcode(&self) -> &str {
        &self.barcode
    }

    pub const fn quantity(&self) -> u32 {
        self.quantity
    }
}
