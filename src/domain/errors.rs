//! Error types for feed acquisition, row validation and catalog calls
//!
//! Only [`FetchError`] aborts a run. Validation errors drop a single row and
//! catalog errors abandon a single item.

use std::fmt;

use thiserror::Error;

/// The feed could not be acquired. Fatal to the run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Feed request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Feed endpoint {url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid feed URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Feed source is not configured: {key} must be set")]
    NotConfigured { key: &'static str },

    #[error("Feed file I/O failed at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A feed row that cannot become a `StockUpdate`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseValidationError {
    #[error("Row {row}: column '{column}' is missing")]
    MissingColumn { row: u64, column: String },

    #[error("Row {row}: invalid EAN - EAN: '{raw}'")]
    EmptyBarcode { row: u64, raw: String },

    #[error("Row {row}: invalid stock - Stock: '{raw}'")]
    InvalidStock { row: u64, raw: String },

    #[error("Row {row}: negative stock - Stock: '{raw}'")]
    NegativeStock { row: u64, raw: String },

    #[error("Row {row}: malformed record: {reason}")]
    MalformedRow { row: u64, reason: String },
}

impl ParseValidationError {
    /// Feed column the failure is attributed to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingColumn { column, .. } => Some(column),
            Self::EmptyBarcode { .. } => Some(crate::domain::constants::feed::EAN_COLUMN),
            Self::InvalidStock { .. } | Self::NegativeStock { .. } => {
                Some(crate::domain::constants::feed::STOCK_COLUMN)
            }
            Self::MalformedRow { .. } => None,
        }
    }

    /// 1-based data row position
    pub const fn row(&self) -> u64 {
        match self {
            Self::MissingColumn { row, .. }
            | Self::EmptyBarcode { row, .. }
            | Self::InvalidStock { row, .. }
            | Self::NegativeStock { row, .. }
            | Self::MalformedRow { row, .. } => *row,
        }
    }
}

/// Error body returned by the catalog platform, kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorPayload {
    Json(serde_json::Value),
    Text(String),
    Empty,
}

impl ErrorPayload {
    /// Keep a JSON body structured, fall back to the raw text.
    pub fn from_body(body: &str) -> Self {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        serde_json::from_str::<serde_json::Value>(trimmed).map_or_else(|_| Self::Text(trimmed.to_string()), Self::Json)
    }
}

impl fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
            Self::Empty => f.write_str("<empty body>"),
        }
    }
}

/// Failure of a catalog lookup or inventory write.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{operation} transport error: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{operation} rejected with status {status}: {payload}")]
    Api {
        operation: &'static str,
        status: u16,
        payload: ErrorPayload,
    },

    #[error("{operation} returned an undecodable response: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },
}

impl CatalogError {
    pub fn transport<E>(operation: &'static str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            operation,
            source: Box::new(source),
        }
    }

    /// Most informative description available: the platform's error body
    /// when there is one, the error message otherwise.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Api {
                payload: payload @ (ErrorPayload::Json(_) | ErrorPayload::Text(_)),
                ..
            } => payload.to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_prefers_structured_json() {
        let payload = ErrorPayload::from_body(r#"{"errors":{"available":["must be a number"]}}"#);
        assert_eq!(
            payload,
            ErrorPayload::Json(json!({"errors": {"available": ["must be a number"]}}))
        );
    }

    #[test]
    fn payload_falls_back_to_text_and_empty() {
        assert_eq!(
            ErrorPayload::from_body("Bad Gateway"),
            ErrorPayload::Text("Bad Gateway".to_string())
        );
        assert_eq!(ErrorPayload::from_body("  \n"), ErrorPayload::Empty);
    }

    #[test]
    fn diagnostic_surfaces_body_verbatim() {
        let error = CatalogError::Api {
            operation: "set inventory level",
            status: 422,
            payload: ErrorPayload::Json(json!({"errors": "Inventory item does not exist"})),
        };
        assert_eq!(error.diagnostic(), r#"{"errors":"Inventory item does not exist"}"#);

        let empty = CatalogError::Api {
            operation: "set inventory level",
            status: 502,
            payload: ErrorPayload::Empty,
        };
        assert!(empty.diagnostic().contains("status 502"));
    }

    #[test]
    fn validation_error_names_failing_field() {
        let error = ParseValidationError::InvalidStock {
            row: 3,
            raw: "abc".to_string(),
        };
        assert_eq!(error.field(), Some("stock"));
        assert_eq!(error.row(), 3);
        assert!(error.to_string().contains("'abc'"));
    }
}
