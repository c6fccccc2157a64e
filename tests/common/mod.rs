//! Scripted in-memory catalog shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tokio::time::Instant;
use tracing_subscriber::fmt::MakeWriter;

use stock_sync_lib::domain::{
    CatalogClient, CatalogError, CatalogItem, CatalogVariant, ErrorPayload, InventoryAssignment,
    InventoryItemId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Lookup(String),
    Write(InventoryAssignment),
}

#[derive(Debug, Clone, Copy)]
pub enum WriteFailure {
    /// Every write resets the connection
    AlwaysReset,
    /// The first `n` writes reset the connection, later ones succeed
    ResetTimes(u32),
    /// The platform answers 422 with a JSON error body
    Rejected,
    /// The connection is refused (not retryable)
    Refused,
}

#[derive(Default)]
pub struct FakeCatalog {
    items: HashMap<String, Vec<CatalogItem>>,
    lookup_failures: Vec<String>,
    write_failures: HashMap<String, WriteFailure>,
    writes_seen: Mutex<HashMap<String, u32>>,
    calls: Mutex<Vec<(Instant, Call)>>,
}

pub fn item(id: u64, barcode: &str, inventory_item_id: Option<&str>) -> CatalogItem {
    CatalogItem {
        id,
        title: Some(format!("Product {id}")),
        variants: vec![CatalogVariant {
            id: id * 10,
            barcode: Some(barcode.to_string()),
            inventory_item_id: inventory_item_id.map(InventoryItemId::new),
        }],
    }
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_item(mut self, barcode: &str, inventory_item_id: &str) -> Self {
        let id = self.items.len() as u64 + 1;
        self.items
            .entry(barcode.to_string())
            .or_default()
            .push(item(id, barcode, Some(inventory_item_id)));
        self
    }

    #[must_use]
    pub fn with_catalog_item(mut self, barcode: &str, catalog_item: CatalogItem) -> Self {
        self.items.entry(barcode.to_string()).or_default().push(catalog_item);
        self
    }

    #[must_use]
    pub fn with_lookup_failure(mut self, barcode: &str) -> Self {
        self.lookup_failures.push(barcode.to_string());
        self
    }

    #[must_use]
    pub fn with_write_failure(mut self, inventory_item_id: &str, failure: WriteFailure) -> Self {
        self.write_failures.insert(inventory_item_id.to_string(), failure);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().iter().map(|(_, call)| call.clone()).collect()
    }

    pub fn timed_calls(&self) -> Vec<(Instant, Call)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<InventoryAssignment> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Write(assignment) => Some(assignment),
                Call::Lookup(_) => None,
            })
            .collect()
    }

    pub fn write_times(&self) -> Vec<Instant> {
        self.timed_calls()
            .into_iter()
            .filter(|(_, call)| matches!(call, Call::Write(_)))
            .map(|(at, _)| at)
            .collect()
    }

    pub fn lookup_times(&self) -> Vec<Instant> {
        self.timed_calls()
            .into_iter()
            .filter(|(_, call)| matches!(call, Call::Lookup(_)))
            .map(|(at, _)| at)
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push((Instant::now(), call));
    }
}

fn reset() -> CatalogError {
    CatalogError::transport("set inventory level", io::Error::from(io::ErrorKind::ConnectionReset))
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn find_items_by_barcode(&self, barcode: &str) -> Result<Vec<CatalogItem>, CatalogError> {
        self.record(Call::Lookup(barcode.to_string()));
        if self.lookup_failures.iter().any(|b| b == barcode) {
            return Err(CatalogError::Api {
                operation: "find items by barcode",
                status: 401,
                payload: ErrorPayload::Json(json!({"errors": "[API] Invalid API key or access token"})),
            });
        }
        Ok(self.items.get(barcode).cloned().unwrap_or_default())
    }

    async fn set_inventory_level(&self, assignment: &InventoryAssignment) -> Result<(), CatalogError> {
        self.record(Call::Write(assignment.clone()));

        let key = assignment.inventory_item_id.as_str().to_string();
        let seen = {
            let mut writes = self.writes_seen.lock().unwrap();
            let counter = writes.entry(key.clone()).or_insert(0);
            *counter += 1;
            *counter
        };

        match self.write_failures.get(&key) {
            None => Ok(()),
            Some(WriteFailure::AlwaysReset) => Err(reset()),
            Some(WriteFailure::ResetTimes(n)) if seen <= *n => Err(reset()),
            Some(WriteFailure::ResetTimes(_)) => Ok(()),
            Some(WriteFailure::Rejected) => Err(CatalogError::Api {
                operation: "set inventory level",
                status: 422,
                payload: ErrorPayload::Json(json!({"errors": ["Inventory item does not have inventory tracking enabled"]})),
            }),
            Some(WriteFailure::Refused) => Err(CatalogError::transport(
                "set inventory level",
                io::Error::from(io::ErrorKind::ConnectionRefused),
            )),
        }
    }
}

/// Debug-level log output collected in memory for the current thread.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(self.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
