//! Domain module - feed rows, stock updates and the storefront catalog
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod catalog;
pub mod constants;
pub mod errors;
pub mod repositories;
pub mod stock_update;

pub use catalog::{CatalogItem, CatalogVariant, InventoryAssignment, InventoryItemId, LocationId};
pub use errors::{CatalogError, ErrorPayload, FetchError, ParseValidationError};
pub use repositories::CatalogClient;
pub use stock_update::{FeedRecord, StockUpdate};
