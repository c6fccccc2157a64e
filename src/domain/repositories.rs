//! Port to the storefront catalog
//!
//! The reconciliation loop only talks to this trait; the Shopify client in
//! the infrastructure layer is the production implementation.

use async_trait::async_trait;

use crate::domain::catalog::{CatalogItem, InventoryAssignment};
use crate::domain::errors::CatalogError;

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Catalog items carrying `barcode`, in platform order.
    async fn find_items_by_barcode(&self, barcode: &str) -> Result<Vec<CatalogItem>, CatalogError>;

    /// Set the available quantity of one inventory item at one location.
    async fn set_inventory_level(&self, assignment: &InventoryAssignment) -> Result<(), CatalogError>;
}
