//! Storefront catalog entities
//!
//! Shapes mirror the platform's REST payloads closely enough to deserialize
//! them directly; unknown fields are ignored.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a variant's stock record. The platform sends it as a
/// number but the inventory write takes it as a string, so it is kept in
/// its string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct InventoryItemId(String);

impl InventoryItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InventoryItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for InventoryItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

/// Inventory location the feed quantities are written to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(String);

impl LocationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogVariant {
    pub id: u64,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub inventory_item_id: Option<InventoryItemId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub variants: Vec<CatalogVariant>,
}

impl CatalogItem {
    /// Inventory-tracking id of the first variant. Other variants are never
    /// consulted.
    pub fn first_inventory_item_id(&self) -> Option<&InventoryItemId> {
        self.variants.first()?.inventory_item_id.as_ref()
    }

    pub fn has_variant_with_barcode(&self, barcode: &str) -> bool {
        self.variants
            .iter()
            .any(|variant| variant.barcode.as_deref() == Some(barcode))
    }
}

/// Inventory level write sent to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryAssignment {
    pub location_id: LocationId,
    pub inventory_item_id: InventoryItemId,
    pub available: u32,
}
