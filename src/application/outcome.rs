//! Per-item states of the reconciliation loop
//!
//! `Pending → LookedUp → Resolved → Written` on the happy path; an item
//! leaves early as `Skipped` (nothing to update) or `Abandoned` (an update
//! was due but could not be made).

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    Pending,
    LookedUp,
    Resolved,
    Written,
    Skipped,
    Abandoned,
}

impl ItemState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Written | Self::Skipped | Self::Abandoned)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The barcode matched no catalog item
    NoCatalogMatch,
    /// The first variant of the first match has no inventory item id
    MissingInventoryItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbandonReason {
    LookupFailed,
    WriteRejected,
    RetriesExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ItemOutcome {
    Written {
        attempts: u32,
    },
    Skipped {
        reason: SkipReason,
    },
    Abandoned {
        reason: AbandonReason,
        /// Write attempts made; 0 when the lookup already failed
        attempts: u32,
        diagnostic: String,
    },
}

impl ItemOutcome {
    pub const fn state(&self) -> ItemState {
        match self {
            Self::Written { .. } => ItemState::Written,
            Self::Skipped { .. } => ItemState::Skipped,
            Self::Abandoned { .. } => ItemState::Abandoned,
        }
    }

    pub const fn write_attempts(&self) -> u32 {
        match self {
            Self::Written { attempts } | Self::Abandoned { attempts, .. } => *attempts,
            Self::Skipped { .. } => 0,
        }
    }
}
