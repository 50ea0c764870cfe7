//! # Delta Envelope
//!
//! The shape in which an already-decoding transport hands over one delta
//! batch.
//!
//! ## Envelope
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  InventoryDelta                                                         │
//! │  ├── original_timestamp_ms   (client's previous sync point)            │
//! │  ├── new_timestamp_ms        (server time of this batch)               │
//! │  └── inventory_items[]                                                 │
//! │        ├── modified_timestamp_ms                                       │
//! │        └── inventory_item_data { player_stats | item | ... }           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## JSON Form
//! Used for fixtures and the `replay` tool. The remote protocol's own wire
//! encoding is decoded by the transport before anything reaches this crate.
//! ```json
//! {
//!   "new_timestamp_ms": 1468000000000,
//!   "inventory_items": [
//!     { "modified_timestamp_ms": 1468000000000,
//!       "inventory_item_data": { "item": { "item_id": 1, "count": 5 } } }
//!   ]
//! }
//! ```

use pogo_core::{InventoryItemData, InventoryRecord};
use serde::{Deserialize, Serialize};

use crate::error::SyncResult;

/// One record as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(default)]
    pub modified_timestamp_ms: i64,

    #[serde(default)]
    pub inventory_item_data: InventoryItemData,
}

impl From<InventoryItem> for InventoryRecord {
    fn from(item: InventoryItem) -> Self {
        InventoryRecord::new(item.inventory_item_data.into_payload()).at(item.modified_timestamp_ms)
    }
}

/// One delta batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InventoryDelta {
    #[serde(default)]
    pub original_timestamp_ms: i64,

    /// Server timestamp of this batch; 0 when the transport did not supply one.
    #[serde(default)]
    pub new_timestamp_ms: i64,

    #[serde(default)]
    pub inventory_items: Vec<InventoryItem>,
}

impl InventoryDelta {
    pub fn from_json(json: &str) -> SyncResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decodes a JSON array of batches (the replay file format).
    pub fn batches_from_json(json: &str) -> SyncResult<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> SyncResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Classified records in arrival order.
    pub fn records(&self) -> Vec<InventoryRecord> {
        self.inventory_items
            .iter()
            .cloned()
            .map(InventoryRecord::from)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inventory_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inventory_items.is_empty()
    }
}
