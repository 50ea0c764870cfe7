//! # pogo-sync: Delta Reconciliation Engine for Pogo Mirror
//!
//! This crate keeps a local mirror of an account inventory current by
//! folding server delta batches into a [`pogo_core::Snapshot`].
//!
//! ## Reconciliation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Delta Reconciliation                             │
//! │                                                                         │
//! │  Transport (decoded)                                                   │
//! │       │                                                                 │
//! │       │ InventoryDelta { new_timestamp_ms, inventory_items[] }         │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  InventoryReconciler                            │   │
//! │  │                                                                 │   │
//! │  │   for each record:                                              │   │
//! │  │     resolve identity ──► find existing ──► ChangeEvent ──►      │   │
//! │  │     replace payload in place  |  append new record              │   │
//! │  │                                                                 │   │
//! │  │   after the batch: record timestamp, notify update observers   │   │
//! │  └───────────────┬──────────────────────────────┬──────────────────┘   │
//! │                  │ per-record                   │ per-batch            │
//! │                  ▼                              ▼                      │
//! │     InventoryObserver (sync)          UpdateObserver (sync)            │
//! │     BroadcastObserver (tokio)                                          │
//! │     PlayerStatsTracker                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`reconciler`] - The merge engine and its builder
//! - [`notifier`] - Observer registries, change events, broadcast bridge
//! - [`protocol`] - Delta envelope handed over by the transport
//! - [`player`] - Player stats tracker and location cache
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Sync error types
//!
//! ## Example
//!
//! ```rust
//! use pogo_sync::{InventoryReconciler, MirrorConfig};
//! use pogo_core::{InventoryRecord, ItemData, ItemId};
//!
//! let config = MirrorConfig::default();
//! let reconciler = InventoryReconciler::builder()
//!     .with_settings(&config.inventory)
//!     .build();
//!
//! reconciler.apply(&[InventoryRecord::item(ItemData::new(ItemId(1), 5))]);
//! let summary = reconciler.apply(&[InventoryRecord::item(ItemData::new(ItemId(1), 9))]);
//!
//! assert_eq!(summary.updated, 1);
//! assert_eq!(reconciler.snapshot().item_count(ItemId(1)), 9);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod notifier;
pub mod player;
pub mod protocol;
pub mod reconciler;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{InventorySettings, LocationSettings, MirrorConfig, SessionSettings};
pub use error::{SyncError, SyncResult};
pub use notifier::{
    BroadcastObserver, ChangeEvent, ChangeNotifier, InventoryChange, InventoryObserver,
    SubscriptionId, UpdateObserver,
};
pub use player::{LocationStore, Player, PlayerStatsTracker};
pub use protocol::{InventoryDelta, InventoryItem};
pub use reconciler::{BatchStamp, BatchSummary, InventoryReconciler, ReconcileStats, ReconcilerBuilder};
