//! # pogo-core: Pure Inventory Model for Pogo Mirror
//!
//! This crate holds the inventory model that the sync layer reconciles
//! delta batches into. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pogo Mirror Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Transport (external, already decoded)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ delta batches                          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              pogo-sync (InventoryReconciler)                    │   │
//! │  │         resolve → find → notify → replace-or-append             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pogo-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  record   │  │ identity  │  │ snapshot  │  │ templates │  │   │
//! │  │   │  Record   │  │ Identity  │  │ Snapshot  │  │ Catalog   │  │   │
//! │  │   │  Kind     │  │  resolve  │  │  index    │  │   geo     │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO LOGGING • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Payload types (PlayerStats, ItemData, PokemonData, ...)
//! - [`record`] - `InventoryRecord`, `RecordKind`, wire-shaped `InventoryItemData`
//! - [`identity`] - Identity resolver (kind + identity key per record)
//! - [`snapshot`] - Ordered snapshot with an identity index
//! - [`geo`] - Coordinates and great-circle distance
//! - [`templates`] - Static template catalog lookups
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use pogo_core::identity::resolve;
//! use pogo_core::{InventoryRecord, ItemData, ItemId, RecordKind};
//!
//! let record = InventoryRecord::item(ItemData::new(ItemId(1), 5));
//! let identity = resolve(&record.payload).unwrap();
//!
//! assert_eq!(identity.kind, RecordKind::Item);
//! assert!(identity.matches(&record));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod geo;
pub mod identity;
pub mod record;
pub mod snapshot;
pub mod templates;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use geo::Coordinate;
pub use identity::{Identity, IdentityKey};
pub use record::{InventoryItemData, InventoryRecord, RecordKind, RecordPayload};
pub use snapshot::Snapshot;
pub use templates::{ItemTemplate, PokemonSettings, TemplateCatalog};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Altitude (meters) assumed when a caller only supplies latitude/longitude.
pub const DEFAULT_ALTITUDE: f64 = 100.0;

/// Mean Earth radius in meters (IUGG value) used for distance calculations.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;
