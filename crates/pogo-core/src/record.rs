//! # Inventory Records
//!
//! A record is one inventory entry carrying exactly one variant payload.
//!
//! ## Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Wire Shape → Tagged Payload                          │
//! │                                                                         │
//! │  InventoryItemData (one Option per payload, as decoded)                │
//! │      │                                                                  │
//! │      ▼  into_payload(): first populated field wins, fixed order        │
//! │                                                                         │
//! │  1. player_stats     → RecordPayload::PlayerStats                      │
//! │  2. item             → RecordPayload::Item                             │
//! │  3. pokedex_entry    → RecordPayload::PokedexEntry                     │
//! │  4. pokemon_data     → RecordPayload::PokemonData                      │
//! │  5. pokemon_family   → RecordPayload::PokemonFamily                    │
//! │  6. player_currency  → RecordPayload::PlayerCurrency                   │
//! │  7. egg_incubators   → RecordPayload::EggIncubators                    │
//! │  8. applied_items    → RecordPayload::AppliedItems                     │
//! │  (nothing)           → RecordPayload::Unknown   (skipped on merge)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Fields the decoder knows about but this model does not (e.g. newer
//! protocol additions) are ignored during deserialization, so such records
//! classify as Unknown instead of failing.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{
    AppliedItems, EggIncubators, ItemData, PlayerCurrency, PlayerStats, PokedexEntry,
    PokemonData, PokemonFamily,
};

// =============================================================================
// Record Kind
// =============================================================================

/// The closed set of record variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    PlayerStats,
    Item,
    PokedexEntry,
    PokemonData,
    PokemonFamily,
    PlayerCurrency,
    EggIncubators,
    AppliedItems,
}

impl RecordKind {
    /// All kinds in classification priority order.
    pub const ALL: [RecordKind; 8] = [
        RecordKind::PlayerStats,
        RecordKind::Item,
        RecordKind::PokedexEntry,
        RecordKind::PokemonData,
        RecordKind::PokemonFamily,
        RecordKind::PlayerCurrency,
        RecordKind::EggIncubators,
        RecordKind::AppliedItems,
    ];

    /// Returns true for kinds held at most once per snapshot.
    pub const fn is_singleton(&self) -> bool {
        matches!(
            self,
            RecordKind::PlayerStats
                | RecordKind::PlayerCurrency
                | RecordKind::EggIncubators
                | RecordKind::AppliedItems
        )
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            RecordKind::PlayerStats => "player_stats",
            RecordKind::Item => "item",
            RecordKind::PokedexEntry => "pokedex_entry",
            RecordKind::PokemonData => "pokemon_data",
            RecordKind::PokemonFamily => "pokemon_family",
            RecordKind::PlayerCurrency => "player_currency",
            RecordKind::EggIncubators => "egg_incubators",
            RecordKind::AppliedItems => "applied_items",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Record Payload (Tagged Union)
// =============================================================================

/// Variant payload of a record.
///
/// Adding a variant here forces every `match` over it (kind, identity) to be
/// updated at compile time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum RecordPayload {
    PlayerStats(PlayerStats),
    Item(ItemData),
    PokedexEntry(PokedexEntry),
    PokemonData(PokemonData),
    PokemonFamily(PokemonFamily),
    PlayerCurrency(PlayerCurrency),
    EggIncubators(EggIncubators),
    AppliedItems(AppliedItems),
    /// No recognised payload was populated.
    Unknown,
}

impl RecordPayload {
    /// Returns the record kind, or `None` for [`RecordPayload::Unknown`].
    pub fn kind(&self) -> Option<RecordKind> {
        match self {
            RecordPayload::PlayerStats(_) => Some(RecordKind::PlayerStats),
            RecordPayload::Item(_) => Some(RecordKind::Item),
            RecordPayload::PokedexEntry(_) => Some(RecordKind::PokedexEntry),
            RecordPayload::PokemonData(_) => Some(RecordKind::PokemonData),
            RecordPayload::PokemonFamily(_) => Some(RecordKind::PokemonFamily),
            RecordPayload::PlayerCurrency(_) => Some(RecordKind::PlayerCurrency),
            RecordPayload::EggIncubators(_) => Some(RecordKind::EggIncubators),
            RecordPayload::AppliedItems(_) => Some(RecordKind::AppliedItems),
            RecordPayload::Unknown => None,
        }
    }

    fn kind_name(&self) -> String {
        self.kind()
            .map(|k| k.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

// =============================================================================
// Wire-Shaped Item Data
// =============================================================================

/// Inventory item data as an external decoder delivers it: one optional
/// field per payload, normally exactly one populated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryItemData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_stats: Option<PlayerStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pokedex_entry: Option<PokedexEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pokemon_data: Option<PokemonData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pokemon_family: Option<PokemonFamily>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_currency: Option<PlayerCurrency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub egg_incubators: Option<EggIncubators>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_items: Option<AppliedItems>,
}

impl InventoryItemData {
    /// Classifies by the first populated field in priority order.
    ///
    /// Multiple populated fields are not rejected; later ones are dropped.
    pub fn into_payload(self) -> RecordPayload {
        if let Some(stats) = self.player_stats {
            RecordPayload::PlayerStats(stats)
        } else if let Some(item) = self.item {
            RecordPayload::Item(item)
        } else if let Some(entry) = self.pokedex_entry {
            RecordPayload::PokedexEntry(entry)
        } else if let Some(pokemon) = self.pokemon_data {
            RecordPayload::PokemonData(pokemon)
        } else if let Some(family) = self.pokemon_family {
            RecordPayload::PokemonFamily(family)
        } else if let Some(currency) = self.player_currency {
            RecordPayload::PlayerCurrency(currency)
        } else if let Some(incubators) = self.egg_incubators {
            RecordPayload::EggIncubators(incubators)
        } else if let Some(applied) = self.applied_items {
            RecordPayload::AppliedItems(applied)
        } else {
            RecordPayload::Unknown
        }
    }
}

impl From<InventoryItemData> for RecordPayload {
    fn from(data: InventoryItemData) -> Self {
        data.into_payload()
    }
}

// =============================================================================
// Inventory Record
// =============================================================================

/// One inventory entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// Server modification time of the record (ms since epoch).
    #[serde(default)]
    pub modified_timestamp_ms: i64,

    pub payload: RecordPayload,
}

impl InventoryRecord {
    pub fn new(payload: RecordPayload) -> Self {
        InventoryRecord {
            modified_timestamp_ms: 0,
            payload,
        }
    }

    /// Sets the modification timestamp.
    pub fn at(mut self, modified_timestamp_ms: i64) -> Self {
        self.modified_timestamp_ms = modified_timestamp_ms;
        self
    }

    pub fn player_stats(stats: PlayerStats) -> Self {
        Self::new(RecordPayload::PlayerStats(stats))
    }

    pub fn item(item: ItemData) -> Self {
        Self::new(RecordPayload::Item(item))
    }

    pub fn pokedex_entry(entry: PokedexEntry) -> Self {
        Self::new(RecordPayload::PokedexEntry(entry))
    }

    pub fn pokemon(pokemon: PokemonData) -> Self {
        Self::new(RecordPayload::PokemonData(pokemon))
    }

    pub fn pokemon_family(family: PokemonFamily) -> Self {
        Self::new(RecordPayload::PokemonFamily(family))
    }

    pub fn player_currency(currency: PlayerCurrency) -> Self {
        Self::new(RecordPayload::PlayerCurrency(currency))
    }

    pub fn egg_incubators(incubators: EggIncubators) -> Self {
        Self::new(RecordPayload::EggIncubators(incubators))
    }

    pub fn applied_items(applied: AppliedItems) -> Self {
        Self::new(RecordPayload::AppliedItems(applied))
    }

    /// A record with no recognised payload.
    pub fn unknown() -> Self {
        Self::new(RecordPayload::Unknown)
    }

    #[inline]
    pub fn kind(&self) -> Option<RecordKind> {
        self.payload.kind()
    }

    /// Returns the player stats payload or an `UnexpectedPayload` error.
    pub fn as_player_stats(&self) -> CoreResult<&PlayerStats> {
        match &self.payload {
            RecordPayload::PlayerStats(stats) => Ok(stats),
            other => Err(CoreError::UnexpectedPayload {
                expected: RecordKind::PlayerStats.as_str().to_string(),
                found: other.kind_name(),
            }),
        }
    }
}

impl From<RecordPayload> for InventoryRecord {
    fn from(payload: RecordPayload) -> Self {
        InventoryRecord::new(payload)
    }
}
