//! # Payload Types
//!
//! The variant-specific payloads an inventory record can carry.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Inventory Payloads                              │
//! │                                                                         │
//! │  SINGLETONS (one per snapshot)      KEYED (one per identity key)        │
//! │  ─────────────────────────────      ──────────────────────────────      │
//! │  PlayerStats     level, xp, ...     ItemData       item_id              │
//! │  PlayerCurrency  gems               PokedexEntry   pokemon_id (species) │
//! │  EggIncubators   whole set          PokemonData    id (instance)        │
//! │  AppliedItems    whole set          PokemonFamily  family_id            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All payloads deserialize with `#[serde(default)]` so a decoder that only
//! fills some fields still produces a usable value.

use serde::{Deserialize, Serialize};

// =============================================================================
// Identifiers
// =============================================================================

/// Item type identifier (poke ball, potion, incubator, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

/// Species identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PokemonId(pub u32);

/// Family identifier (species that share candy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FamilyId(pub u32);

impl FamilyId {
    /// Placeholder family used by templates that are not species settings.
    pub const UNSET: FamilyId = FamilyId(0);

    /// Returns true unless this is [`FamilyId::UNSET`].
    #[inline]
    pub const fn is_set(&self) -> bool {
        self.0 != 0
    }
}

macro_rules! display_id {
    ($($ty:ty),*) => {
        $(impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        })*
    };
}

display_id!(ItemId, PokemonId, FamilyId);

// =============================================================================
// Player Stats (singleton)
// =============================================================================

/// Account-level progression counters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub level: u32,
    pub experience: i64,
    pub prev_level_xp: i64,
    pub next_level_xp: i64,
    pub km_walked: f32,
    pub pokemons_encountered: u32,
    pub unique_pokedex_entries: u32,
    pub pokemons_captured: u32,
    pub evolutions: u32,
    pub poke_stop_visits: u32,
    pub pokeballs_thrown: u32,
    pub eggs_hatched: u32,
}

impl PlayerStats {
    /// Experience still needed to reach the next level.
    pub fn xp_to_next_level(&self) -> i64 {
        (self.next_level_xp - self.experience).max(0)
    }
}

// =============================================================================
// Items
// =============================================================================

/// Stack of one item type in the bag.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemData {
    pub item_id: ItemId,
    pub count: i32,
    pub unseen: bool,
}

impl ItemData {
    pub fn new(item_id: ItemId, count: i32) -> Self {
        ItemData {
            item_id,
            count,
            unseen: false,
        }
    }
}

// =============================================================================
// Pokedex Entry
// =============================================================================

/// Per-species encounter and capture counters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PokedexEntry {
    pub pokemon_id: PokemonId,
    pub times_encountered: u32,
    pub times_captured: u32,
    pub evolution_stone_pieces: u32,
}

// =============================================================================
// Pokemon Data
// =============================================================================

/// One caught creature (or egg) owned by the player.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PokemonData {
    /// Unique instance identifier.
    pub id: u64,
    pub pokemon_id: PokemonId,
    pub cp: u32,
    pub stamina: u32,
    pub stamina_max: u32,
    pub move_1: u32,
    pub move_2: u32,
    pub is_egg: bool,
    pub egg_km_walked_target: f64,
    pub favorite: bool,
    pub nickname: String,
    pub creation_time_ms: u64,
}

impl PokemonData {
    pub fn new(id: u64, pokemon_id: PokemonId, cp: u32) -> Self {
        PokemonData {
            id,
            pokemon_id,
            cp,
            ..Default::default()
        }
    }
}

// =============================================================================
// Pokemon Family
// =============================================================================

/// Candy balance for a family.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PokemonFamily {
    pub family_id: FamilyId,
    pub candy: i32,
}

// =============================================================================
// Player Currency (singleton)
// =============================================================================

/// Premium currency balance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerCurrency {
    pub gems: i32,
}

// =============================================================================
// Egg Incubators
// =============================================================================

/// A single incubator, possibly holding an egg.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EggIncubator {
    pub id: String,
    pub item_id: ItemId,
    pub incubator_type: u32,
    pub uses_remaining: i32,
    /// Instance id of the egg currently incubating (0 when empty).
    pub pokemon_id: u64,
    pub start_km_walked: f64,
    pub target_km_walked: f64,
}

impl EggIncubator {
    /// Returns true if an egg is currently incubating.
    pub fn is_occupied(&self) -> bool {
        self.pokemon_id != 0
    }
}

/// The set of incubators as delivered in one record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EggIncubators {
    pub egg_incubator: Vec<EggIncubator>,
}

impl EggIncubators {
    /// Ordered incubator ids.
    pub fn ids(&self) -> Vec<String> {
        self.egg_incubator.iter().map(|i| i.id.clone()).collect()
    }
}

// =============================================================================
// Applied Items
// =============================================================================

/// A consumable currently in effect (incense, lucky egg, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppliedItem {
    pub item_id: ItemId,
    pub item_type: u32,
    pub expire_ms: i64,
    pub applied_ms: i64,
}

impl AppliedItem {
    /// Returns true if the item is still in effect at `now_ms`.
    pub fn is_active_at(&self, now_ms: i64) -> bool {
        self.expire_ms > now_ms
    }
}

/// The set of applied items as delivered in one record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppliedItems {
    pub item: Vec<AppliedItem>,
}

impl AppliedItems {
    /// Ordered applied item ids.
    pub fn ids(&self) -> Vec<ItemId> {
        self.item.iter().map(|i| i.item_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_unset() {
        assert!(!FamilyId::UNSET.is_set());
        assert!(FamilyId(1).is_set());
    }

    #[test]
    fn test_xp_to_next_level() {
        let stats = PlayerStats {
            level: 3,
            experience: 2_500,
            next_level_xp: 3_000,
            ..Default::default()
        };
        assert_eq!(stats.xp_to_next_level(), 500);

        let overshoot = PlayerStats {
            experience: 4_000,
            next_level_xp: 3_000,
            ..Default::default()
        };
        assert_eq!(overshoot.xp_to_next_level(), 0);
    }

    #[test]
    fn test_id_lists() {
        let incubators = EggIncubators {
            egg_incubator: vec![
                EggIncubator {
                    id: "EggIncubatorProto-1".into(),
                    ..Default::default()
                },
                EggIncubator {
                    id: "EggIncubatorProto-2".into(),
                    pokemon_id: 42,
                    ..Default::default()
                },
            ],
        };
        assert_eq!(incubators.ids(), vec!["EggIncubatorProto-1", "EggIncubatorProto-2"]);
        assert!(!incubators.egg_incubator[0].is_occupied());
        assert!(incubators.egg_incubator[1].is_occupied());

        let applied = AppliedItems {
            item: vec![AppliedItem {
                item_id: ItemId(301),
                expire_ms: 2_000,
                ..Default::default()
            }],
        };
        assert_eq!(applied.ids(), vec![ItemId(301)]);
        assert!(applied.item[0].is_active_at(1_000));
        assert!(!applied.item[0].is_active_at(2_000));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let item: ItemData = serde_json::from_str(r#"{"item_id": 1, "count": 5}"#).unwrap();
        assert_eq!(item, ItemData::new(ItemId(1), 5));
    }

    #[test]
    fn test_id_display() {
        assert_eq!(ItemId(701).to_string(), "701");
        assert_eq!(FamilyId(25).to_string(), "25");
    }
}
