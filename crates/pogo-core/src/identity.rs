//! # Identity Resolver
//!
//! Maps a record to its kind and, within that kind, the key that decides
//! whether an incoming delta updates an existing record or is new.
//!
//! ## Identity Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Kind             Identity key                                          │
//! │  ───────────────  ───────────────────────────────────────────────────   │
//! │  PlayerStats      Singleton (at most one per snapshot)                  │
//! │  Item             item_id                                               │
//! │  PokedexEntry     pokemon_id (species)                                  │
//! │  PokemonData      id (instance)                                         │
//! │  PokemonFamily    family_id                                             │
//! │  PlayerCurrency   Singleton                                             │
//! │  EggIncubators    Singleton (the record carries the whole set)          │
//! │  AppliedItems     Singleton (the record carries the whole set)          │
//! │  Unknown          (none, record is skipped)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Resolution is total and never fails: an unrecognised payload simply has
//! no identity.

use crate::record::{InventoryRecord, RecordKind, RecordPayload};
use crate::types::{FamilyId, ItemId, PokemonId};

/// Variant-specific identity key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Singleton,
    Item(ItemId),
    Species(PokemonId),
    Instance(u64),
    Family(FamilyId),
}

/// Resolved identity of a record: at most one snapshot record per identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub kind: RecordKind,
    pub key: IdentityKey,
}

impl Identity {
    /// Returns true if `existing` has this kind and identity.
    pub fn matches(&self, existing: &InventoryRecord) -> bool {
        resolve(&existing.payload).as_ref() == Some(self)
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.key {
            IdentityKey::Singleton => write!(f, "{}", self.kind),
            IdentityKey::Item(id) => write!(f, "{}/{}", self.kind, id),
            IdentityKey::Species(id) => write!(f, "{}/{}", self.kind, id),
            IdentityKey::Instance(id) => write!(f, "{}/{}", self.kind, id),
            IdentityKey::Family(id) => write!(f, "{}/{}", self.kind, id),
        }
    }
}

/// Resolves the identity of a payload, `None` for Unknown.
pub fn resolve(payload: &RecordPayload) -> Option<Identity> {
    let (kind, key) = match payload {
        RecordPayload::PlayerStats(_) => (RecordKind::PlayerStats, IdentityKey::Singleton),
        RecordPayload::Item(item) => (RecordKind::Item, IdentityKey::Item(item.item_id)),
        RecordPayload::PokedexEntry(entry) => (
            RecordKind::PokedexEntry,
            IdentityKey::Species(entry.pokemon_id),
        ),
        RecordPayload::PokemonData(pokemon) => {
            (RecordKind::PokemonData, IdentityKey::Instance(pokemon.id))
        }
        RecordPayload::PokemonFamily(family) => (
            RecordKind::PokemonFamily,
            IdentityKey::Family(family.family_id),
        ),
        RecordPayload::PlayerCurrency(_) => (RecordKind::PlayerCurrency, IdentityKey::Singleton),
        RecordPayload::EggIncubators(_) => (RecordKind::EggIncubators, IdentityKey::Singleton),
        RecordPayload::AppliedItems(_) => (RecordKind::AppliedItems, IdentityKey::Singleton),
        RecordPayload::Unknown => return None,
    };

    Some(Identity { kind, key })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;

    #[test]
    fn test_singletons_match_regardless_of_content() {
        let a = InventoryRecord::player_stats(PlayerStats {
            level: 1,
            ..Default::default()
        });
        let b = InventoryRecord::player_stats(PlayerStats {
            level: 30,
            ..Default::default()
        });
        let identity = resolve(&a.payload).unwrap();
        assert_eq!(identity.key, IdentityKey::Singleton);
        assert!(identity.matches(&b));
    }

    #[test]
    fn test_singletons_of_different_kinds_do_not_match() {
        let stats = InventoryRecord::player_stats(PlayerStats::default());
        let currency = InventoryRecord::player_currency(PlayerCurrency { gems: 10 });
        let identity = resolve(&stats.payload).unwrap();
        assert!(!identity.matches(&currency));
    }

    #[test]
    fn test_item_identity_by_item_id() {
        let identity = resolve(&InventoryRecord::item(ItemData::new(ItemId(1), 5)).payload).unwrap();
        assert!(identity.matches(&InventoryRecord::item(ItemData::new(ItemId(1), 9))));
        assert!(!identity.matches(&InventoryRecord::item(ItemData::new(ItemId(2), 5))));
    }

    #[test]
    fn test_same_number_different_kind_does_not_match() {
        let family = InventoryRecord::pokemon_family(PokemonFamily {
            family_id: FamilyId(1),
            candy: 3,
        });
        let entry = InventoryRecord::pokedex_entry(PokedexEntry {
            pokemon_id: PokemonId(1),
            ..Default::default()
        });
        let identity = resolve(&family.payload).unwrap();
        assert!(!identity.matches(&entry));
    }

    #[test]
    fn test_pokemon_identity_by_instance_id() {
        let a = InventoryRecord::pokemon(PokemonData::new(99, PokemonId(16), 10));
        let evolved = InventoryRecord::pokemon(PokemonData::new(99, PokemonId(17), 250));
        let other = InventoryRecord::pokemon(PokemonData::new(100, PokemonId(16), 10));
        let identity = resolve(&a.payload).unwrap();
        assert!(identity.matches(&evolved));
        assert!(!identity.matches(&other));
    }

    #[test]
    fn test_containers_match_across_membership_changes() {
        let incubators = |ids: &[&str]| {
            InventoryRecord::egg_incubators(EggIncubators {
                egg_incubator: ids
                    .iter()
                    .map(|id| EggIncubator {
                        id: id.to_string(),
                        ..Default::default()
                    })
                    .collect(),
            })
        };
        let identity = resolve(&incubators(&["unlimited", "inc-1"]).payload).unwrap();
        assert_eq!(identity.key, IdentityKey::Singleton);
        assert!(identity.matches(&incubators(&["unlimited"])));
        assert!(identity.matches(&incubators(&[])));

        let applied = |ids: &[u32]| {
            InventoryRecord::applied_items(AppliedItems {
                item: ids
                    .iter()
                    .map(|id| AppliedItem {
                        item_id: ItemId(*id),
                        ..Default::default()
                    })
                    .collect(),
            })
        };
        let identity = resolve(&applied(&[401]).payload).unwrap();
        assert!(identity.matches(&applied(&[401, 301])));
        assert!(!identity.matches(&incubators(&["unlimited"])));
    }

    #[test]
    fn test_unknown_has_no_identity() {
        assert!(resolve(&RecordPayload::Unknown).is_none());
    }

    #[test]
    fn test_identity_display() {
        let identity = resolve(&InventoryRecord::item(ItemData::new(ItemId(701), 1)).payload).unwrap();
        assert_eq!(identity.to_string(), "item/701");

        let identity = resolve(&InventoryRecord::player_currency(PlayerCurrency::default()).payload).unwrap();
        assert_eq!(identity.to_string(), "player_currency");
    }
}
