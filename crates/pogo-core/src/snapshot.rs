//! # Inventory Snapshot
//!
//! Ordered collection of the current records, with an identity index for
//! constant-time lookup.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Snapshot                                      │
//! │                                                                         │
//! │  records (arrival order)          index (first position per identity)   │
//! │  ───────────────────────          ───────────────────────────────────   │
//! │  0: Item(1)                       item/1        → 0                     │
//! │  1: PokedexEntry(7)               pokedex/7     → 1                     │
//! │  2: Item(2)                       item/2        → 2                     │
//! │  3: PlayerStats                   player_stats  → 3                     │
//! │                                                                         │
//! │  shadowed: identity → number of extra records with that identity       │
//! │  (only possible when seeded from an inconsistent full download)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Positions never move: updates replace a payload in place and new records
//! are appended. Only the reconciler should call the mutation methods.

use std::collections::HashMap;

use crate::identity::{resolve, Identity};
use crate::record::{InventoryRecord, RecordKind, RecordPayload};
use crate::types::{FamilyId, ItemId, PlayerCurrency, PlayerStats, PokemonData};

/// The client's reconstruction of inventory state.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    records: Vec<InventoryRecord>,
    index: HashMap<Identity, usize>,
    shadowed: HashMap<Identity, usize>,
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from a full inventory download.
    ///
    /// Order is preserved. Unknown records are kept but never indexed. When
    /// several records share an identity the first one is indexed and the
    /// rest are counted as shadowed.
    pub fn from_records(records: Vec<InventoryRecord>) -> Self {
        let mut snapshot = Snapshot {
            records: Vec::with_capacity(records.len()),
            ..Default::default()
        };

        for record in records {
            match resolve(&record.payload) {
                Some(identity) => {
                    let position = snapshot.records.len();
                    snapshot.records.push(record);
                    if snapshot.index.contains_key(&identity) {
                        *snapshot.shadowed.entry(identity).or_insert(0) += 1;
                    } else {
                        snapshot.index.insert(identity, position);
                    }
                }
                None => snapshot.records.push(record),
            }
        }

        snapshot
    }

    // =========================================================================
    // Read API
    // =========================================================================

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InventoryRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[InventoryRecord] {
        &self.records
    }

    pub fn get(&self, position: usize) -> Option<&InventoryRecord> {
        self.records.get(position)
    }

    /// Position of the first record with this identity.
    pub fn position_of(&self, identity: &Identity) -> Option<usize> {
        self.index.get(identity).copied()
    }

    /// Number of records beyond the first that share this identity.
    pub fn duplicates_of(&self, identity: &Identity) -> usize {
        self.shadowed.get(identity).copied().unwrap_or(0)
    }

    /// Total shadowed records across all identities.
    pub fn shadowed_count(&self) -> usize {
        self.shadowed.values().sum()
    }

    /// Records of one kind, in snapshot order.
    pub fn of_kind(&self, kind: RecordKind) -> impl Iterator<Item = &InventoryRecord> {
        self.records.iter().filter(move |r| r.kind() == Some(kind))
    }

    pub fn count_of(&self, kind: RecordKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn player_stats(&self) -> Option<&PlayerStats> {
        self.records.iter().find_map(|r| match &r.payload {
            RecordPayload::PlayerStats(stats) => Some(stats),
            _ => None,
        })
    }

    pub fn player_currency(&self) -> Option<&PlayerCurrency> {
        self.records.iter().find_map(|r| match &r.payload {
            RecordPayload::PlayerCurrency(currency) => Some(currency),
            _ => None,
        })
    }

    /// Count held of an item type, 0 if absent.
    pub fn item_count(&self, item_id: ItemId) -> i32 {
        self.records
            .iter()
            .find_map(|r| match &r.payload {
                RecordPayload::Item(item) if item.item_id == item_id => Some(item.count),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Candy held for a family, 0 if absent.
    pub fn family_candy(&self, family_id: FamilyId) -> i32 {
        self.records
            .iter()
            .find_map(|r| match &r.payload {
                RecordPayload::PokemonFamily(family) if family.family_id == family_id => {
                    Some(family.candy)
                }
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Owned creatures and eggs, in snapshot order.
    pub fn pokemon(&self) -> impl Iterator<Item = &PokemonData> {
        self.records.iter().filter_map(|r| match &r.payload {
            RecordPayload::PokemonData(pokemon) => Some(pokemon),
            _ => None,
        })
    }

    // =========================================================================
    // Mutation API (reconciler only)
    // =========================================================================

    /// Appends a new record under `identity`, returning its position.
    ///
    /// If the identity is already indexed the record is still appended and
    /// counted as shadowed.
    pub fn push(&mut self, identity: Identity, record: InventoryRecord) -> usize {
        let position = self.records.len();
        self.records.push(record);
        if self.index.contains_key(&identity) {
            *self.shadowed.entry(identity).or_insert(0) += 1;
        } else {
            self.index.insert(identity, position);
        }
        position
    }

    /// Replaces the payload at `position`, keeping position and timestamp.
    ///
    /// The caller guarantees the new payload has the same identity. Returns
    /// false if `position` is out of bounds.
    pub fn replace_payload(&mut self, position: usize, payload: RecordPayload) -> bool {
        match self.records.get_mut(position) {
            Some(record) => {
                record.payload = payload;
                true
            }
            None => false,
        }
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a InventoryRecord;
    type IntoIter = std::slice::Iter<'a, InventoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;

    fn item(id: u32, count: i32) -> InventoryRecord {
        InventoryRecord::item(ItemData::new(ItemId(id), count))
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::new();
        assert!(snapshot.is_empty());
        assert!(snapshot.player_stats().is_none());
        assert_eq!(snapshot.item_count(ItemId(1)), 0);
    }

    #[test]
    fn test_from_records_indexes_first_occurrence() {
        let snapshot = Snapshot::from_records(vec![item(1, 5), item(2, 3), item(1, 8)]);
        let identity = resolve(&item(1, 0).payload).unwrap();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.position_of(&identity), Some(0));
        assert_eq!(snapshot.duplicates_of(&identity), 1);
        assert_eq!(snapshot.shadowed_count(), 1);
        assert_eq!(snapshot.item_count(ItemId(1)), 5);
    }

    #[test]
    fn test_from_records_keeps_unknown_unindexed() {
        let snapshot = Snapshot::from_records(vec![InventoryRecord::unknown(), item(1, 5)]);
        let identity = resolve(&item(1, 0).payload).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.position_of(&identity), Some(1));
    }

    #[test]
    fn test_push_and_replace_keep_positions() {
        let mut snapshot = Snapshot::new();
        let first = item(1, 5);
        let second = item(2, 1);
        let pos_1 = snapshot.push(resolve(&first.payload).unwrap(), first);
        let pos_2 = snapshot.push(resolve(&second.payload).unwrap(), second);
        assert_eq!((pos_1, pos_2), (0, 1));

        assert!(snapshot.replace_payload(0, item(1, 9).payload));
        assert_eq!(snapshot.get(0), Some(&item(1, 9)));
        assert_eq!(snapshot.get(1), Some(&item(2, 1)));
        assert!(!snapshot.replace_payload(5, item(1, 1).payload));
    }

    #[test]
    fn test_replace_keeps_modified_timestamp() {
        let mut snapshot = Snapshot::new();
        let original = item(1, 5).at(1_000);
        snapshot.push(resolve(&original.payload).unwrap(), original);

        snapshot.replace_payload(0, item(1, 6).at(2_000).payload);
        assert_eq!(snapshot.get(0).unwrap().modified_timestamp_ms, 1_000);
    }

    #[test]
    fn test_typed_accessors() {
        let snapshot = Snapshot::from_records(vec![
            InventoryRecord::player_stats(PlayerStats {
                level: 12,
                ..Default::default()
            }),
            InventoryRecord::player_currency(PlayerCurrency { gems: 40 }),
            InventoryRecord::pokemon_family(PokemonFamily {
                family_id: FamilyId(25),
                candy: 17,
            }),
            InventoryRecord::pokemon(PokemonData::new(1, PokemonId(25), 300)),
            InventoryRecord::pokemon(PokemonData::new(2, PokemonId(26), 900)),
        ]);

        assert_eq!(snapshot.player_stats().map(|s| s.level), Some(12));
        assert_eq!(snapshot.player_currency().map(|c| c.gems), Some(40));
        assert_eq!(snapshot.family_candy(FamilyId(25)), 17);
        assert_eq!(snapshot.family_candy(FamilyId(1)), 0);
        assert_eq!(snapshot.count_of(RecordKind::PokemonData), 2);
        let ids: Vec<u64> = snapshot.pokemon().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
