//! End-to-end merge scenarios through the public reconciler API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pogo_core::{
    InventoryRecord, ItemData, ItemId, PlayerStats, PokedexEntry, PokemonData, PokemonId,
    RecordKind, Snapshot,
};
use pogo_sync::{ChangeEvent, InventoryChange, InventoryDelta, InventoryReconciler};

// =============================================================================
// Helpers
// =============================================================================

struct Recorder {
    changes: Arc<Mutex<Vec<InventoryChange>>>,
    updates: Arc<AtomicUsize>,
}

impl Recorder {
    fn attach(reconciler: &InventoryReconciler) -> Self {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let updates = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&changes);
        reconciler.subscribe_changes(Arc::new(move |event: &ChangeEvent<'_>| {
            c.lock().unwrap().push(event.to_change());
        }));
        let u = Arc::clone(&updates);
        reconciler.subscribe_updates(Arc::new(move || {
            u.fetch_add(1, Ordering::SeqCst);
        }));

        Recorder { changes, updates }
    }

    fn changes(&self) -> Vec<InventoryChange> {
        self.changes.lock().unwrap().clone()
    }

    fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

fn item(id: u32, count: i32) -> InventoryRecord {
    InventoryRecord::item(ItemData::new(ItemId(id), count))
}

fn level(level: u32) -> InventoryRecord {
    InventoryRecord::player_stats(PlayerStats {
        level,
        ..Default::default()
    })
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_insert_into_empty_snapshot() {
    let reconciler = InventoryReconciler::new();
    let recorder = Recorder::attach(&reconciler);

    let summary = reconciler.apply(&[item(1, 5)]);

    assert_eq!(summary.inserted, 1);
    assert_eq!(reconciler.records(), vec![item(1, 5)]);

    let changes = recorder.changes();
    assert_eq!(changes.len(), 1);
    assert!(changes[0].previous.is_none());
    assert_eq!(changes[0].kind, RecordKind::Item);
    assert_eq!(recorder.updates(), 1);
}

#[test]
fn test_update_in_place_reports_previous() {
    let reconciler = InventoryReconciler::new();
    reconciler.apply(&[item(1, 5)]);
    let recorder = Recorder::attach(&reconciler);

    let summary = reconciler.apply(&[item(1, 9)]);

    assert_eq!(summary.updated, 1);
    assert_eq!(reconciler.records(), vec![item(1, 9)]);
    assert_eq!(recorder.changes()[0].previous, Some(item(1, 5)));
    assert_eq!(recorder.changes()[0].delta, item(1, 9));
}

#[test]
fn test_two_singleton_updates_in_one_batch() {
    let reconciler = InventoryReconciler::new();
    let recorder = Recorder::attach(&reconciler);

    let summary = reconciler.apply(&[level(1), level(2)]);

    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(reconciler.records(), vec![level(2)]);

    let changes = recorder.changes();
    assert_eq!(changes.len(), 2);
    assert!(changes[0].previous.is_none());
    assert_eq!(changes[1].previous, Some(level(1)));
    assert_eq!(recorder.updates(), 1);
}

#[test]
fn test_unknown_payload_is_skipped_but_batch_completes() {
    let pokemon = InventoryRecord::pokemon(PokemonData::new(0xA, PokemonId(25), 100));
    let reconciler = InventoryReconciler::builder()
        .with_snapshot(Snapshot::from_records(vec![pokemon.clone()]))
        .build();
    let recorder = Recorder::attach(&reconciler);

    let summary = reconciler.apply(&[InventoryRecord::unknown()]);

    assert_eq!(summary.skipped, 1);
    assert_eq!(reconciler.records(), vec![pokemon]);
    assert!(recorder.changes().is_empty());
    assert_eq!(recorder.updates(), 1);
}

#[test]
fn test_new_records_keep_arrival_order() {
    let reconciler = InventoryReconciler::new();
    let entry = InventoryRecord::pokedex_entry(PokedexEntry {
        pokemon_id: PokemonId(7),
        ..Default::default()
    });

    reconciler.apply(&[item(1, 1), entry.clone(), item(2, 1)]);

    assert_eq!(reconciler.records(), vec![item(1, 1), entry, item(2, 1)]);
}

// =============================================================================
// Transport Envelope
// =============================================================================

#[test]
fn test_delta_json_drives_reconciler() {
    let reconciler = InventoryReconciler::new();
    let recorder = Recorder::attach(&reconciler);

    let batches = InventoryDelta::batches_from_json(
        r#"[
            { "new_timestamp_ms": 1000,
              "inventory_items": [
                { "inventory_item_data": { "player_stats": { "level": 5 } } },
                { "inventory_item_data": { "item": { "item_id": 1, "count": 5 } } }
              ] },
            { "new_timestamp_ms": 2000,
              "inventory_items": [
                { "inventory_item_data": { "item": { "item_id": 1, "count": 3 } } },
                { "inventory_item_data": { "lucky_egg_bonus": true } }
              ] }
        ]"#,
    )
    .unwrap();

    for batch in &batches {
        reconciler.apply_delta(batch);
    }

    let snapshot = reconciler.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.item_count(ItemId(1)), 3);
    assert_eq!(snapshot.player_stats().map(|s| s.level), Some(5));
    drop(snapshot);

    assert_eq!(reconciler.last_timestamp_ms(), Some(2000));
    assert_eq!(recorder.changes().len(), 3);
    assert_eq!(recorder.updates(), 2);

    let stats = reconciler.stats();
    assert_eq!(stats.batches, 2);
    assert_eq!(stats.skipped, 1);
}

#[tokio::test]
async fn test_async_consumer_sees_every_change() {
    let reconciler = InventoryReconciler::new();
    let (_id, mut rx) = reconciler.change_channel(16);

    reconciler.apply(&[item(1, 5), item(1, 6), InventoryRecord::unknown()]);

    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    assert!(first.previous.is_none());
    assert_eq!(second.previous, Some(item(1, 5)));
    assert!(rx.try_recv().is_err());
}
