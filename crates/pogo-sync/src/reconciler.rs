//! # Inventory Reconciler
//!
//! The merge engine: folds delta batches into the snapshot and notifies
//! observers of every change.
//!
//! ## Merge Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Per Record, In Arrival Order                         │
//! │                                                                         │
//! │  1. RESOLVE   identity = resolve(delta)                                │
//! │               Unknown → skip (no event, no mutation)                   │
//! │                                                                         │
//! │  2. FIND      position = snapshot.position_of(identity)                │
//! │               more than one match → first wins, counted + logged       │
//! │                                                                         │
//! │  3. NOTIFY    ChangeEvent { previous: existing, delta, kind }          │
//! │               fired BEFORE mutation (observers see the old value)      │
//! │                                                                         │
//! │  4. APPLY     existing → replace payload in place                      │
//! │               absent   → append                                        │
//! │                                                                         │
//! │  After the batch: record the timestamp, release the lock, then         │
//! │  notify update observers once.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Locking
//! The snapshot sits behind one `RwLock`. `apply` holds the write lock for
//! the whole batch, so readers never observe a half-applied batch. Change
//! observers run while that lock is held and must not read the snapshot
//! back through the reconciler; update observers run after it is released
//! and may. Concurrent `apply` calls serialize on the lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use pogo_core::identity::resolve;
use pogo_core::{InventoryRecord, Snapshot};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

use crate::config::{InventorySettings, MirrorConfig};
use crate::notifier::{
    ChangeEvent, ChangeNotifier, InventoryChange, InventoryObserver, SubscriptionId,
    UpdateObserver,
};
use crate::protocol::InventoryDelta;

// =============================================================================
// Results and Diagnostics
// =============================================================================

/// What one `apply` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchSummary {
    pub inserted: usize,
    pub updated: usize,
    /// Records with no recognised payload.
    pub skipped: usize,
    /// Deltas whose identity matched more than one snapshot record.
    pub duplicate_conflicts: usize,
}

impl BatchSummary {
    /// Records that produced a change event.
    pub fn applied(&self) -> usize {
        self.inserted + self.updated
    }
}

/// Lifetime counters of a reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReconcileStats {
    pub batches: u64,
    pub inserted: u64,
    pub updated: u64,
    pub skipped: u64,
    pub duplicate_conflicts: u64,
}

#[derive(Debug, Default)]
struct Counters {
    batches: AtomicU64,
    inserted: AtomicU64,
    updated: AtomicU64,
    skipped: AtomicU64,
    duplicate_conflicts: AtomicU64,
}

impl Counters {
    fn record(&self, summary: &BatchSummary) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.inserted.fetch_add(summary.inserted as u64, Ordering::Relaxed);
        self.updated.fetch_add(summary.updated as u64, Ordering::Relaxed);
        self.skipped.fetch_add(summary.skipped as u64, Ordering::Relaxed);
        self.duplicate_conflicts
            .fetch_add(summary.duplicate_conflicts as u64, Ordering::Relaxed);
    }

    fn load(&self) -> ReconcileStats {
        ReconcileStats {
            batches: self.batches.load(Ordering::Relaxed),
            inserted: self.inserted.load(Ordering::Relaxed),
            updated: self.updated.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            duplicate_conflicts: self.duplicate_conflicts.load(Ordering::Relaxed),
        }
    }
}

/// When the most recent batch was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchStamp {
    /// Server-supplied batch timestamp, if the transport provided one.
    pub server_timestamp_ms: Option<i64>,
    /// Local wall-clock time the batch finished applying.
    pub applied_at: DateTime<Utc>,
}

impl BatchStamp {
    /// Server timestamp when known, otherwise local apply time.
    pub fn timestamp_ms(&self) -> i64 {
        self.server_timestamp_ms
            .unwrap_or_else(|| self.applied_at.timestamp_millis())
    }
}

enum Outcome {
    Inserted,
    Updated,
    Skipped,
}

// =============================================================================
// Reconciler
// =============================================================================

/// Owns the snapshot for one account session.
pub struct InventoryReconciler {
    snapshot: RwLock<Snapshot>,
    notifier: ChangeNotifier,
    last_batch: Mutex<Option<BatchStamp>>,
    counters: Counters,
    warn_on_duplicates: bool,
    change_channel_capacity: usize,
    max_staleness: Duration,
}

impl Default for InventoryReconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryReconciler {
    /// Creates a reconciler with an empty snapshot.
    pub fn new() -> Self {
        ReconcilerBuilder::new().build()
    }

    pub fn builder() -> ReconcilerBuilder {
        ReconcilerBuilder::new()
    }

    // =========================================================================
    // Apply
    // =========================================================================

    /// Applies a batch, stamping it with the local wall-clock time.
    pub fn apply(&self, batch: &[InventoryRecord]) -> BatchSummary {
        self.apply_batch(batch, None)
    }

    /// Applies a transport delta, stamping it with its server timestamp.
    pub fn apply_delta(&self, delta: &InventoryDelta) -> BatchSummary {
        let records = delta.records();
        let server_timestamp = (delta.new_timestamp_ms > 0).then_some(delta.new_timestamp_ms);
        self.apply_batch(&records, server_timestamp)
    }

    fn apply_batch(&self, batch: &[InventoryRecord], server_timestamp_ms: Option<i64>) -> BatchSummary {
        let mut summary = BatchSummary::default();

        {
            let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);

            for delta in batch {
                match self.apply_record(&mut snapshot, delta, &mut summary) {
                    Outcome::Inserted => summary.inserted += 1,
                    Outcome::Updated => summary.updated += 1,
                    Outcome::Skipped => summary.skipped += 1,
                }
            }

            let stamp = BatchStamp {
                server_timestamp_ms,
                applied_at: Utc::now(),
            };
            *self.last_batch.lock().unwrap_or_else(PoisonError::into_inner) = Some(stamp);
        }

        self.counters.record(&summary);
        info!(
            records = batch.len(),
            inserted = summary.inserted,
            updated = summary.updated,
            skipped = summary.skipped,
            duplicate_conflicts = summary.duplicate_conflicts,
            "Applied inventory delta"
        );

        self.notifier.notify_update();
        summary
    }

    fn apply_record(
        &self,
        snapshot: &mut Snapshot,
        delta: &InventoryRecord,
        summary: &mut BatchSummary,
    ) -> Outcome {
        let Some(identity) = resolve(&delta.payload) else {
            trace!("Skipping record with no recognised payload");
            return Outcome::Skipped;
        };

        let position = snapshot.position_of(&identity);
        let duplicates = snapshot.duplicates_of(&identity);
        if position.is_some() && duplicates > 0 {
            summary.duplicate_conflicts += 1;
            if self.warn_on_duplicates {
                warn!(
                    identity = %identity,
                    duplicates,
                    "Delta matches more than one record, updating the first"
                );
            }
        }

        self.notifier.notify_change(&ChangeEvent {
            previous: position.and_then(|p| snapshot.get(p)),
            delta,
            kind: identity.kind,
        });

        match position {
            Some(position) => {
                debug!(identity = %identity, position, "Updating record");
                snapshot.replace_payload(position, delta.payload.clone());
                Outcome::Updated
            }
            None => {
                debug!(identity = %identity, "Inserting record");
                snapshot.push(identity, delta.clone());
                Outcome::Inserted
            }
        }
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    /// Shared read guard over the snapshot.
    ///
    /// Do not hold it across an `apply` on the same thread.
    pub fn snapshot(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_snapshot<R>(&self, f: impl FnOnce(&Snapshot) -> R) -> R {
        f(&self.snapshot())
    }

    /// Copy of the current records, in snapshot order.
    pub fn records(&self) -> Vec<InventoryRecord> {
        self.snapshot().records().to_vec()
    }

    /// Consumes the reconciler at session end.
    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Timestamps and Diagnostics
    // =========================================================================

    pub fn last_batch(&self) -> Option<BatchStamp> {
        *self.last_batch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Timestamp of the most recent batch (server time when supplied).
    pub fn last_timestamp_ms(&self) -> Option<i64> {
        self.last_batch().map(|stamp| stamp.timestamp_ms())
    }

    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        self.last_batch().map(|stamp| stamp.applied_at)
    }

    /// True if no batch was applied within `max_age` (or ever).
    pub fn is_stale(&self, max_age: Duration) -> bool {
        match self.last_updated_at() {
            Some(applied_at) => {
                let age = Utc::now().signed_duration_since(applied_at);
                age.to_std().map(|age| age > max_age).unwrap_or(false)
            }
            None => true,
        }
    }

    /// [`is_stale`](Self::is_stale) against the configured staleness window.
    pub fn is_stale_default(&self) -> bool {
        self.is_stale(self.max_staleness)
    }

    pub fn stats(&self) -> ReconcileStats {
        self.counters.load()
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn subscribe_changes(&self, observer: Arc<dyn InventoryObserver>) -> SubscriptionId {
        self.notifier.subscribe_changes(observer)
    }

    pub fn subscribe_updates(&self, observer: Arc<dyn UpdateObserver>) -> SubscriptionId {
        self.notifier.subscribe_updates(observer)
    }

    pub fn change_channel(
        &self,
        capacity: usize,
    ) -> (SubscriptionId, broadcast::Receiver<InventoryChange>) {
        self.notifier.change_channel(capacity)
    }

    /// [`change_channel`](Self::change_channel) with the configured capacity.
    pub fn change_channel_default(&self) -> (SubscriptionId, broadcast::Receiver<InventoryChange>) {
        self.change_channel(self.change_channel_capacity)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }
}

impl std::fmt::Debug for InventoryReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryReconciler")
            .field("records", &self.snapshot().len())
            .field("notifier", &self.notifier)
            .field("last_batch", &self.last_batch())
            .field("stats", &self.stats())
            .finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`InventoryReconciler`].
#[derive(Debug, Default)]
pub struct ReconcilerBuilder {
    snapshot: Option<Snapshot>,
    warn_on_duplicates: Option<bool>,
    change_channel_capacity: Option<usize>,
    max_staleness: Option<Duration>,
}

impl ReconcilerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a seeded snapshot (e.g. a full inventory download).
    pub fn with_snapshot(mut self, snapshot: Snapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn with_settings(mut self, settings: &InventorySettings) -> Self {
        self.warn_on_duplicates = Some(settings.warn_on_duplicates);
        self.change_channel_capacity = Some(settings.change_channel_capacity);
        self
    }

    pub fn with_max_staleness(mut self, max_staleness: Duration) -> Self {
        self.max_staleness = Some(max_staleness);
        self
    }

    /// Applies the inventory settings and the session staleness window.
    pub fn with_config(self, config: &MirrorConfig) -> Self {
        self.with_settings(&config.inventory)
            .with_max_staleness(config.max_staleness())
    }

    pub fn build(self) -> InventoryReconciler {
        let defaults = MirrorConfig::default();
        let snapshot = self.snapshot.unwrap_or_default();
        if snapshot.shadowed_count() > 0 {
            warn!(
                shadowed = snapshot.shadowed_count(),
                "Seed snapshot contains duplicate identities"
            );
        }

        InventoryReconciler {
            snapshot: RwLock::new(snapshot),
            notifier: ChangeNotifier::new(),
            last_batch: Mutex::new(None),
            counters: Counters::default(),
            warn_on_duplicates: self.warn_on_duplicates.unwrap_or(true),
            change_channel_capacity: self
                .change_channel_capacity
                .unwrap_or(defaults.inventory.change_channel_capacity),
            max_staleness: self.max_staleness.unwrap_or_else(|| defaults.max_staleness()),
        }
    }
}
