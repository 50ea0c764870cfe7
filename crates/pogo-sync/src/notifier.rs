//! # Change Notifier
//!
//! Two independent observer registries owned by one reconciler.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Notification Flow                                 │
//! │                                                                         │
//! │  apply(batch)                                                          │
//! │    │                                                                    │
//! │    ├── record 1 ──► notify_change(ChangeEvent) ──► change observers    │
//! │    ├── record 2 ──► notify_change(ChangeEvent) ──► change observers    │
//! │    │    ...                                        (+ broadcast bridge)│
//! │    │                                                                    │
//! │    └── end of batch ──► notify_update() ──────────► update observers   │
//! │                                                                         │
//! │  Delivery is synchronous and in-process: every observer has run        │
//! │  before the reconciler moves on. Order between observers is not        │
//! │  guaranteed.                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Observers are invoked from a copy of the registry taken outside the
//! registry lock, so an observer may subscribe or unsubscribe (itself
//! included) from inside its callback.

use std::sync::{Arc, Mutex, PoisonError};

use pogo_core::{InventoryRecord, RecordKind};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, trace};
use uuid::Uuid;

// =============================================================================
// Events
// =============================================================================

/// One per-record change, borrowed from the reconciler for the duration of
/// delivery.
#[derive(Debug, Clone, Copy)]
pub struct ChangeEvent<'a> {
    /// The existing record before this delta, `None` for a new entry.
    pub previous: Option<&'a InventoryRecord>,

    /// The incoming delta record.
    pub delta: &'a InventoryRecord,

    pub kind: RecordKind,
}

impl ChangeEvent<'_> {
    /// Returns true if the delta creates a new entry.
    pub fn is_insert(&self) -> bool {
        self.previous.is_none()
    }

    /// Owned copy, for consumers that outlive delivery.
    pub fn to_change(&self) -> InventoryChange {
        InventoryChange {
            previous: self.previous.cloned(),
            delta: self.delta.clone(),
            kind: self.kind,
        }
    }
}

/// Owned form of [`ChangeEvent`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryChange {
    pub previous: Option<InventoryRecord>,
    pub delta: InventoryRecord,
    pub kind: RecordKind,
}

// =============================================================================
// Observer Traits
// =============================================================================

/// Receives every applied record.
pub trait InventoryObserver: Send + Sync {
    fn on_item_changed(&self, event: &ChangeEvent<'_>);

    /// Returns true once the observer can never receive again; the notifier
    /// then drops it from the registry.
    fn is_closed(&self) -> bool {
        false
    }
}

/// Receives one notification per completed batch.
pub trait UpdateObserver: Send + Sync {
    fn on_update(&self);
}

impl<F> InventoryObserver for F
where
    F: Fn(&ChangeEvent<'_>) + Send + Sync,
{
    fn on_item_changed(&self, event: &ChangeEvent<'_>) {
        self(event)
    }
}

impl<F> UpdateObserver for F
where
    F: Fn() + Send + Sync,
{
    fn on_update(&self) {
        self()
    }
}

/// Forwards changes onto a tokio broadcast channel.
///
/// Sending never blocks and a lagging receiver sees `RecvError::Lagged`.
/// Once every receiver is dropped the observer reports itself closed.
pub struct BroadcastObserver {
    tx: broadcast::Sender<InventoryChange>,
}

impl BroadcastObserver {
    pub fn new(tx: broadcast::Sender<InventoryChange>) -> Self {
        BroadcastObserver { tx }
    }
}

impl InventoryObserver for BroadcastObserver {
    fn on_item_changed(&self, event: &ChangeEvent<'_>) {
        if self.tx.send(event.to_change()).is_err() {
            trace!("Broadcast change dropped, no receivers");
        }
    }

    fn is_closed(&self) -> bool {
        self.tx.receiver_count() == 0
    }
}

// =============================================================================
// Subscription Handle
// =============================================================================

/// Handle returned by `subscribe_*`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        SubscriptionId(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Notifier
// =============================================================================

type Registry<T> = Mutex<Vec<(SubscriptionId, Arc<T>)>>;

/// Owns the change and update observer registries.
#[derive(Default)]
pub struct ChangeNotifier {
    change_observers: Registry<dyn InventoryObserver>,
    update_observers: Registry<dyn UpdateObserver>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_changes(&self, observer: Arc<dyn InventoryObserver>) -> SubscriptionId {
        let id = SubscriptionId::new();
        lock(&self.change_observers).push((id, observer));
        debug!(subscription = %id, "Change observer subscribed");
        id
    }

    pub fn subscribe_updates(&self, observer: Arc<dyn UpdateObserver>) -> SubscriptionId {
        let id = SubscriptionId::new();
        lock(&self.update_observers).push((id, observer));
        debug!(subscription = %id, "Update observer subscribed");
        id
    }

    /// Bridges change events onto a new broadcast channel.
    ///
    /// The returned receiver is the first of any number; call `subscribe()`
    /// on the sender half for more.
    pub fn change_channel(
        &self,
        capacity: usize,
    ) -> (SubscriptionId, broadcast::Receiver<InventoryChange>) {
        let (tx, rx) = broadcast::channel(capacity.max(1));
        let id = self.subscribe_changes(Arc::new(BroadcastObserver::new(tx)));
        (id, rx)
    }

    /// Removes a subscription from whichever registry holds it.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = remove(&self.change_observers, id) || remove(&self.update_observers, id);
        if removed {
            debug!(subscription = %id, "Observer unsubscribed");
        }
        removed
    }

    pub fn change_observer_count(&self) -> usize {
        lock(&self.change_observers).len()
    }

    pub fn update_observer_count(&self) -> usize {
        lock(&self.update_observers).len()
    }

    pub(crate) fn notify_change(&self, event: &ChangeEvent<'_>) {
        let observers: Vec<_> = lock(&self.change_observers)
            .iter()
            .map(|(_, o)| Arc::clone(o))
            .collect();
        let mut closed = false;
        for observer in &observers {
            observer.on_item_changed(event);
            closed |= observer.is_closed();
        }

        if closed {
            let mut registry = lock(&self.change_observers);
            let before = registry.len();
            registry.retain(|(_, o)| !o.is_closed());
            debug!(removed = before - registry.len(), "Pruned closed change observers");
        }
    }

    pub(crate) fn notify_update(&self) {
        let observers: Vec<_> = lock(&self.update_observers)
            .iter()
            .map(|(_, o)| Arc::clone(o))
            .collect();
        for observer in observers {
            observer.on_update();
        }
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("change_observers", &self.change_observer_count())
            .field("update_observers", &self.update_observer_count())
            .finish()
    }
}

fn lock<T: ?Sized>(registry: &Registry<T>) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Arc<T>)>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

fn remove<T: ?Sized>(registry: &Registry<T>, id: SubscriptionId) -> bool {
    let mut observers = lock(registry);
    let before = observers.len();
    observers.retain(|(sid, _)| *sid != id);
    observers.len() != before
}
