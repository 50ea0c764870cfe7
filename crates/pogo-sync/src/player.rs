//! # Player Consumer
//!
//! The per-session player view built on top of the reconciler.
//!
//! ## Components
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            Player                                       │
//! │                                                                         │
//! │  ┌──────────────────────────┐     ┌──────────────────────────────────┐ │
//! │  │   PlayerStatsTracker     │     │   LocationStore                  │ │
//! │  │                          │     │                                  │ │
//! │  │ Subscribed to change     │     │ Current coordinate               │ │
//! │  │ events, keeps the latest │     │ set_coordinates → location.json  │ │
//! │  │ PlayerStats delta        │     │ distance_to (meters)             │ │
//! │  └──────────────────────────┘     └──────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use pogo_core::{Coordinate, PlayerStats, RecordKind, RecordPayload};
use tracing::{debug, info};

use crate::config::LocationSettings;
use crate::error::{SyncError, SyncResult};
use crate::notifier::{ChangeEvent, InventoryObserver, SubscriptionId};
use crate::reconciler::InventoryReconciler;

// =============================================================================
// Stats Tracker
// =============================================================================

/// Keeps the latest player stats seen in a change event.
#[derive(Debug, Default)]
pub struct PlayerStatsTracker {
    stats: RwLock<Option<PlayerStats>>,
}

impl PlayerStatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> Option<PlayerStats> {
        self.stats.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn level(&self) -> Option<u32> {
        self.stats().map(|s| s.level)
    }
}

impl InventoryObserver for PlayerStatsTracker {
    fn on_item_changed(&self, event: &ChangeEvent<'_>) {
        if event.kind != RecordKind::PlayerStats {
            return;
        }
        if let RecordPayload::PlayerStats(stats) = &event.delta.payload {
            let previous_level = event.previous.and_then(|p| p.as_player_stats().ok()).map(|s| s.level);
            if previous_level.is_some_and(|level| level < stats.level) {
                info!(from = ?previous_level, to = stats.level, "Player leveled up");
            }
            *self.stats.write().unwrap_or_else(PoisonError::into_inner) = Some(stats.clone());
        }
    }
}

// =============================================================================
// Location Store
// =============================================================================

/// Current player position, persisted as JSON on every change.
#[derive(Debug)]
pub struct LocationStore {
    path: PathBuf,
    current: RwLock<Coordinate>,
}

impl LocationStore {
    /// Creates a store at `path` starting from `initial` (not persisted yet).
    pub fn new(path: impl Into<PathBuf>, initial: Coordinate) -> Self {
        LocationStore {
            path: path.into(),
            current: RwLock::new(initial),
        }
    }

    /// Opens the configured store, resuming from the cached position when
    /// one exists and falling back to `fallback` otherwise.
    pub fn open(settings: &LocationSettings, fallback: Coordinate) -> SyncResult<Self> {
        let path = settings.location_path();
        let initial = match Self::load_last(&path)? {
            Some(coordinate) => {
                debug!(?path, "Resuming from cached location");
                coordinate
            }
            None => fallback,
        };
        Ok(Self::new(path, initial))
    }

    /// Reads the cached coordinate, `None` if no cache file exists.
    pub fn load_last(path: &Path) -> SyncResult<Option<Coordinate>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SyncError::LocationLoadFailed(e.to_string()))?;
        let coordinate: Coordinate = serde_json::from_str(&contents)
            .map_err(|e| SyncError::LocationLoadFailed(e.to_string()))?;
        // Re-validate; the file may have been edited by hand.
        Ok(Some(Coordinate::new(
            coordinate.latitude,
            coordinate.longitude,
            coordinate.altitude,
        )?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> Coordinate {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validates, updates and persists the position.
    pub fn set_coordinates(&self, latitude: f64, longitude: f64, altitude: f64) -> SyncResult<()> {
        let coordinate = Coordinate::new(latitude, longitude, altitude)?;
        self.persist(&coordinate)?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = coordinate;
        debug!(latitude, longitude, altitude, "Location updated");
        Ok(())
    }

    /// Meters from the current position to the given point.
    pub fn distance_to(&self, latitude: f64, longitude: f64) -> SyncResult<f64> {
        let target = Coordinate::at(latitude, longitude)?;
        Ok(self.current().distance_to(&target))
    }

    fn persist(&self, coordinate: &Coordinate) -> SyncResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::LocationSaveFailed(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(coordinate)?;
        std::fs::write(&self.path, json).map_err(|e| SyncError::LocationSaveFailed(e.to_string()))
    }
}

// =============================================================================
// Player
// =============================================================================

/// Player view for one session.
#[derive(Debug)]
pub struct Player {
    stats: Arc<PlayerStatsTracker>,
    location: LocationStore,
    subscription: SubscriptionId,
}

impl Player {
    /// Subscribes a stats tracker to `reconciler`.
    pub fn attach(reconciler: &InventoryReconciler, location: LocationStore) -> Self {
        let stats = Arc::new(PlayerStatsTracker::new());
        let subscription = reconciler.subscribe_changes(stats.clone());
        Player {
            stats,
            location,
            subscription,
        }
    }

    /// Unsubscribes the stats tracker.
    pub fn detach(self, reconciler: &InventoryReconciler) -> bool {
        reconciler.unsubscribe(self.subscription)
    }

    pub fn stats(&self) -> Option<PlayerStats> {
        self.stats.stats()
    }

    pub fn location(&self) -> &LocationStore {
        &self.location
    }

    pub fn latitude(&self) -> f64 {
        self.location.current().latitude
    }

    pub fn longitude(&self) -> f64 {
        self.location.current().longitude
    }

    pub fn set_coordinates(&self, latitude: f64, longitude: f64, altitude: f64) -> SyncResult<()> {
        self.location.set_coordinates(latitude, longitude, altitude)
    }

    pub fn distance_to(&self, latitude: f64, longitude: f64) -> SyncResult<f64> {
        self.location.distance_to(latitude, longitude)
    }
}
