//! # Sync Error Types
//!
//! Error types for everything around the merge path.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Persistence   │  │     Protocol            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  LocationLoad   │  │  DeserializationFailed  │ │
//! │  │  ConfigLoad     │  │  LocationSave   │  │  SerializationFailed    │ │
//! │  │  ConfigSave     │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  NOT ERRORS (absorbed by the reconciler):                              │
//! │  • Unrecognised record  → skipped                                      │
//! │  • Duplicate identity   → first match wins, counted + logged           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Persistence Errors
    // =========================================================================
    /// Failed to read the cached location.
    #[error("Failed to load location: {0}")]
    LocationLoadFailed(String),

    /// Failed to write the cached location.
    #[error("Failed to save location: {0}")]
    LocationSaveFailed(String),

    /// Other file system failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // =========================================================================
    // Protocol Errors
    // =========================================================================
    /// Failed to serialize a message.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Failed to deserialize a delta or fixture.
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// Error from the core model.
    #[error(transparent)]
    Core(#[from] pogo_core::CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            SyncError::DeserializationFailed(err.to_string())
        } else {
            SyncError::SerializationFailed(err.to_string())
        }
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

impl From<pogo_core::ValidationError> for SyncError {
    fn from(err: pogo_core::ValidationError) -> Self {
        SyncError::Core(err.into())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if this error came from the file system.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            SyncError::Io(_) | SyncError::LocationLoadFailed(_) | SyncError::LocationSaveFailed(_)
        )
    }
}
