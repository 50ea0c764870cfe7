//! # Error Types
//!
//! Domain-specific error types for pogo-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pogo-core errors (this file)                                          │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  pogo-sync errors (separate crate)                                     │
//! │  └── SyncError        - Config, file and decoding failures             │
//! │                                                                         │
//! │  The merge path itself never produces an error: unknown records are    │
//! │  skipped and duplicate identities resolve to the first match.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A record was expected to carry a specific payload but did not.
    ///
    /// ## When This Occurs
    /// - A typed accessor (e.g. `as_player_stats`) was asked for the wrong kind
    /// - A consumer received a record classified as Unknown
    #[error("Expected {expected} payload, found {found}")]
    UnexpectedPayload { expected: String, found: String },

    /// A template lookup found no settings for a species.
    #[error("No template settings for species {0}")]
    TemplateNotFound(u32),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    /// Value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::UnexpectedPayload {
            expected: "player_stats".to_string(),
            found: "item".to_string(),
        };
        assert_eq!(err.to_string(), "Expected player_stats payload, found item");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::OutOfRange {
            field: "latitude".to_string(),
            min: -90.0,
            max: 90.0,
            value: 91.5,
        };
        assert_eq!(err.to_string(), "latitude must be between -90 and 90, got 91.5");

        let err = ValidationError::NotFinite {
            field: "longitude".to_string(),
        };
        assert_eq!(err.to_string(), "longitude must be a finite number");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::NotFinite {
            field: "altitude".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
