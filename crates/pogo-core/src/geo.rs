//! # Coordinates
//!
//! Player position and great-circle distance. Storage of the last known
//! position is the sync crate's concern; this module is math only.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::{DEFAULT_ALTITUDE, EARTH_RADIUS_METERS};

/// A validated WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_altitude")]
    pub altitude: f64,
}

fn default_altitude() -> f64 {
    DEFAULT_ALTITUDE
}

impl Coordinate {
    /// Creates a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Result<Self, ValidationError> {
        check_range("latitude", latitude, -90.0, 90.0)?;
        check_range("longitude", longitude, -180.0, 180.0)?;
        if !altitude.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "altitude".to_string(),
            });
        }

        Ok(Coordinate {
            latitude,
            longitude,
            altitude,
        })
    }

    /// Creates a coordinate at [`DEFAULT_ALTITUDE`].
    pub fn at(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        Self::new(latitude, longitude, DEFAULT_ALTITUDE)
    }

    /// Haversine distance in meters; altitude is ignored.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let lat_1 = self.latitude.to_radians();
        let lat_2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat_1.cos() * lat_2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_METERS * c
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max,
            value,
        });
    }
    Ok(())
}
