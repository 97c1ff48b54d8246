use crate::model::Coordinate;
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

pub mod nominatim;

/// Errors from the geocoding service. "No match" is not an error; both
/// operations return `Ok(None)` for that case.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Failed to reach geocoding service: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Geocoding service returned status {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },

    #[error("Failed to parse geocoding response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Geocoding response contained an invalid coordinate: {0}")]
    InvalidCoordinate(String),
}

/// A forward-geocoding hit: the resolved point plus its canonical display name.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub coordinate: Coordinate,
    pub display_name: String,
}

/// Place-name lookups in both directions.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Resolve a place name to a coordinate and canonical name.
    async fn forward_geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError>;

    /// Resolve a coordinate to a human-readable place name.
    async fn reverse_geocode(&self, coordinate: Coordinate)
    -> Result<Option<String>, GeocodeError>;
}
