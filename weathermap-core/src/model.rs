use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fallback place name when reverse geocoding finds nothing for a point.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// A point on Earth in decimal degrees. Immutable once produced by a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting values outside the valid degree ranges.
    pub fn new(latitude: f64, longitude: f64) -> anyhow::Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(anyhow::anyhow!(
                "Latitude {latitude} is out of range. Expected a value in [-90, 90]."
            ));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(anyhow::anyhow!(
                "Longitude {longitude} is out of range. Expected a value in [-180, 180]."
            ));
        }

        Ok(Self { latitude, longitude })
    }

    /// Render as `lat,lon`, the form the weather API expects in its `q` parameter.
    pub fn as_query(&self) -> String {
        format!("{:.6},{:.6}", self.latitude, self.longitude)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// Weather at the moment of the query. Not cached across queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub condition: String,
    /// Provider icon reference, often protocol-relative (`//cdn...`).
    pub icon: Option<String>,
}

impl CurrentConditions {
    /// Resolve the provider's icon reference to a displayable URL.
    pub fn icon_url(&self) -> Option<String> {
        self.icon.as_ref().map(|icon| {
            if let Some(rest) = icon.strip_prefix("//") {
                format!("https://{rest}")
            } else {
                icon.clone()
            }
        })
    }
}

/// Day-average temperature for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSample {
    pub date: NaiveDate,
    pub avg_temperature_c: f64,
}

/// Fully-resolved payload for a selected point: place name, current
/// conditions and the seven-day history ordered oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub coordinate: Coordinate,
    pub place_name: String,
    pub current: CurrentConditions,
    pub history: Vec<HistoricalSample>,
}

/// The single live view-model. Replaced wholesale on every transition;
/// readers never observe a partially-updated value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SelectionState {
    /// No selection has been made yet.
    #[default]
    Empty,
    /// A selection is in flight; nothing from it is renderable yet.
    Loading { coordinate: Coordinate },
    /// Coordinate, place name, current conditions and history all belong to
    /// the same selection request.
    Ready(Selection),
}

impl SelectionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SelectionState::Loading { .. })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SelectionState::Ready(_))
    }
}
