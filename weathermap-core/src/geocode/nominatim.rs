//! Geocoding via Nominatim (OpenStreetMap). Free, no API key; requests must
//! carry an identifying User-Agent per the service's usage policy.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::model::Coordinate;

use super::{GeocodeError, GeocodedPlace, Geocoder};

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "weathermap/0.1.0";

/// Geocoding adapter backed by Nominatim.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
    http: Client,
}

impl Default for NominatimGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl NominatimGeocoder {
    pub fn new() -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self { base_url: DEFAULT_BASE_URL.to_string(), http }
    }

    /// Point the geocoder at a different endpoint, e.g. a mock server in tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_body(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<String, GeocodeError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let res = self.http.get(&url).query(query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::debug!(%status, endpoint, "geocoding request failed");
            return Err(GeocodeError::Status {
                status,
                body: crate::weather::truncate_body(&body),
            });
        }

        Ok(body)
    }
}

// Nominatim serializes lat/lon as strings.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
    /// Set instead of `display_name` when the point has no address, e.g. open ocean.
    error: Option<String>,
}

fn parse_degrees(raw: &str) -> Result<f64, GeocodeError> {
    raw.parse::<f64>().map_err(|_| GeocodeError::InvalidCoordinate(raw.to_string()))
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn forward_geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
        let body = self
            .get_body("search", &[("q", query), ("format", "json"), ("limit", "1")])
            .await?;

        let hits: Vec<SearchHit> = serde_json::from_str(&body)?;
        let Some(hit) = hits.into_iter().next() else {
            tracing::debug!(query, "forward geocode found no match");
            return Ok(None);
        };

        let latitude = parse_degrees(&hit.lat)?;
        let longitude = parse_degrees(&hit.lon)?;
        let coordinate = Coordinate::new(latitude, longitude)
            .map_err(|_| GeocodeError::InvalidCoordinate(format!("{latitude},{longitude}")))?;

        tracing::debug!(query, %coordinate, "forward geocoded");
        Ok(Some(GeocodedPlace { coordinate, display_name: hit.display_name }))
    }

    async fn reverse_geocode(
        &self,
        coordinate: Coordinate,
    ) -> Result<Option<String>, GeocodeError> {
        let lat = format!("{:.6}", coordinate.latitude);
        let lon = format!("{:.6}", coordinate.longitude);

        let body = self
            .get_body(
                "reverse",
                &[("lat", lat.as_str()), ("lon", lon.as_str()), ("format", "json"), ("zoom", "10")],
            )
            .await?;

        let parsed: ReverseResponse = serde_json::from_str(&body)?;

        if let Some(reason) = parsed.error {
            tracing::debug!(%coordinate, reason, "reverse geocode found no match");
            return Ok(None);
        }

        Ok(parsed.display_name)
    }
}
