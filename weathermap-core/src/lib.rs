//! Core library for the `weathermap` lookup client.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Adapters over the geocoding and weather services
//! - The selection orchestrator and its shared state snapshot
//!
//! It is used by `weathermap-cli`, but any frontend that can subscribe to a
//! [`SelectionState`] channel can sit on top of it.

pub mod config;
pub mod geocode;
pub mod model;
pub mod selection;
pub mod weather;

pub use config::Config;
pub use geocode::{GeocodeError, GeocodedPlace, Geocoder};
pub use model::{
    Coordinate, CurrentConditions, HistoricalSample, Selection, SelectionState, UNKNOWN_LOCATION,
};
pub use selection::{HISTORY_DAYS, SelectionError, SelectionOrchestrator, history_dates};
pub use weather::{WeatherError, WeatherProvider};
