//! Location selection orchestration.
//!
//! A selection (map click or search) fans out into a reverse-geocode lookup,
//! a current-conditions lookup and seven historical-day lookups, all
//! concurrent, and collapses into a single [`SelectionState`] snapshot.
//! At most one selection is live: every attempt is tagged with a generation
//! and a stale attempt's results are dropped instead of written back.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Duration, Local, NaiveDate};
use futures::future::try_join_all;
use thiserror::Error;
use tokio::sync::watch;

use crate::geocode::{GeocodeError, Geocoder};
use crate::model::{
    Coordinate, CurrentConditions, HistoricalSample, Selection, SelectionState, UNKNOWN_LOCATION,
};
use crate::weather::{WeatherError, WeatherProvider};

/// Number of historical days fetched per selection, today included.
pub const HISTORY_DAYS: usize = 7;

/// User-visible failure of a selection attempt. Superseded attempts are not
/// errors; their results are discarded silently.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("no match found for \"{0}\"")]
    PlaceNotFound(String),

    #[error("error searching for location: {0}")]
    Geocode(#[from] GeocodeError),

    #[error("error fetching weather data: {0}")]
    Weather(#[from] WeatherError),
}

/// Owns the single live [`SelectionState`] and the lookups that produce it.
///
/// The state lives in a `watch` channel: the presentation layer subscribes
/// and always observes whole-value replacements, never partial updates.
#[derive(Debug)]
pub struct SelectionOrchestrator {
    geocoder: Arc<dyn Geocoder>,
    weather: Arc<dyn WeatherProvider>,
    generation: AtomicU64,
    state_tx: watch::Sender<SelectionState>,
    // Last published non-loading state, restored when an aggregation fails.
    // Its lock also serializes generation bumps with publishes so a stale
    // writer can never slip in between the check and the send.
    stable: Mutex<SelectionState>,
}

impl SelectionOrchestrator {
    pub fn new(geocoder: Arc<dyn Geocoder>, weather: Arc<dyn WeatherProvider>) -> Self {
        let (state_tx, _) = watch::channel(SelectionState::Empty);

        Self {
            geocoder,
            weather,
            generation: AtomicU64::new(0),
            state_tx,
            stable: Mutex::new(SelectionState::Empty),
        }
    }

    /// Subscribe to state replacements.
    pub fn subscribe(&self) -> watch::Receiver<SelectionState> {
        self.state_tx.subscribe()
    }

    /// Snapshot of the live state.
    pub fn current(&self) -> SelectionState {
        self.state_tx.borrow().clone()
    }

    /// Resolve a coordinate selection: place name, current conditions and the
    /// seven-day history, concurrently. Readiness gates on the weather
    /// lookups; the place name is best-effort.
    pub async fn select_by_coordinate(&self, coordinate: Coordinate) -> Result<(), SelectionError> {
        let (generation, prior) = self.begin(coordinate);
        self.resolve(generation, prior, coordinate, None).await
    }

    /// Resolve a place-name selection. Blank input is a no-op. On success the
    /// resolved coordinate is returned so the map view can recenter on it.
    pub async fn select_by_place_name(
        &self,
        name: &str,
    ) -> Result<Option<Coordinate>, SelectionError> {
        let query = name.trim();
        if query.is_empty() {
            return Ok(None);
        }

        // Geocode before touching the state: a miss must leave the previous
        // selection visible, with no loading flicker.
        let place = self
            .geocoder
            .forward_geocode(query)
            .await?
            .ok_or_else(|| SelectionError::PlaceNotFound(query.to_string()))?;

        let (generation, prior) = self.begin(place.coordinate);
        self.resolve(generation, prior, place.coordinate, Some(place.display_name)).await?;

        Ok(Some(place.coordinate))
    }

    /// Start a new attempt: bump the generation, remember the last stable
    /// state and publish `Loading` so stale data is never shown under the new
    /// pin. The remembered state is never `Loading` — a selection superseding
    /// an in-flight one must not revert to a loading screen nothing resolves.
    fn begin(&self, coordinate: Coordinate) -> (u64, SelectionState) {
        let stable = self.stable.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let prior = stable.clone();
        // send_replace stores the value whether or not anyone subscribed.
        self.state_tx.send_replace(SelectionState::Loading { coordinate });

        (generation, prior)
    }

    /// Publish `state` unless a newer selection has started since
    /// `generation` was issued. Returns whether the write happened.
    fn publish_if_current(&self, generation: u64, state: SelectionState) -> bool {
        let mut stable = self.stable.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }

        if !state.is_loading() {
            *stable = state.clone();
        }
        self.state_tx.send_replace(state);
        true
    }

    async fn resolve(
        &self,
        generation: u64,
        prior: SelectionState,
        coordinate: Coordinate,
        seeded_name: Option<String>,
    ) -> Result<(), SelectionError> {
        let today = Local::now().date_naive();
        let dates = history_dates(today);

        let name_fut = async {
            match seeded_name {
                // Forward geocoding already produced the canonical name.
                Some(name) => Some(name),
                None => match self.geocoder.reverse_geocode(coordinate).await {
                    Ok(name) => name,
                    Err(err) => {
                        tracing::warn!(%coordinate, %err, "reverse geocode failed, using fallback");
                        None
                    }
                },
            }
        };

        let weather_fut = async {
            let current_fut = self.weather.current_conditions(coordinate);
            let history_fut = try_join_all(
                dates.iter().map(|&date| self.weather.historical_average(coordinate, date)),
            );
            tokio::try_join!(current_fut, history_fut)
        };

        let (place_name, weather) = tokio::join!(name_fut, weather_fut);

        match weather {
            Ok((current, history)) => {
                let selection = assemble(coordinate, place_name, current, history);
                if self.publish_if_current(generation, SelectionState::Ready(selection)) {
                    tracing::debug!(%coordinate, "selection ready");
                } else {
                    tracing::debug!(%coordinate, generation, "dropping superseded selection");
                }
                Ok(())
            }
            Err(err) => {
                // No partial chart: back to whatever was shown before.
                if self.publish_if_current(generation, prior) {
                    Err(err.into())
                } else {
                    tracing::debug!(%coordinate, generation, "dropping superseded failure");
                    Ok(())
                }
            }
        }
    }
}

/// The target dates for the historical lookups, in the order the requests are
/// issued: offset `i` maps to `today - i` days, `i = 0..6`.
pub fn history_dates(today: NaiveDate) -> [NaiveDate; HISTORY_DAYS] {
    std::array::from_fn(|offset| today - Duration::days(offset as i64))
}

/// Pure merge of the independently-fetched pieces into a ready selection.
/// History is reordered oldest first, whatever order the responses arrived
/// in; a missing place name falls back to the sentinel.
fn assemble(
    coordinate: Coordinate,
    place_name: Option<String>,
    current: CurrentConditions,
    mut history: Vec<HistoricalSample>,
) -> Selection {
    history.sort_by_key(|sample| sample.date);

    Selection {
        coordinate,
        place_name: place_name.unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
        current,
        history,
    }
}
