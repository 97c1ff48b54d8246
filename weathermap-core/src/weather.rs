use crate::model::{Coordinate, CurrentConditions, HistoricalSample};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;
use thiserror::Error;

pub mod weatherapi;

/// Errors from the weather service.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Failed to reach weather service: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Weather service returned status {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },

    #[error("Failed to parse weather service response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Weather service response was missing {0}")]
    MissingData(&'static str),
}

/// Weather lookups for a coordinate: current conditions and the day-average
/// temperature for a given calendar date.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_conditions(
        &self,
        coordinate: Coordinate,
    ) -> Result<CurrentConditions, WeatherError>;

    async fn historical_average(
        &self,
        coordinate: Coordinate,
        date: NaiveDate,
    ) -> Result<HistoricalSample, WeatherError>;
}

/// Keep non-JSON error bodies readable in logs and messages.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    // Error bodies are arbitrary service text; don't slice mid-character.
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
