use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::model::{Coordinate, CurrentConditions, HistoricalSample};

use super::{WeatherError, WeatherProvider, truncate_body};

const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Weather adapter backed by WeatherAPI.com.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), http }
    }

    /// Point the provider at a different endpoint, e.g. a mock server in tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let res = self.http.get(&url).query(query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::debug!(%status, endpoint, "weather request failed");
            return Err(WeatherError::Status { status, body: truncate_body(&body) });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaCurrentResponse {
    current: WaCurrent,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    avgtemp_c: f64,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    day: WaDay,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaHistoryResponse {
    forecast: WaForecast,
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn current_conditions(
        &self,
        coordinate: Coordinate,
    ) -> Result<CurrentConditions, WeatherError> {
        let q = coordinate.as_query();
        let parsed: WaCurrentResponse = self
            .get_json("current.json", &[("key", self.api_key.as_str()), ("q", q.as_str())])
            .await?;

        Ok(CurrentConditions {
            temperature_c: parsed.current.temp_c,
            condition: parsed.current.condition.text,
            icon: parsed.current.condition.icon,
        })
    }

    async fn historical_average(
        &self,
        coordinate: Coordinate,
        date: NaiveDate,
    ) -> Result<HistoricalSample, WeatherError> {
        let q = coordinate.as_query();
        let dt = date.format("%Y-%m-%d").to_string();

        let parsed: WaHistoryResponse = self
            .get_json(
                "history.json",
                &[("key", self.api_key.as_str()), ("q", q.as_str()), ("dt", dt.as_str())],
            )
            .await?;

        let day = parsed
            .forecast
            .forecastday
            .first()
            .ok_or(WeatherError::MissingData("forecastday data"))?;

        Ok(HistoricalSample { date, avg_temperature_c: day.day.avgtemp_c })
    }
}
