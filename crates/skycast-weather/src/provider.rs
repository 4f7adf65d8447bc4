//! Forecast fetch against the Open-Meteo forecast API.

use crate::types::{Forecast, Location, Stage, WeatherError};
use reqwest::Client;
use std::time::Duration;
use tracing::instrument;

pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const REVERSE_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/reverse";
pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m";
const HOURLY_FIELDS: &str = "temperature_2m,weather_code";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min";
const FORECAST_DAYS: &str = "7";

/// Endpoint URLs used by the weather flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub geocoding: String,
    pub reverse_geocoding: String,
    pub forecast: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocoding: GEOCODING_URL.to_string(),
            reverse_geocoding: REVERSE_GEOCODING_URL.to_string(),
            forecast: FORECAST_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// All endpoints under one base URL (used against mock servers).
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            geocoding: format!("{}/v1/search", base),
            reverse_geocoding: format!("{}/v1/reverse", base),
            forecast: format!("{}/v1/forecast", base),
        }
    }
}

/// Build the HTTP client shared by the resolver and the forecast client.
pub fn build_client(timeout: Duration) -> Result<Client, WeatherError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| WeatherError::Client(e.to_string()))
}

#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Client,
    url: String,
}

impl ForecastClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Fetch current, hourly and 7-day daily data for a location.
    #[instrument(skip(self, location), fields(name = %location.name), level = "info")]
    pub async fn fetch(&self, location: &Location) -> Result<Forecast, WeatherError> {
        let query = [
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("timezone", location.timezone_or_auto().to_string()),
            ("forecast_days", FORECAST_DAYS.to_string()),
        ];

        let response = self
            .client
            .get(&self.url)
            .query(&query)
            .send()
            .await
            .map_err(|e| WeatherError::network(Stage::Forecast, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Forecast returned status {}", status);
            return Err(WeatherError::network(
                Stage::Forecast,
                format!("HTTP {}", status),
            ));
        }

        let forecast: Forecast = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        tracing::info!(
            "Fetched forecast with {} daily entries",
            forecast.daily.time.len()
        );
        Ok(forecast)
    }
}
