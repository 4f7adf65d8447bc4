//! Forward and reverse geocoding via the Open-Meteo geocoding API.

use crate::types::{Location, Stage, WeatherError, AUTO_TIMEZONE, CURRENT_LOCATION};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Option<Vec<GeocodeResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    latitude: f64,
    longitude: f64,
    name: Option<String>,
    country: Option<String>,
    admin1: Option<String>,
    timezone: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct LocationResolver {
    client: Client,
    search_url: String,
    reverse_url: String,
}

impl LocationResolver {
    pub fn new(client: Client, search_url: impl Into<String>, reverse_url: impl Into<String>) -> Self {
        Self {
            client,
            search_url: search_url.into(),
            reverse_url: reverse_url.into(),
        }
    }

    /// Resolve a free-text place name to its best match.
    #[instrument(skip(self), level = "info")]
    pub async fn search(&self, name: &str) -> Result<Location, WeatherError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WeatherError::EmptyQuery);
        }

        let query = [
            ("name", name),
            ("count", "1"),
            ("language", "en"),
            ("format", "json"),
        ];
        let body = self.get(&self.search_url, &query, Stage::Geocode).await?;

        let best = body
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::NotFound(name.to_string()))?;

        let location = Location {
            latitude: best.latitude,
            longitude: best.longitude,
            name: best.name.unwrap_or_default(),
            admin1: best.admin1,
            country: best.country,
            timezone: non_blank(best.timezone).unwrap_or_else(|| AUTO_TIMEZONE.to_string()),
        };
        tracing::info!("Geocoded {:?} to {}", name, location.display_label());
        Ok(location)
    }

    /// Name a coordinate pair.
    ///
    /// An empty result set yields the "Current location" placeholder; request
    /// failures are returned as errors.
    #[instrument(skip(self), level = "info")]
    pub async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Location, WeatherError> {
        let lat = latitude.to_string();
        let lon = longitude.to_string();
        let query = [
            ("latitude", lat.as_str()),
            ("longitude", lon.as_str()),
            ("language", "en"),
            ("format", "json"),
            ("count", "1"),
        ];
        let body = self
            .get(&self.reverse_url, &query, Stage::ReverseGeocode)
            .await?;

        let Some(best) = body.results.unwrap_or_default().into_iter().next() else {
            tracing::debug!("Reverse geocode returned no results");
            return Ok(Location::placeholder(latitude, longitude));
        };

        // The device coordinates are kept; only naming comes from the match.
        Ok(Location {
            latitude,
            longitude,
            name: non_blank(best.name).unwrap_or_else(|| CURRENT_LOCATION.to_string()),
            admin1: best.admin1,
            country: best.country,
            timezone: non_blank(best.timezone).unwrap_or_else(|| AUTO_TIMEZONE.to_string()),
        })
    }

    /// Like [`reverse`](Self::reverse) but never fails.
    pub async fn reverse_or_placeholder(&self, latitude: f64, longitude: f64) -> Location {
        match self.reverse(latitude, longitude).await {
            Ok(location) => location,
            Err(e) => {
                tracing::warn!("Reverse geocode failed, using placeholder: {}", e);
                Location::placeholder(latitude, longitude)
            }
        }
    }

    async fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        stage: Stage,
    ) -> Result<GeocodeResponse, WeatherError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| WeatherError::network(stage, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} returned status {}", stage, status);
            return Err(WeatherError::network(stage, format!("HTTP {}", status)));
        }

        response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))
    }
}
