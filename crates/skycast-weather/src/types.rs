use serde::{Deserialize, Serialize};
use std::fmt;

/// Timezone marker telling the forecast API to infer the zone from coordinates.
pub const AUTO_TIMEZONE: &str = "auto";

/// Name used when a place cannot be resolved for a coordinate pair.
pub const CURRENT_LOCATION: &str = "Current location";

/// Resolved geographic location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub admin1: Option<String>,
    pub country: Option<String>,
    pub timezone: String,
}

impl Location {
    /// Placeholder for coordinates that reverse geocoding could not name.
    pub fn placeholder(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            name: CURRENT_LOCATION.to_string(),
            admin1: None,
            country: None,
            timezone: AUTO_TIMEZONE.to_string(),
        }
    }

    /// Timezone to request forecasts in; blank means infer from coordinates.
    pub fn timezone_or_auto(&self) -> &str {
        if self.timezone.trim().is_empty() {
            AUTO_TIMEZONE
        } else {
            &self.timezone
        }
    }

    /// Human-readable label, e.g. "Paris, Île-de-France, France".
    ///
    /// The region is skipped when it repeats the name, and the country when
    /// it repeats the region.
    pub fn display_label(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if !self.name.is_empty() {
            parts.push(&self.name);
        }
        let admin1 = self.admin1.as_deref().filter(|a| !a.is_empty());
        if let Some(region) = admin1 {
            if region != self.name {
                parts.push(region);
            }
        }
        if let Some(country) = self.country.as_deref().filter(|c| !c.is_empty()) {
            if Some(country) != admin1 {
                parts.push(country);
            }
        }

        if parts.is_empty() {
            CURRENT_LOCATION.to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Current conditions snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub time: Option<String>,
    pub temperature_2m: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub wind_speed_10m: Option<f64>,
    pub weather_code: Option<i32>,
}

/// Hourly series; all vectors are index-aligned with `time`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub weather_code: Vec<Option<i32>>,
}

/// Daily series; all vectors are index-aligned with `time`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub weather_code: Vec<Option<i32>>,
}

/// Forecast payload as returned by the forecast endpoint.
///
/// Only presence is checked; any missing block renders as unavailable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub current: CurrentConditions,
    #[serde(default)]
    pub hourly: Option<HourlySeries>,
    #[serde(default)]
    pub daily: DailySeries,
}

/// Which request in the weather flow failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Geocode,
    ReverseGeocode,
    Forecast,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Geocode => write!(f, "geocode"),
            Stage::ReverseGeocode => write!(f, "reverse geocode"),
            Stage::Forecast => write!(f, "forecast"),
        }
    }
}

/// Device location errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location position unavailable")]
    PositionUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Geolocation is not supported")]
    Unsupported,
    #[error("Location error: {0}")]
    Other(String),
}

impl LocationError {
    /// Map a geolocation error code (1 denied, 2 unavailable, 3 timeout).
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            other => Self::Other(format!("unknown geolocation error code {}", other)),
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Location permission denied. Please allow access to use this feature."
            }
            Self::PositionUnavailable => "Unable to determine your position. Please try again.",
            Self::Timeout => "Location request timed out. Please try again.",
            Self::Unsupported => "Geolocation is not supported on this device.",
            Self::Other(_) => "Unable to fetch weather for your current location.",
        }
    }
}

/// Weather flow errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("{stage} request failed: {reason}")]
    Network { stage: Stage, reason: String },
    #[error("No location matches {0:?}")]
    NotFound(String),
    #[error("Empty search query")]
    EmptyQuery,
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("HTTP client error: {0}")]
    Client(String),
    #[error("Location error: {0}")]
    Location(#[from] LocationError),
}

impl WeatherError {
    pub(crate) fn network(stage: Stage, reason: impl fmt::Display) -> Self {
        Self::Network {
            stage,
            reason: reason.to_string(),
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network {
                stage: Stage::Geocode,
                ..
            } => "Failed to fetch location information.",
            Self::Network {
                stage: Stage::ReverseGeocode,
                ..
            } => "Unable to resolve your location name.",
            Self::Network {
                stage: Stage::Forecast,
                ..
            } => "Failed to fetch forecast data.",
            Self::NotFound(_) => "No matching location found.",
            Self::EmptyQuery => "Please enter a city name.",
            Self::Parse(_) | Self::Client(_) => "Sorry, something went wrong.",
            Self::Location(e) => e.user_message(),
        }
    }
}
