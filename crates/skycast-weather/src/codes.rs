//! WMO weather code lookups.
//! See: https://open-meteo.com/en/docs#weathervariables

use serde::{Deserialize, Serialize};

pub const UNKNOWN_SUMMARY: &str = "Weather details unavailable";
pub const UNKNOWN_FORECAST_SUMMARY: &str = "Forecast unavailable";
pub const UNKNOWN_ICON: &str = "🌈";

/// WMO weather interpretation code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherCode(pub i32);

impl WeatherCode {
    /// Description for a known code, `None` otherwise.
    pub fn description(self) -> Option<&'static str> {
        let text = match self.0 {
            0 => "Clear sky",
            1 => "Mainly clear",
            2 => "Partly cloudy",
            3 => "Overcast",
            45 => "Fog",
            48 => "Depositing rime fog",
            51 => "Light drizzle",
            53 => "Moderate drizzle",
            55 => "Dense drizzle",
            56 => "Light freezing drizzle",
            57 => "Dense freezing drizzle",
            61 => "Slight rain",
            63 => "Moderate rain",
            65 => "Heavy rain",
            66 => "Light freezing rain",
            67 => "Heavy freezing rain",
            71 => "Slight snowfall",
            73 => "Moderate snowfall",
            75 => "Heavy snowfall",
            77 => "Snow grains",
            80 => "Slight rain showers",
            81 => "Moderate rain showers",
            82 => "Violent rain showers",
            85 => "Slight snow showers",
            86 => "Heavy snow showers",
            95 => "Thunderstorm",
            96 => "Thunderstorm with slight hail",
            99 => "Thunderstorm with heavy hail",
            _ => return None,
        };
        Some(text)
    }

    /// Emoji icon, falling back to [`UNKNOWN_ICON`].
    pub fn icon(self) -> &'static str {
        match self.0 {
            0 => "☀️",
            1 | 2 => "🌤️",
            3 => "☁️",
            45 | 48 => "🌫️",
            51 | 53 | 55 | 56 | 57 | 61 | 63 | 65 => "🌧️",
            66 | 67 | 80 | 81 | 82 => "🌦️",
            71 | 73 | 75 | 77 | 85 | 86 => "❄️",
            95 | 96 | 99 => "⛈️",
            _ => UNKNOWN_ICON,
        }
    }

    /// Description for the current-conditions panel.
    pub fn summary(self) -> &'static str {
        self.description().unwrap_or(UNKNOWN_SUMMARY)
    }

    /// Description for a forecast day card.
    pub fn forecast_summary(self) -> &'static str {
        self.description().unwrap_or(UNKNOWN_FORECAST_SUMMARY)
    }
}

impl From<i32> for WeatherCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

/// Icon for an optional code, as found in partially populated series.
pub fn icon_for(code: Option<i32>) -> &'static str {
    code.map_or(UNKNOWN_ICON, |c| WeatherCode(c).icon())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: [i32; 28] = [
        0, 1, 2, 3, 45, 48, 51, 53, 55, 56, 57, 61, 63, 65, 66, 67, 71, 73, 75, 77, 80, 81, 82,
        85, 86, 95, 96, 99,
    ];

    #[test]
    fn test_every_known_code_has_description_and_icon() {
        for code in KNOWN {
            let code = WeatherCode(code);
            assert!(code.description().is_some(), "missing description for {:?}", code);
            assert_ne!(code.icon(), UNKNOWN_ICON, "missing icon for {:?}", code);
        }
    }

    #[test]
    fn test_specific_mappings() {
        assert_eq!(WeatherCode(0).summary(), "Clear sky");
        assert_eq!(WeatherCode(0).icon(), "☀️");
        assert_eq!(WeatherCode(48).summary(), "Depositing rime fog");
        assert_eq!(WeatherCode(66).icon(), "🌦️");
        assert_eq!(WeatherCode(77).icon(), "❄️");
        assert_eq!(WeatherCode(99).summary(), "Thunderstorm with heavy hail");
        assert_eq!(WeatherCode(99).icon(), "⛈️");
    }

    #[test]
    fn test_unknown_codes_fall_back() {
        for code in [-1, 4, 44, 100, 999] {
            let code = WeatherCode(code);
            assert_eq!(code.description(), None);
            assert_eq!(code.summary(), UNKNOWN_SUMMARY);
            assert_eq!(code.forecast_summary(), UNKNOWN_FORECAST_SUMMARY);
            assert_eq!(code.icon(), UNKNOWN_ICON);
        }
    }

    #[test]
    fn test_icon_for_missing_code() {
        assert_eq!(icon_for(None), UNKNOWN_ICON);
        assert_eq!(icon_for(Some(3)), "☁️");
    }
}
