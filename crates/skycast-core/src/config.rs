use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use skycast_auth::BaselineSource;
use skycast_weather::provider::{FORECAST_URL, GEOCODING_URL, REVERSE_GEOCODING_URL};
use skycast_weather::{Endpoints, FixedPosition, PositionOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Warnings alone still count as valid
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding `config.toml` and the local store; set on load
    #[serde(skip)]
    pub config_dir: PathBuf,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub geocoding_url: String,
    pub reverse_geocoding_url: String,
    pub forecast_url: String,

    /// Per-request HTTP timeout in seconds
    pub request_timeout_secs: u64,

    /// How long a position request may take, in seconds
    pub location_timeout_secs: u64,

    /// How old a reused position fix may be, in seconds
    pub location_max_age_secs: u64,

    /// Coordinates reported as the device position by `here`
    pub default_latitude: Option<f64>,
    pub default_longitude: Option<f64>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        let options = PositionOptions::default();
        Self {
            geocoding_url: GEOCODING_URL.to_string(),
            reverse_geocoding_url: REVERSE_GEOCODING_URL.to_string(),
            forecast_url: FORECAST_URL.to_string(),
            request_timeout_secs: 15,
            location_timeout_secs: options.timeout.as_secs(),
            location_max_age_secs: options.maximum_age.as_secs(),
            default_latitude: None,
            default_longitude: None,
        }
    }
}

impl WeatherConfig {
    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            geocoding: self.geocoding_url.clone(),
            reverse_geocoding: self.reverse_geocoding_url.clone(),
            forecast: self.forecast_url.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn position_options(&self) -> PositionOptions {
        PositionOptions {
            timeout: Duration::from_secs(self.location_timeout_secs),
            maximum_age: Duration::from_secs(self.location_max_age_secs),
            ..PositionOptions::default()
        }
    }

    /// Configured coordinates, if both halves are present.
    pub fn default_position(&self) -> Option<FixedPosition> {
        match (self.default_latitude, self.default_longitude) {
            (Some(lat), Some(lon)) => Some(FixedPosition::new(lat, lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Baseline user list: an http(s) URL or a path relative to the config dir
    pub users_source: String,

    /// File name of the local key-value store inside the config dir
    pub storage_file: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            users_source: "users.json".to_string(),
            storage_file: "storage.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// System dark-mode preference used when no theme has been stored
    pub dark_mode: bool,
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("skycast")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            weather: WeatherConfig::default(),
            auth: AuthConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    /// Load from the platform config directory, creating defaults if absent
    pub fn load() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::MissingSetting("platform config directory".into()))?
            .join("skycast");
        Self::load_from(&config_dir)
    }

    /// Load `config.toml` from `config_dir`, writing a default one if absent
    pub fn load_from(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            let config = Self {
                config_dir: config_dir.to_path_buf(),
                ..Self::default()
            };
            config.save()?;
            tracing::info!("Wrote default config to {:?}", config_path);
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .context("Failed to parse config file")?;
        config.config_dir = config_dir.to_path_buf();

        Ok(config)
    }

    /// Load and validate; errors abort, warnings are logged
    pub fn load_validated(config_dir: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = match config_dir {
            Some(dir) => Self::load_from(dir)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.geocoding_url, "weather.geocoding_url", &mut result);
        self.validate_url(
            &self.weather.reverse_geocoding_url,
            "weather.reverse_geocoding_url",
            &mut result,
        );
        self.validate_url(&self.weather.forecast_url, "weather.forecast_url", &mut result);

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if self.weather.location_timeout_secs == 0 {
            result.add_error(
                "weather.location_timeout_secs",
                "Location timeout must be greater than 0",
            );
        }

        match (self.weather.default_latitude, self.weather.default_longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    result.add_error("weather.default_latitude", "Latitude must be within -90..90");
                }
                if !(-180.0..=180.0).contains(&lon) {
                    result.add_error(
                        "weather.default_longitude",
                        "Longitude must be within -180..180",
                    );
                }
            }
            (None, None) => {}
            _ => result.add_warning(
                "weather.default_latitude",
                "Both default_latitude and default_longitude are needed; ignoring",
            ),
        }

        match self.baseline_source() {
            BaselineSource::Url(url) => {
                self.validate_url(&url, "auth.users_source", &mut result);
            }
            BaselineSource::File(path) if !path.exists() => {
                result.add_warning(
                    "auth.users_source",
                    format!("Path does not exist: {}", path.display()),
                );
            }
            _ => {}
        }

        if self.auth.storage_file.trim().is_empty() {
            result.add_error("auth.storage_file", "Storage file name must not be empty");
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Where the baseline user list is read from.
    pub fn baseline_source(&self) -> BaselineSource {
        match BaselineSource::parse(&self.auth.users_source) {
            BaselineSource::File(path) if path.is_relative() => {
                BaselineSource::File(self.config_dir.join(path))
            }
            other => other,
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        self.config_dir.join(&self.auth.storage_file)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = self.config_dir.join(CONFIG_FILE_NAME);

        std::fs::create_dir_all(&self.config_dir).context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.weather.forecast_url = "ftp://example.com/forecast".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "weather.forecast_url"
            && e.message.contains("http or https")));
    }

    #[test]
    fn test_zero_timeout_is_error() {
        let mut config = Config::default();
        config.weather.request_timeout_secs = 0;
        let result = config.validate();
        assert!(result
            .errors
            .iter()
            .any(|e| e.field == "weather.request_timeout_secs"));
    }

    #[test]
    fn test_half_coordinates_warn_and_are_ignored() {
        let mut config = Config::default();
        config.weather.default_latitude = Some(52.5);
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "weather.default_latitude"));
        assert!(config.weather.default_position().is_none());
    }

    #[test]
    fn test_out_of_range_latitude() {
        let mut config = Config::default();
        config.weather.default_latitude = Some(91.0);
        config.weather.default_longitude = Some(0.0);
        assert!(!config.validate().is_valid());
    }

    #[test]
    fn test_relative_users_source_resolves_against_config_dir() {
        let config = Config {
            config_dir: PathBuf::from("/tmp/skycast-test"),
            ..Config::default()
        };
        match config.baseline_source() {
            BaselineSource::File(path) => {
                assert_eq!(path, PathBuf::from("/tmp/skycast-test/users.json"))
            }
            other => panic!("unexpected source {:?}", other),
        }
        assert_eq!(
            config.storage_path(),
            PathBuf::from("/tmp/skycast-test/storage.json")
        );
    }

    #[test]
    fn test_url_users_source_kept() {
        let mut config = Config::default();
        config.auth.users_source = "https://example.com/users.json".to_string();
        assert!(matches!(config.baseline_source(), BaselineSource::Url(_)));
    }

    #[test]
    fn test_load_from_writes_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();

        let created = Config::load_from(dir.path()).unwrap();
        assert!(dir.path().join(CONFIG_FILE_NAME).exists());
        assert_eq!(created.config_dir, dir.path());

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[ui]\ndark_mode = true\n\n[weather]\nrequest_timeout_secs = 3\n",
        )
        .unwrap();
        let loaded = Config::load_from(dir.path()).unwrap();
        assert!(loaded.ui.dark_mode);
        assert_eq!(loaded.weather.request_timeout(), Duration::from_secs(3));
        assert_eq!(loaded.weather.forecast_url, FORECAST_URL);
        assert_eq!(loaded.auth.storage_file, "storage.json");
    }

    #[test]
    fn test_malformed_config_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[ui\n").unwrap();
        let err = Config::load_from(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_load_validated_rejects_bad_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[weather]\ngeocoding_url = \"not a url\"\n",
        )
        .unwrap();
        let err = Config::load_validated(Some(dir.path())).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_position_options_from_config() {
        let mut config = Config::default();
        config.weather.location_timeout_secs = 4;
        let options = config.weather.position_options();
        assert_eq!(options.timeout, Duration::from_secs(4));
        assert_eq!(options.maximum_age, Duration::from_secs(300));
        assert!(options.high_accuracy);
    }
}
