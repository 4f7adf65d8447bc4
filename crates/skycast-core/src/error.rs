//! Top-level error type for the SkyCast binary.
//!
//! Each domain crate owns its own error enum; `AppError` wraps them so the
//! command line can print one user-facing message regardless of origin.

use skycast_auth::{AuthError, ExportError, StorageError};
use skycast_weather::{LocationError, WeatherError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Process exit status for input the user can correct.
pub const EXIT_INPUT: i32 = 2;
/// Process exit status for every other failure.
pub const EXIT_FAILURE: i32 = 1;

impl AppError {
    /// Exit status: [`EXIT_INPUT`] for rejected input, [`EXIT_FAILURE`] otherwise.
    pub fn exit_code(&self) -> i32 {
        let input = match self {
            AppError::Auth(e) => e.is_input_error(),
            AppError::Export(ExportError::Auth(e)) => e.is_input_error(),
            AppError::Weather(WeatherError::EmptyQuery | WeatherError::NotFound(_)) => true,
            _ => false,
        };
        if input {
            EXIT_INPUT
        } else {
            EXIT_FAILURE
        }
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => e.user_message().to_string(),
            AppError::Weather(e) => e.user_message().to_string(),
            AppError::Location(e) => e.user_message().to_string(),
            AppError::Auth(e) => e.user_message(),
            AppError::Export(e) => e.user_message(),
            AppError::Storage(e) => e.user_message().to_string(),
            AppError::Io(_) => "A file operation failed. Please try again.".to_string(),
            AppError::Other(e) => match e.downcast_ref::<ConfigError>() {
                Some(config) => config.user_message().to_string(),
                None => "An unexpected error occurred. Please try again.".to_string(),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}
