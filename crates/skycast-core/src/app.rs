use reqwest::Client;
use skycast_auth::{
    DirectoryService, Exporter, FileAccess, FileStore, FixedPathPicker, KeyValueStore, Theme,
    ThemePreference,
};
use skycast_weather::{build_client, DeviceLocator, FixedPosition, WeatherFlow};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::AppError;
use crate::Config;

/// Wires configuration, local storage and HTTP into the SkyCast services
pub struct App {
    config: Arc<Config>,
    http: Client,
    directory: DirectoryService,
    theme: ThemePreference,
}

impl App {
    /// Create an app backed by the file store named in `config`
    pub fn new(config: Config) -> Result<Self, AppError> {
        let store = Arc::new(FileStore::new(config.storage_path()));
        tracing::debug!("Local store at {:?}", store.path());
        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Arc<dyn KeyValueStore>) -> Result<Self, AppError> {
        let http = build_client(config.weather.request_timeout())?;
        let directory =
            DirectoryService::with_client(store.clone(), config.baseline_source(), http.clone());

        tracing::debug!("App ready with config dir {:?}", config.config_dir);

        Ok(Self {
            config: Arc::new(config),
            http,
            directory,
            theme: ThemePreference::new(store),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn directory(&self) -> &DirectoryService {
        &self.directory
    }

    pub fn weather_flow(&self) -> WeatherFlow {
        WeatherFlow::from_endpoints(self.http.clone(), &self.config.weather.endpoints())
    }

    /// Locator for `here`: explicit coordinates win over the configured default.
    pub fn locator(&self, coordinates: Option<(f64, f64)>) -> DeviceLocator<Option<FixedPosition>> {
        let provider = coordinates
            .map(|(lat, lon)| FixedPosition::new(lat, lon))
            .or_else(|| self.config.weather.default_position());
        DeviceLocator::with_options(provider, self.config.weather.position_options())
    }

    /// Exporter writing to `target` when given, otherwise without file access.
    pub fn exporter(&self, target: Option<PathBuf>) -> Exporter {
        let access = match target {
            Some(path) => FileAccess::SavePicker(Box::new(FixedPathPicker(path))),
            None => FileAccess::Unsupported,
        };
        Exporter::new(access)
    }

    fn prefers_dark(&self) -> impl Fn() -> bool {
        let dark = self.config.ui.dark_mode;
        move || dark
    }

    pub fn theme(&self) -> Result<Theme, AppError> {
        Ok(self.theme.current(&self.prefers_dark())?)
    }

    pub fn toggle_theme(&self) -> Result<Theme, AppError> {
        Ok(self.theme.toggle(&self.prefers_dark())?)
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), AppError> {
        Ok(self.theme.apply(theme)?)
    }
}
