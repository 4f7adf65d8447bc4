//! Weather lookup flow: sequential requests plus the panel state they drive.

use crate::geocode::LocationResolver;
use crate::location::{DeviceLocator, PositionProvider};
use crate::provider::{Endpoints, ForecastClient};
use crate::render::{render, WeatherView};
use crate::types::{LocationError, WeatherError};
use reqwest::Client;

pub const SEARCH_LABEL: &str = "Get Forecast";
pub const LOCATION_LABEL: &str = "Use my location";

/// What the panel is currently busy with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Searching,
    Locating,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    pub is_error: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelState {
    pub status: Status,
    pub busy: Option<Activity>,
    pub result: Option<WeatherView>,
    pub city_input: String,
}

impl PanelState {
    /// Submit controls accept input only while idle.
    pub fn controls_enabled(&self) -> bool {
        self.busy.is_none()
    }

    pub fn search_label(&self) -> &'static str {
        if self.busy.is_some() {
            "Loading..."
        } else {
            SEARCH_LABEL
        }
    }

    pub fn location_label(&self) -> &'static str {
        match self.busy {
            Some(Activity::Locating) => "Locating...",
            _ => LOCATION_LABEL,
        }
    }
}

/// Called with every status change, including the final clear.
pub type StatusListener = Box<dyn Fn(&Status) + Send + Sync>;

pub struct WeatherFlow {
    resolver: LocationResolver,
    forecasts: ForecastClient,
    state: PanelState,
    listener: Option<StatusListener>,
}

impl WeatherFlow {
    pub fn new(resolver: LocationResolver, forecasts: ForecastClient) -> Self {
        Self {
            resolver,
            forecasts,
            state: PanelState::default(),
            listener: None,
        }
    }

    pub fn with_status_listener(
        mut self,
        listener: impl Fn(&Status) + Send + Sync + 'static,
    ) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn from_endpoints(client: Client, endpoints: &Endpoints) -> Self {
        Self::new(
            LocationResolver::new(
                client.clone(),
                endpoints.geocoding.clone(),
                endpoints.reverse_geocoding.clone(),
            ),
            ForecastClient::new(client, endpoints.forecast.clone()),
        )
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    fn set_status(&mut self, message: impl Into<String>, is_error: bool) {
        self.state.status = Status {
            message: message.into(),
            is_error,
        };
        tracing::debug!("Status: {:?}", self.state.status);
        if let Some(listener) = &self.listener {
            listener(&self.state.status);
        }
    }

    fn begin(&mut self, activity: Activity, message: &str) {
        self.state.busy = Some(activity);
        self.state.result = None;
        self.set_status(message, false);
    }

    fn finish(
        &mut self,
        outcome: Result<WeatherView, WeatherError>,
    ) -> Result<WeatherView, WeatherError> {
        self.state.busy = None;
        match outcome {
            Ok(view) => {
                self.state.result = Some(view.clone());
                self.set_status("", false);
                Ok(view)
            }
            Err(e) => {
                tracing::error!("Weather lookup failed: {}", e);
                self.state.result = None;
                self.set_status(e.user_message(), true);
                Err(e)
            }
        }
    }

    /// Geocode `city`, then fetch and render its forecast.
    pub async fn search(&mut self, city: &str) -> Result<WeatherView, WeatherError> {
        let city = city.trim();
        self.state.city_input = city.to_string();
        if city.is_empty() {
            self.state.result = None;
            self.set_status(WeatherError::EmptyQuery.user_message(), true);
            return Err(WeatherError::EmptyQuery);
        }

        self.begin(Activity::Searching, "Searching...");
        let outcome: Result<WeatherView, WeatherError> = async {
            let location = self.resolver.search(city).await?;
            self.set_status(format!("Found {}. Loading forecast...", location.name), false);
            let forecast = self.forecasts.fetch(&location).await?;
            Ok(render(&location, &forecast))
        }
        .await;

        self.finish(outcome)
    }

    /// Locate the device, name the spot (best effort), then fetch its forecast.
    pub async fn search_current_location<P: PositionProvider>(
        &mut self,
        locator: &DeviceLocator<P>,
    ) -> Result<WeatherView, WeatherError> {
        if !locator.is_available() {
            let err = WeatherError::Location(LocationError::Unsupported);
            self.set_status(err.user_message(), true);
            return Err(err);
        }

        self.begin(Activity::Locating, "Determining your location...");
        let outcome: Result<(String, WeatherView), WeatherError> = async {
            let coords = locator.locate().await?;
            let location = self
                .resolver
                .reverse_or_placeholder(coords.latitude, coords.longitude)
                .await;
            self.set_status(format!("Loading weather for {}...", location.name), false);
            let forecast = self.forecasts.fetch(&location).await?;
            Ok((location.name.clone(), render(&location, &forecast)))
        }
        .await;

        let outcome = outcome.map(|(name, view)| {
            self.state.city_input = name;
            view
        });
        self.finish(outcome)
    }
}
