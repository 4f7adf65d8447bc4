//! Weather lookup for SkyCast
//!
//! Geocodes place names, fetches forecasts from the Open-Meteo API and
//! renders them into a display-ready view.

pub mod codes;
pub mod flow;
pub mod geocode;
pub mod location;
pub mod provider;
pub mod render;
pub mod types;

pub use codes::WeatherCode;
pub use flow::{Activity, PanelState, Status, WeatherFlow};
pub use geocode::LocationResolver;
pub use location::{
    Coordinates, DeviceLocator, FixedPosition, PositionOptions, PositionProvider,
};
pub use provider::{build_client, Endpoints, ForecastClient};
pub use render::{render, CurrentPanel, DayCard, HourlySlot, WeatherView};
pub use types::*;
