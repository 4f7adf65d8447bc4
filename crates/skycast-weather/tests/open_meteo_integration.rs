//! Integration tests for the weather flow against a mock Open-Meteo server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use skycast_weather::{
    build_client, DeviceLocator, Endpoints, FixedPosition, ForecastClient, Location,
    LocationResolver, Stage, Status, WeatherError, WeatherFlow,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn endpoints(server: &MockServer) -> Endpoints {
    Endpoints::with_base(&server.uri())
}

fn resolver(server: &MockServer) -> LocationResolver {
    let endpoints = endpoints(server);
    let client = build_client(Duration::from_secs(5)).unwrap();
    LocationResolver::new(client, endpoints.geocoding, endpoints.reverse_geocoding)
}

fn flow(server: &MockServer) -> WeatherFlow {
    let client = build_client(Duration::from_secs(5)).unwrap();
    WeatherFlow::from_endpoints(client, &endpoints(server))
}

fn berlin_result() -> serde_json::Value {
    serde_json::json!({
        "results": [{
            "latitude": 52.52,
            "longitude": 13.41,
            "name": "Berlin",
            "country": "Germany",
            "admin1": "Land Berlin",
            "timezone": "Europe/Berlin"
        }]
    })
}

fn forecast_body() -> serde_json::Value {
    let days: Vec<String> = (0..7).map(|d| format!("2026-10-{:02}", 14 + d)).collect();
    let hours: Vec<String> = (0..7)
        .flat_map(|d| (0..24).map(move |h| format!("2026-10-{:02}T{:02}:00", 14 + d, h)))
        .collect();
    let temperatures = vec![11.0; hours.len()];
    let codes = vec![3; hours.len()];
    serde_json::json!({
        "timezone": "Europe/Berlin",
        "current": {
            "time": "2026-10-14T09:00",
            "temperature_2m": 12.3,
            "relative_humidity_2m": 81,
            "apparent_temperature": 10.9,
            "weather_code": 61,
            "wind_speed_10m": 14.2
        },
        "hourly": {
            "time": hours,
            "temperature_2m": temperatures,
            "weather_code": codes
        },
        "daily": {
            "time": days,
            "weather_code": [61, 0, 1, 2, 3, 45, 95],
            "temperature_2m_max": [14.0, 15.0, 16.0, 17.0, 18.0, 19.0, 20.0],
            "temperature_2m_min": [7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0]
        }
    })
}

async fn mount_forecast(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_search_sends_expected_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Berlin"))
        .and(query_param("count", "1"))
        .and(query_param("language", "en"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(berlin_result()))
        .expect(1)
        .mount(&server)
        .await;

    let location = resolver(&server).search(" Berlin ").await.unwrap();

    assert_eq!(location.name, "Berlin");
    assert_eq!(location.timezone, "Europe/Berlin");
    assert_eq!(location.display_label(), "Berlin, Land Berlin, Germany");
}

#[tokio::test]
async fn test_search_without_results_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let err = resolver(&server).search("Atlantis").await.unwrap_err();
    assert!(matches!(err, WeatherError::NotFound(ref q) if q == "Atlantis"));
    assert_eq!(err.user_message(), "No matching location found.");
}

#[tokio::test]
async fn test_search_server_error_is_network() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = resolver(&server).search("Berlin").await.unwrap_err();
    assert!(matches!(
        err,
        WeatherError::Network {
            stage: Stage::Geocode,
            ..
        }
    ));
}

#[tokio::test]
async fn test_reverse_keeps_device_coordinates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/reverse"))
        .and(query_param("latitude", "52.5"))
        .and(query_param("longitude", "13.4"))
        .and(query_param("count", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(berlin_result()))
        .mount(&server)
        .await;

    let location = resolver(&server).reverse(52.5, 13.4).await.unwrap();
    assert_eq!(location.latitude, 52.5);
    assert_eq!(location.longitude, 13.4);
    assert_eq!(location.name, "Berlin");
}

#[tokio::test]
async fn test_reverse_empty_results_gives_placeholder() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
        .mount(&server)
        .await;

    let location = resolver(&server).reverse(1.0, 2.0).await.unwrap();
    assert_eq!(location, Location::placeholder(1.0, 2.0));
}

#[tokio::test]
async fn test_forecast_sends_expected_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "52.52"))
        .and(query_param("longitude", "13.41"))
        .and(query_param(
            "current",
            "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m",
        ))
        .and(query_param("hourly", "temperature_2m,weather_code"))
        .and(query_param(
            "daily",
            "weather_code,temperature_2m_max,temperature_2m_min",
        ))
        .and(query_param("timezone", "auto"))
        .and(query_param("forecast_days", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(Duration::from_secs(5)).unwrap();
    let forecasts = ForecastClient::new(client, endpoints(&server).forecast);
    let mut location = Location::placeholder(52.52, 13.41);
    location.timezone = String::new();

    let forecast = forecasts.fetch(&location).await.unwrap();
    assert_eq!(forecast.daily.time.len(), 7);
    assert_eq!(forecast.current.weather_code, Some(61));
}

#[tokio::test]
async fn test_forecast_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = build_client(Duration::from_secs(5)).unwrap();
    let forecasts = ForecastClient::new(client, endpoints(&server).forecast);
    let err = forecasts
        .fetch(&Location::placeholder(0.0, 0.0))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Failed to fetch forecast data.");
}

#[tokio::test]
async fn test_flow_search_renders_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(berlin_result()))
        .mount(&server)
        .await;
    mount_forecast(&server).await;

    let mut flow = flow(&server);
    let view = flow.search("Berlin").await.unwrap();

    assert_eq!(view.current.location, "Berlin, Land Berlin, Germany");
    assert_eq!(view.current.summary, "Slight rain");
    assert_eq!(view.days.len(), 5);
    assert_eq!(view.days[0].summary, "Clear sky");
    assert_eq!(view.days[4].summary, "Fog");

    let state = flow.state();
    assert!(state.controls_enabled());
    assert!(state.status.message.is_empty());
    assert_eq!(state.result.as_ref(), Some(&view));
}

#[tokio::test]
async fn test_flow_failure_hides_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(berlin_result()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let mut flow = flow(&server);
    assert!(flow.search("Berlin").await.is_err());

    let state = flow.state();
    assert!(state.result.is_none());
    assert!(state.status.is_error);
    assert_eq!(state.status.message, "Failed to fetch forecast data.");
    assert!(state.controls_enabled());
}

#[tokio::test]
async fn test_current_location_survives_reverse_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/reverse"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_forecast(&server).await;

    let mut flow = flow(&server);
    let locator = DeviceLocator::new(FixedPosition::new(52.52, 13.41));
    let view = flow.search_current_location(&locator).await.unwrap();

    assert_eq!(view.current.location, "Current location");
    assert_eq!(flow.state().city_input, "Current location");
    assert!(flow.state().controls_enabled());
}

#[tokio::test]
async fn test_status_listener_sees_progress_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(berlin_result()))
        .mount(&server)
        .await;
    mount_forecast(&server).await;

    let seen: Arc<Mutex<Vec<Status>>> = Arc::default();
    let sink = seen.clone();
    let mut flow =
        flow(&server).with_status_listener(move |status| sink.lock().push(status.clone()));
    flow.search("Berlin").await.unwrap();

    let messages: Vec<String> = seen.lock().iter().map(|s| s.message.clone()).collect();
    assert_eq!(
        messages,
        ["Searching...", "Found Berlin. Loading forecast...", ""]
    );
    assert!(seen.lock().iter().all(|s| !s.is_error));
}
