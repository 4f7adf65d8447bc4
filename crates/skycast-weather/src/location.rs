//! Device position lookup with a request timeout and a reusable last fix.

use crate::types::LocationError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAXIMUM_AGE: Duration = Duration::from_secs(5 * 60);

/// Raw device coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    /// How long a single position request may take
    pub timeout: Duration,
    /// How old a previous fix may be and still be returned
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: DEFAULT_TIMEOUT,
            maximum_age: DEFAULT_MAXIMUM_AGE,
        }
    }
}

/// Source of device coordinates.
pub trait PositionProvider: Send + Sync {
    fn current_position(
        &self,
        options: &PositionOptions,
    ) -> impl Future<Output = Result<Coordinates, LocationError>> + Send;

    fn is_available(&self) -> bool {
        true
    }
}

/// Coordinates configured up front (command line or config file).
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

impl FixedPosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self(Coordinates {
            latitude,
            longitude,
            accuracy_meters: None,
        })
    }
}

impl PositionProvider for FixedPosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// `None` stands for a host without any positioning capability.
impl<P: PositionProvider> PositionProvider for Option<P> {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinates, LocationError> {
        match self {
            Some(provider) => provider.current_position(options).await,
            None => Err(LocationError::Unsupported),
        }
    }

    fn is_available(&self) -> bool {
        self.as_ref().is_some_and(PositionProvider::is_available)
    }
}

pub struct DeviceLocator<P> {
    provider: P,
    options: PositionOptions,
    last_fix: Mutex<Option<(Coordinates, Instant)>>,
}

impl<P: PositionProvider> DeviceLocator<P> {
    pub fn new(provider: P) -> Self {
        Self::with_options(provider, PositionOptions::default())
    }

    pub fn with_options(provider: P, options: PositionOptions) -> Self {
        Self {
            provider,
            options,
            last_fix: Mutex::new(None),
        }
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_available()
    }

    pub fn options(&self) -> &PositionOptions {
        &self.options
    }

    fn fresh_fix(&self) -> Option<Coordinates> {
        let guard = self.last_fix.lock();
        let (coords, at) = guard.as_ref()?;
        (at.elapsed() <= self.options.maximum_age).then_some(*coords)
    }

    /// Current coordinates, reusing a fix up to `maximum_age` old.
    pub async fn locate(&self) -> Result<Coordinates, LocationError> {
        if let Some(coords) = self.fresh_fix() {
            tracing::debug!("Reusing cached position fix");
            return Ok(coords);
        }

        let coords = tokio::time::timeout(
            self.options.timeout,
            self.provider.current_position(&self.options),
        )
        .await
        .map_err(|_| LocationError::Timeout)??;

        tracing::info!("Got location: {}, {}", coords.latitude, coords.longitude);
        *self.last_fix.lock() = Some((coords, Instant::now()));
        Ok(coords)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Counting {
        calls: AtomicU32,
    }

    impl PositionProvider for Counting {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Coordinates, LocationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Coordinates {
                latitude: 1.0,
                longitude: 2.0,
                accuracy_meters: Some(5.0),
            })
        }
    }

    struct Hanging;

    impl PositionProvider for Hanging {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Coordinates, LocationError> {
            std::future::pending().await
        }
    }

    struct Denied;

    impl PositionProvider for Denied {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Coordinates, LocationError> {
            Err(LocationError::from_code(1))
        }
    }

    #[test]
    fn test_default_options() {
        let options = PositionOptions::default();
        assert!(options.high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.maximum_age, Duration::from_secs(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_provider_times_out() {
        let locator = DeviceLocator::new(Hanging);
        let err = locator.locate().await.unwrap_err();
        assert_eq!(err, LocationError::Timeout);
    }

    #[tokio::test]
    async fn test_provider_error_passes_through() {
        let locator = DeviceLocator::new(Denied);
        assert_eq!(locator.locate().await.unwrap_err(), LocationError::PermissionDenied);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fix_reused_within_maximum_age() {
        let locator = DeviceLocator::new(Counting {
            calls: AtomicU32::new(0),
        });

        locator.locate().await.unwrap();
        tokio::time::advance(Duration::from_secs(299)).await;
        locator.locate().await.unwrap();
        assert_eq!(locator.provider.calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        locator.locate().await.unwrap();
        assert_eq!(locator.provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_provider_is_unsupported() {
        let locator = DeviceLocator::new(None::<FixedPosition>);
        assert!(!locator.is_available());
        assert_eq!(locator.locate().await.unwrap_err(), LocationError::Unsupported);
    }

    #[tokio::test]
    async fn test_present_provider_delegates() {
        let locator = DeviceLocator::new(Some(FixedPosition::new(3.0, 4.0)));
        assert!(locator.is_available());
        assert_eq!(locator.locate().await.unwrap().latitude, 3.0);
    }
}
