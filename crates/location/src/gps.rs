//! Device positioning seam.

use std::time::Duration;

use async_trait::async_trait;
use pawalert_core::Coordinates;

use crate::error::PositionError;

/// Hard limit on a single position request.
pub const GPS_TIMEOUT: Duration = Duration::from_secs(10);

/// Parameters of a position request, mirroring the W3C options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest acceptable cached fix; zero forces a fresh one.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: GPS_TIMEOUT,
            maximum_age: Duration::ZERO,
        }
    }
}

/// Source of device positions (GPS or platform equivalent).
#[async_trait]
pub trait PositionProvider: Send + Sync {
    async fn current_position(&self, options: &PositionOptions)
        -> Result<Coordinates, PositionError>;
}

/// Always reports the same fix. Used when the host's position is
/// configured rather than measured.
pub struct StaticPositionProvider {
    coords: Coordinates,
}

impl StaticPositionProvider {
    pub fn new(coords: Coordinates) -> Self {
        Self { coords }
    }
}

#[async_trait]
impl PositionProvider for StaticPositionProvider {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinates, PositionError> {
        Ok(self.coords)
    }
}

/// Hosts without positioning hardware.
pub struct UnavailablePositionProvider;

#[async_trait]
impl PositionProvider for UnavailablePositionProvider {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinates, PositionError> {
        Err(PositionError::PositionUnavailable)
    }
}
