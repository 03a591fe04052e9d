//! Ordered-fallback location resolution.
//!
//! Strategies, each tried only when the previous one failed:
//!
//! 1. Device position (high accuracy, 10 s timeout, no cached fix).
//! 2. IP geolocation.
//! 3. [`DEV_DEFAULT_COORDINATES`], in development only.
//!
//! When everything fails the user sees the message for the *device*
//! failure, since that is the one they can act on.
//!
//! Every call runs the chain independently; concurrent calls are not
//! merged and a running lookup cannot be cancelled.

use std::sync::Arc;

use pawalert_core::{Coordinates, Environment, LocationResult, LocationSource};

use crate::error::PositionError;
use crate::gps::{PositionOptions, PositionProvider};
use crate::ip::IpLocator;

/// Reference point used by development builds (Puerta del Sol, Madrid).
pub const DEV_DEFAULT_COORDINATES: Coordinates = Coordinates::new(40.416775, -3.703790);

pub struct LocationResolver {
    gps: Option<Arc<dyn PositionProvider>>,
    ip: Arc<dyn IpLocator>,
    environment: Environment,
    options: PositionOptions,
}

impl LocationResolver {
    /// `gps` is `None` on devices without any positioning support.
    pub fn new(
        gps: Option<Arc<dyn PositionProvider>>,
        ip: Arc<dyn IpLocator>,
        environment: Environment,
    ) -> Self {
        Self {
            gps,
            ip,
            environment,
            options: PositionOptions::default(),
        }
    }

    pub fn with_position_options(mut self, options: PositionOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the fallback chain once.
    pub async fn detect_location(&self) -> LocationResult {
        let gps_error = match self.device_position().await {
            Ok(coords) => {
                tracing::debug!(?coords, "Location resolved from device");
                return LocationResult::found(coords, LocationSource::Gps);
            }
            Err(e) => {
                tracing::warn!(error = %e, code = ?e.code(), "Device position failed, trying IP geolocation");
                e
            }
        };

        match self.ip.locate().await {
            Ok(coords) => {
                tracing::debug!(?coords, "Location resolved from IP");
                return LocationResult::found(coords, LocationSource::Ip);
            }
            Err(e) => tracing::warn!(error = %e, "IP geolocation failed"),
        }

        if self.environment.is_development() {
            tracing::info!("Using development default location");
            return LocationResult::found(DEV_DEFAULT_COORDINATES, LocationSource::DevDefault);
        }

        LocationResult::failed(gps_error.user_message())
    }

    async fn device_position(&self) -> Result<Coordinates, PositionError> {
        let Some(gps) = &self.gps else {
            return Err(PositionError::Unsupported);
        };

        match tokio::time::timeout(self.options.timeout, gps.current_position(&self.options)).await
        {
            Ok(result) => result,
            Err(_) => Err(PositionError::Timeout),
        }
    }
}
