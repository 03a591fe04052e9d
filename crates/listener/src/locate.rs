//! Startup location lookup with an on-disk fallback.

use std::sync::Arc;

use pawalert_core::LocationResult;
use pawalert_location::{
    IpApiLocator, LocationCache, LocationResolver, PositionProvider, StaticPositionProvider,
    UnavailablePositionProvider,
};

use crate::config::ListenerConfig;

/// Build the resolver for this host.
///
/// A configured GPS fix stands in for device positioning; without one
/// the host has no positioning hardware and reports the position as
/// unavailable.
pub fn build_resolver(config: &ListenerConfig) -> LocationResolver {
    let gps: Arc<dyn PositionProvider> = match config.gps_fix {
        Some(coords) => Arc::new(StaticPositionProvider::new(coords)),
        None => Arc::new(UnavailablePositionProvider),
    };
    let ip = Arc::new(IpApiLocator::with_url(config.ip_geolocation_url.clone()));

    LocationResolver::new(Some(gps), ip, config.environment)
}

/// Resolve the current location once.
///
/// A successful lookup refreshes `cache`. A failed one falls back to the
/// cached result when there is one, otherwise the failure is returned.
pub async fn resolve_location(
    resolver: &LocationResolver,
    cache: Option<&LocationCache>,
) -> LocationResult {
    let result = resolver.detect_location().await;

    let Some(cache) = cache else {
        return result;
    };

    if result.coordinates().is_some() {
        if let Err(e) = cache.store(&result).await {
            tracing::warn!(path = %cache.path().display(), error = %e, "Failed to write location cache");
        }
        return result;
    }

    match cache.load().await {
        Some(cached) => {
            tracing::info!(
                saved_at = %cached.saved_at,
                source = ?cached.result.source,
                "Using cached location",
            );
            cached.result
        }
        None => result,
    }
}
