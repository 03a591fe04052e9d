//! `pawalert-listener` -- headless PawAlert notification listener.
//!
//! Subscribes to the backend's live notification stream, keeps the most
//! recent notifications, and renders each one as a log line. Resolves
//! the host's location once at startup.
//!
//! # Environment variables
//!
//! | Variable              | Required | Default                  | Description                        |
//! |-----------------------|----------|--------------------------|------------------------------------|
//! | `PAWALERT_API_URL`    | no       | `http://localhost:8080`  | Backend base URL                   |
//! | `PAWALERT_ENV`        | no       | `production`             | `development` enables the dev location |
//! | `PAWALERT_AUTH_TOKEN` | no       | --                       | Bearer token for the stream        |
//! | `RECONNECT_DELAY_MS`  | no       | `3000`                   | Wait before reconnecting           |
//! | `IP_GEOLOCATION_URL`  | no       | `https://ipapi.co/json/` | ipapi-compatible lookup endpoint   |
//! | `GPS_LATITUDE`        | no       | --                       | Fixed host latitude                |
//! | `GPS_LONGITUDE`       | no       | --                       | Fixed host longitude               |
//! | `LOCATION_CACHE_PATH` | no       | --                       | File holding the last good location |

use std::sync::Arc;

use pawalert_events::{bridge, NotificationStore, ToastOptions, ToastQueue};
use pawalert_listener::config::ListenerConfig;
use pawalert_listener::{locate, render};
use pawalert_location::LocationCache;
use pawalert_stream::{EventStreamClient, HttpEventSource, ReconnectConfig};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pawalert_listener=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ListenerConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    tracing::info!(
        api_url = %config.api_url,
        environment = ?config.environment,
        reconnect_delay_ms = config.reconnect_delay.as_millis() as u64,
        "Starting pawalert-listener",
    );

    // Toasts
    let toasts = ToastQueue::new();
    bridge::register(toasts.clone());
    let renderer = render::spawn_renderer(&toasts);

    // Live notifications
    let mut source = HttpEventSource::new(&config.api_url);
    if let Some(token) = &config.auth_token {
        source = source.with_auth_token(token.clone());
    }
    let client = EventStreamClient::new(
        Arc::new(source),
        ReconnectConfig::with_delay(config.reconnect_delay),
    );
    let navigator = Arc::new(render::LogNavigator::new(&config.api_url));
    let store = NotificationStore::mount(client, toasts, navigator);
    let status = render::spawn_status_indicator(store.watch_connection());

    // Location
    let resolver = locate::build_resolver(&config);
    let cache = config.location_cache_path.as_ref().map(LocationCache::new);
    let location = locate::resolve_location(&resolver, cache.as_ref()).await;
    match (location.coordinates(), &location.error) {
        (Some(coords), _) => tracing::info!(
            latitude = coords.latitude,
            longitude = coords.longitude,
            source = ?location.source,
            "Location resolved",
        ),
        (None, error) => {
            bridge::show_toast(
                ToastOptions::warning("Location unavailable")
                    .with_description(error.clone().unwrap_or_default()),
            );
        }
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    store.unmount();
    status.abort();
    renderer.abort();
    Ok(())
}
