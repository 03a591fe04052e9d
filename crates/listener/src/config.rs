use std::path::PathBuf;
use std::time::Duration;

use pawalert_core::{Coordinates, Environment};
use pawalert_location::IPAPI_URL;
use pawalert_stream::reconnect::DEFAULT_RECONNECT_DELAY;

/// Listener configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development against a
/// backend on `localhost:8080`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListenerConfig {
    /// Backend base URL; the stream lives at `/api/notifications/stream`.
    pub api_url: String,
    pub environment: Environment,
    /// Already-issued bearer token sent with the stream request.
    pub auth_token: Option<String>,
    pub reconnect_delay: Duration,
    pub ip_geolocation_url: String,
    /// Fixed device position, for hosts whose location is known.
    pub gps_fix: Option<Coordinates>,
    pub location_cache_path: Option<PathBuf>,
}

/// Invalid configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{present} is set but {missing} is not")]
    Incomplete {
        present: &'static str,
        missing: &'static str,
    },
}

impl ListenerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                | Default                  |
    /// |------------------------|--------------------------|
    /// | `PAWALERT_API_URL`     | `http://localhost:8080`  |
    /// | `PAWALERT_ENV`         | `production`             |
    /// | `PAWALERT_AUTH_TOKEN`  | --                       |
    /// | `RECONNECT_DELAY_MS`   | `3000`                   |
    /// | `IP_GEOLOCATION_URL`   | `https://ipapi.co/json/` |
    /// | `GPS_LATITUDE`         | --                       |
    /// | `GPS_LONGITUDE`        | --                       |
    /// | `LOCATION_CACHE_PATH`  | --                       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = get("PAWALERT_API_URL").unwrap_or_else(|| "http://localhost:8080".into());

        let environment = match get("PAWALERT_ENV") {
            Some(value) => value.parse().map_err(|e: pawalert_core::CoreError| {
                ConfigError::Invalid {
                    var: "PAWALERT_ENV",
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => Environment::default(),
        };

        let reconnect_delay = match get("RECONNECT_DELAY_MS") {
            Some(value) => Duration::from_millis(parse_number("RECONNECT_DELAY_MS", &value)?),
            None => DEFAULT_RECONNECT_DELAY,
        };

        let gps_fix = match (get("GPS_LATITUDE"), get("GPS_LONGITUDE")) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(
                parse_number("GPS_LATITUDE", &lat)?,
                parse_number("GPS_LONGITUDE", &lon)?,
            )),
            (Some(_), None) => {
                return Err(ConfigError::Incomplete {
                    present: "GPS_LATITUDE",
                    missing: "GPS_LONGITUDE",
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::Incomplete {
                    present: "GPS_LONGITUDE",
                    missing: "GPS_LATITUDE",
                })
            }
            (None, None) => None,
        };

        Ok(Self {
            api_url,
            environment,
            auth_token: get("PAWALERT_AUTH_TOKEN"),
            reconnect_delay,
            ip_geolocation_url: get("IP_GEOLOCATION_URL").unwrap_or_else(|| IPAPI_URL.into()),
            gps_fix,
            location_cache_path: get("LOCATION_CACHE_PATH").map(PathBuf::from),
        })
    }
}

fn parse_number<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
