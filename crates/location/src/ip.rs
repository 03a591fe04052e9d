//! IP-based geolocation via ipapi.co.

use async_trait::async_trait;
use pawalert_core::Coordinates;
use serde::Deserialize;

use crate::error::LocateError;

/// Public, unauthenticated ipapi endpoint.
pub const IPAPI_URL: &str = "https://ipapi.co/json/";

/// Resolves the caller's approximate position from its public IP.
#[async_trait]
pub trait IpLocator: Send + Sync {
    async fn locate(&self) -> Result<Coordinates, LocateError>;
}

/// HTTP client for ipapi-compatible services.
pub struct IpApiLocator {
    client: reqwest::Client,
    url: String,
}

/// Fields of the ipapi response this client reads.
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

impl IpApiResponse {
    fn coordinates(self) -> Result<Coordinates, LocateError> {
        if self.error {
            return Err(LocateError::Service(
                self.reason.unwrap_or_else(|| "unknown".to_string()),
            ));
        }
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(LocateError::MissingCoordinates),
        }
    }
}

impl IpApiLocator {
    pub fn new() -> Self {
        Self::with_url(IPAPI_URL)
    }

    /// Point at a different ipapi-compatible endpoint.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for IpApiLocator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IpLocator for IpApiLocator {
    async fn locate(&self) -> Result<Coordinates, LocateError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LocateError::Status(status.as_u16()));
        }

        response.json::<IpApiResponse>().await?.coordinates()
    }
}
