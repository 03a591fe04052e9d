//! Result of a best-effort location lookup.

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Which strategy produced a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationSource {
    /// Device positioning (GPS or platform equivalent).
    Gps,
    /// Geolocation of the public IP address.
    Ip,
    /// Fixed reference point, development builds only.
    DevDefault,
}

impl LocationSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gps => "gps",
            Self::Ip => "ip",
            Self::DevDefault => "dev-default",
        }
    }
}

impl std::fmt::Display for LocationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a location lookup.
///
/// Either both coordinates and `source` are set and `error` is `None`,
/// or all three are `None` and `error` carries a user-facing message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationResult {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub source: Option<LocationSource>,
    pub error: Option<String>,
}

impl LocationResult {
    pub fn found(coords: Coordinates, source: LocationSource) -> Self {
        Self {
            latitude: Some(coords.latitude),
            longitude: Some(coords.longitude),
            source: Some(source),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            latitude: None,
            longitude: None,
            source: None,
            error: Some(error.into()),
        }
    }

    /// Coordinates, if the lookup succeeded.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }
}
