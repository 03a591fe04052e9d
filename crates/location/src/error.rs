/// Failure of a device position request.
///
/// Codes follow the W3C Geolocation API: 1 permission denied,
/// 2 position unavailable, 3 timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Position unavailable")]
    PositionUnavailable,

    #[error("Position request timed out")]
    Timeout,

    /// No positioning provider exists on this device.
    #[error("Geolocation not supported")]
    Unsupported,
}

impl PositionError {
    pub fn code(self) -> Option<u8> {
        match self {
            Self::PermissionDenied => Some(1),
            Self::PositionUnavailable => Some(2),
            Self::Timeout => Some(3),
            Self::Unsupported => None,
        }
    }

    /// Map a W3C error code; unknown codes count as unavailable.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::PermissionDenied,
            3 => Self::Timeout,
            _ => Self::PositionUnavailable,
        }
    }

    /// Text shown to the user when every location strategy failed.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Location permission denied. Allow location access to see alerts near you."
            }
            Self::PositionUnavailable => {
                "Your location is unavailable right now. Check your device's location settings."
            }
            Self::Timeout => "Getting your location took too long. Please try again.",
            Self::Unsupported => "Geolocation is not supported on this device.",
        }
    }
}

/// Failure of the IP geolocation lookup.
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IP geolocation returned status {0}")]
    Status(u16),

    /// The service answered but reported an error (e.g. rate limiting).
    #[error("IP geolocation service error: {0}")]
    Service(String),

    #[error("IP geolocation response lacks coordinates")]
    MissingCoordinates,
}

/// Failure reading or writing the location cache file.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for err in [
            PositionError::PermissionDenied,
            PositionError::PositionUnavailable,
            PositionError::Timeout,
        ] {
            let code = err.code().expect("coded error");
            assert_eq!(PositionError::from_code(code), err);
        }
        assert_eq!(PositionError::from_code(9), PositionError::PositionUnavailable);
        assert!(PositionError::Unsupported.code().is_none());
    }

    #[test]
    fn messages_are_distinct() {
        let messages = [
            PositionError::PermissionDenied.user_message(),
            PositionError::PositionUnavailable.user_message(),
            PositionError::Timeout.user_message(),
            PositionError::Unsupported.user_message(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
