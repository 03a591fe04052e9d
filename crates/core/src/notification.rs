//! Notification payloads pushed by the backend over the event stream.
//!
//! The backend sends one JSON object per `notification` event:
//!
//! ```json
//! {
//!   "id": "n-1",
//!   "type": "NEW_ALERT",
//!   "title": "New alert nearby",
//!   "message": "Luna was reported lost 300m from you",
//!   "alertId": "42",
//!   "alertStatus": "ACTIVE",
//!   "petName": "Luna",
//!   "timestamp": "2024-05-01T10:15:00Z"
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::types::{AlertId, Timestamp};

/// Kind of state change a notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    /// An alert the user follows changed status (found, closed, ...).
    AlertStatusChange,
    /// A new alert was created.
    NewAlert,
    /// Platform-wide message.
    System,
    /// Any type string this client does not know yet.
    #[serde(other)]
    Unknown,
}

/// A server-pushed fact about an alert state change.
///
/// Delivered at most once per connection; the client does not dedup on
/// `id`, which the server may reuse across reconnects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(deserialize_with = "string_or_number")]
    pub alert_id: AlertId,
    #[serde(default)]
    pub alert_status: Option<String>,
    #[serde(default)]
    pub pet_name: Option<String>,
    /// ISO-8601 string from the server clock. Kept verbatim.
    #[serde(default)]
    pub timestamp: String,
}

impl NotificationMessage {
    /// Parse a notification from the raw `data` of a stream event.
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Parse [`timestamp`](Self::timestamp) as an RFC 3339 instant.
    pub fn timestamp_utc(&self) -> Result<Timestamp, CoreError> {
        chrono::DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|_| CoreError::InvalidTimestamp(self.timestamp.clone()))
    }
}

/// Accept alert ids sent either as JSON strings or as numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Uint(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Uint(n) => n.to_string(),
    })
}
