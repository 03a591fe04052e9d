/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Alert identifiers are opaque strings assigned by the backend.
pub type AlertId = String;

/// Path prefix of the alert detail view.
pub const ALERTS_PATH: &str = "/alerts";

/// Build the deep-link path for an alert, e.g. `/alerts/42`.
pub fn alert_path(alert_id: &str) -> String {
    format!("{ALERTS_PATH}/{alert_id}")
}
