//! Classification of decoded stream events.
//!
//! The notification feed uses two named events: `connected` (sent once
//! after the server accepts the subscription) and `notification`
//! (JSON-encoded [`NotificationMessage`]). Anything else is ignored.

use pawalert_core::{CoreError, NotificationMessage};

use crate::sse::SseEvent;

/// Acknowledgement sent by the server when the subscription is live.
pub const EVENT_CONNECTED: &str = "connected";

/// Carries one JSON-encoded notification.
pub const EVENT_NOTIFICATION: &str = "notification";

/// What a single stream event means to the client.
#[derive(Debug)]
pub enum StreamMessage {
    Connected,
    Notification(NotificationMessage),
    /// A `notification` event whose payload did not parse.
    Malformed { error: CoreError, raw: String },
    /// Any other event name.
    Ignored(String),
}

/// Interpret a decoded event.
pub fn classify(event: SseEvent) -> StreamMessage {
    match event.event.as_str() {
        EVENT_CONNECTED => StreamMessage::Connected,
        EVENT_NOTIFICATION => match NotificationMessage::from_json(&event.data) {
            Ok(message) => StreamMessage::Notification(message),
            Err(error) => StreamMessage::Malformed {
                error,
                raw: event.data,
            },
        },
        _ => StreamMessage::Ignored(event.event),
    }
}
