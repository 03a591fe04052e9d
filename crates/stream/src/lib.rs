//! Server-sent-events client for the PawAlert notification feed.
//!
//! Provides SSE wire decoding, the [`EventSource`](source::EventSource)
//! transport seam with its HTTP implementation, event classification,
//! and the self-healing [`EventStreamClient`](client::EventStreamClient).

pub mod client;
pub mod error;
pub mod messages;
pub mod reconnect;
pub mod source;
pub mod sse;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use client::{EventStreamClient, NotificationHandler};
pub use error::StreamError;
pub use reconnect::ReconnectConfig;
pub use source::{EventSource, EventStream, HttpEventSource, STREAM_PATH};
pub use sse::{SseDecoder, SseEvent};
