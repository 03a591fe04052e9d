//! Shared domain types for the PawAlert realtime client.
//!
//! Everything here is plain data: notification payloads pushed by the
//! backend, location results, the REST error triple, and the runtime
//! environment flag. Behaviour lives in the `pawalert-stream`,
//! `pawalert-events` and `pawalert-location` crates.

pub mod api_error;
pub mod environment;
pub mod error;
pub mod location;
pub mod notification;
pub mod types;

pub use api_error::ApiErrorInfo;
pub use environment::Environment;
pub use error::CoreError;
pub use location::{Coordinates, LocationResult, LocationSource};
pub use notification::{NotificationMessage, NotificationType};
