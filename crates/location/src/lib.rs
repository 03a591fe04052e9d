//! Best-effort current-location resolution.
//!
//! [`LocationResolver`] tries device positioning first, then IP
//! geolocation, then (development builds only) a fixed reference point.
//! [`LocationCache`] lets callers keep the last good result on disk.

pub mod cache;
pub mod error;
pub mod gps;
pub mod ip;
pub mod resolver;

pub use cache::{CachedLocation, LocationCache};
pub use error::{CacheError, LocateError, PositionError};
pub use gps::{PositionOptions, PositionProvider, StaticPositionProvider, UnavailablePositionProvider};
pub use ip::{IpApiLocator, IpLocator, IPAPI_URL};
pub use resolver::{LocationResolver, DEV_DEFAULT_COORDINATES};
