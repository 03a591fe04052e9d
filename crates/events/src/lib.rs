//! PawAlert notification fan-out and toast infrastructure.
//!
//! - [`ToastQueue`]: the visible toast tray with per-toast auto-dismiss
//!   timers and a broadcast feed for renderers.
//! - [`bridge`]: the process-wide entry point that lets any code enqueue
//!   a toast once a queue has been registered.
//! - [`NotificationHistory`]: bounded, most-recent-first history.
//! - [`NotificationStore`]: owns the stream connection for its lifetime
//!   and turns each notification into history plus a toast.

pub mod bridge;
pub mod history;
pub mod navigator;
pub mod store;
pub mod toast;

pub use history::{NotificationHistory, MAX_NOTIFICATIONS};
pub use navigator::Navigator;
pub use store::NotificationStore;
pub use toast::{Toast, ToastAction, ToastEvent, ToastId, ToastKind, ToastOptions, ToastQueue};
