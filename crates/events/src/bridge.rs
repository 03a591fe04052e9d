//! Process-wide toast entry point.
//!
//! Code outside the component that owns the [`ToastQueue`] (REST error
//! handlers, background tasks) calls [`show_toast`] here. The owner
//! registers its queue once at startup with [`register`]; until then
//! every call is dropped with a warning so early startup never fails on
//! a toast.

use std::sync::{PoisonError, RwLock};

use pawalert_core::ApiErrorInfo;

use crate::toast::{ToastId, ToastOptions, ToastQueue};

static DISPATCHER: RwLock<Option<ToastQueue>> = RwLock::new(None);

/// Install `queue` as the target of [`show_toast`].
///
/// Expected once per process. A second registration replaces the first.
pub fn register(queue: ToastQueue) {
    let mut slot = DISPATCHER.write().unwrap_or_else(PoisonError::into_inner);
    if slot.is_some() {
        tracing::warn!("Toast queue registered twice, replacing the previous one");
    }
    *slot = Some(queue);
    tracing::debug!("Toast queue registered");
}

pub fn is_registered() -> bool {
    DISPATCHER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

/// Enqueue a toast on the registered queue.
///
/// Returns `None` (and logs) when no queue has been registered yet.
pub fn show_toast(options: ToastOptions) -> Option<ToastId> {
    let queue = DISPATCHER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    match queue {
        Some(queue) => Some(queue.show_toast(options)),
        None => {
            tracing::warn!(title = %options.title, "Toast system not ready, dropping toast");
            None
        }
    }
}

/// Report a failed REST call as an error toast.
pub fn report_api_error(info: &ApiErrorInfo) -> Option<ToastId> {
    tracing::debug!(status = ?info.status, error = %info.error, "Reporting API error");
    show_toast(ToastOptions::from_api_error(info))
}
