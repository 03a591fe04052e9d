//! Terminal rendering of toasts and connection state.
//!
//! The listener has no screen, so toasts become log lines and the
//! "View Alert" deep link becomes an absolute URL in the log.

use pawalert_events::{Navigator, Toast, ToastEvent, ToastKind, ToastQueue};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Navigator that logs the absolute URL of the requested page.
pub struct LogNavigator {
    base_url: String,
}

impl LogNavigator {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(url = %self.url_for(path), "Open alert");
    }
}

/// One-line summary of a toast.
pub fn format_toast(toast: &Toast) -> String {
    let mut line = format!("[{}] {}", kind_label(toast.kind), toast.title);
    if let Some(description) = &toast.description {
        line.push_str(" - ");
        line.push_str(description);
    }
    if let Some(action) = &toast.action {
        line.push_str(&format!(" ({})", action.label));
    }
    line
}

fn kind_label(kind: ToastKind) -> &'static str {
    match kind {
        ToastKind::Success => "success",
        ToastKind::Error => "error",
        ToastKind::Info => "info",
        ToastKind::Warning => "warning",
    }
}

/// Log every toast shown on `queue` until the queue is dropped.
pub fn spawn_renderer(queue: &ToastQueue) -> JoinHandle<()> {
    let mut events = queue.subscribe();

    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ToastEvent::Shown(toast)) => {
                    let line = format_toast(&toast);
                    match toast.kind {
                        ToastKind::Error => tracing::error!(id = %toast.id, "{line}"),
                        ToastKind::Warning => tracing::warn!(id = %toast.id, "{line}"),
                        ToastKind::Success | ToastKind::Info => {
                            tracing::info!(id = %toast.id, "{line}")
                        }
                    }
                }
                Ok(ToastEvent::Removed(id)) => tracing::debug!(%id, "Toast dismissed"),
                Ok(ToastEvent::Cleared) => tracing::debug!("Toasts cleared"),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Toast renderer fell behind");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Log connection state transitions until the sender goes away.
pub fn spawn_status_indicator(mut state: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while state.changed().await.is_ok() {
            if *state.borrow_and_update() {
                tracing::info!("Live updates connected");
            } else {
                tracing::warn!("Live updates disconnected");
            }
        }
    })
}
