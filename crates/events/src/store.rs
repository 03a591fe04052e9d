//! Notification store bound to the stream connection's lifetime.
//!
//! [`NotificationStore::mount`] connects the [`EventStreamClient`] and
//! installs the notification handler; dropping the store (or calling
//! [`unmount`](NotificationStore::unmount)) disconnects it. No other
//! owner may connect or disconnect the client.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use pawalert_core::types::alert_path;
use pawalert_core::{NotificationMessage, NotificationType};
use pawalert_stream::EventStreamClient;
use tokio::sync::watch;

use crate::history::NotificationHistory;
use crate::navigator::Navigator;
use crate::toast::{ToastAction, ToastKind, ToastOptions, ToastQueue};

/// How long a notification toast stays on screen.
pub const NOTIFICATION_TOAST_DURATION: Duration = Duration::from_millis(8000);

/// Label of the deep-link button on notification toasts.
pub const VIEW_ALERT_LABEL: &str = "View Alert";

/// Owns the live notification connection and the recent history.
pub struct NotificationStore {
    client: EventStreamClient,
    history: Arc<Mutex<NotificationHistory>>,
}

impl NotificationStore {
    /// Start listening: install the handler and connect.
    pub fn mount(
        client: EventStreamClient,
        toasts: ToastQueue,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let history = Arc::new(Mutex::new(NotificationHistory::default()));

        let handler_history = Arc::clone(&history);
        client.set_handler(move |message| {
            on_notification(&handler_history, &toasts, &navigator, message);
        });
        client.connect();

        tracing::info!("Notification store mounted");
        Self { client, history }
    }

    /// Stop listening. Equivalent to dropping the store.
    pub fn unmount(self) {}

    /// Recent notifications, newest first.
    pub fn notifications(&self) -> Vec<NotificationMessage> {
        lock(&self.history).to_vec()
    }

    /// Empty the history. The connection is left untouched.
    pub fn clear_notifications(&self) {
        lock(&self.history).clear();
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    pub fn watch_connection(&self) -> watch::Receiver<bool> {
        self.client.watch_connection()
    }
}

impl Drop for NotificationStore {
    fn drop(&mut self) {
        self.client.disconnect();
        self.client.clear_handler();
        tracing::info!("Notification store unmounted");
    }
}

fn lock(history: &Mutex<NotificationHistory>) -> MutexGuard<'_, NotificationHistory> {
    history.lock().unwrap_or_else(PoisonError::into_inner)
}

fn on_notification(
    history: &Mutex<NotificationHistory>,
    toasts: &ToastQueue,
    navigator: &Arc<dyn Navigator>,
    message: NotificationMessage,
) {
    tracing::info!(
        id = %message.id,
        kind = ?message.kind,
        alert_id = %message.alert_id,
        "Notification received",
    );

    let toast = notification_toast(&message, Arc::clone(navigator));
    lock(history).push(message);
    toasts.show_toast(toast);
}

/// Toast style for a notification type.
pub fn toast_kind_for(kind: NotificationType) -> ToastKind {
    match kind {
        NotificationType::AlertStatusChange => ToastKind::Warning,
        NotificationType::NewAlert | NotificationType::System | NotificationType::Unknown => {
            ToastKind::Info
        }
    }
}

/// Build the toast shown for a notification: fixed duration, closable,
/// with a "View Alert" action linking to the alert.
pub fn notification_toast(
    message: &NotificationMessage,
    navigator: Arc<dyn Navigator>,
) -> ToastOptions {
    let path = alert_path(&message.alert_id);
    let action = ToastAction::new(VIEW_ALERT_LABEL, move || navigator.navigate(&path));

    ToastOptions::new(toast_kind_for(message.kind), message.title.clone())
        .with_description(message.message.clone())
        .with_duration(NOTIFICATION_TOAST_DURATION)
        .with_closable(true)
        .with_action(action)
}
