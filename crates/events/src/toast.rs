//! Toast tray with timed removal.
//!
//! [`ToastQueue`] holds the toasts currently on screen in insertion order.
//! Every toast with a non-zero duration gets its own removal timer; a
//! zero duration makes it sticky. Removal is idempotent, so timers that
//! fire after an explicit close or a [`clear_toasts`](ToastQueue::clear_toasts)
//! do nothing.
//!
//! Renderers call [`subscribe`](ToastQueue::subscribe) to receive
//! [`ToastEvent`]s.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use pawalert_core::ApiErrorInfo;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Display time applied when the caller does not set one.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(5000);

/// Broadcast channel capacity for renderer events.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Process-wide id counter; ids are never reused within a run.
static NEXT_TOAST_ID: AtomicU64 = AtomicU64::new(1);

/// Visual style of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

/// Opaque toast identifier, e.g. `toast-7`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToastId(String);

impl ToastId {
    fn next() -> Self {
        Self(format!("toast-{}", NEXT_TOAST_ID.fetch_add(1, Ordering::Relaxed)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ToastId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A labelled button on a toast.
#[derive(Clone)]
pub struct ToastAction {
    pub label: String,
    callback: Arc<dyn Fn() + Send + Sync>,
}

impl ToastAction {
    pub fn new<F>(label: impl Into<String>, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            callback: Arc::new(callback),
        }
    }

    /// Run the action, as if its button was clicked.
    pub fn trigger(&self) {
        (self.callback)();
    }
}

impl std::fmt::Debug for ToastAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToastAction")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Caller-supplied toast request. Unset fields take defaults in
/// [`ToastQueue::show_toast`].
#[derive(Debug, Clone)]
pub struct ToastOptions {
    pub title: String,
    pub description: Option<String>,
    pub kind: ToastKind,
    /// `None` means [`DEFAULT_TOAST_DURATION`]; zero means sticky.
    pub duration: Option<Duration>,
    /// `None` means closable.
    pub closable: Option<bool>,
    pub action: Option<ToastAction>,
}

impl ToastOptions {
    pub fn new(kind: ToastKind, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            kind,
            duration: None,
            closable: None,
            action: None,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, title)
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(ToastKind::Info, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(ToastKind::Warning, title)
    }

    /// Error toast for a failed REST call.
    pub fn from_api_error(info: &ApiErrorInfo) -> Self {
        Self::error(info.error.clone()).with_description(info.message.clone())
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Never auto-dismiss.
    pub fn sticky(self) -> Self {
        self.with_duration(Duration::ZERO)
    }

    pub fn with_closable(mut self, closable: bool) -> Self {
        self.closable = Some(closable);
        self
    }

    pub fn with_action(mut self, action: ToastAction) -> Self {
        self.action = Some(action);
        self
    }
}

/// A toast as shown in the tray.
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: ToastId,
    pub title: String,
    pub description: Option<String>,
    pub kind: ToastKind,
    pub duration: Duration,
    pub closable: bool,
    pub action: Option<ToastAction>,
}

impl Toast {
    pub fn is_sticky(&self) -> bool {
        self.duration.is_zero()
    }
}

/// Lifecycle notifications for renderers.
#[derive(Debug, Clone)]
pub enum ToastEvent {
    Shown(Toast),
    Removed(ToastId),
    Cleared,
}

/// Shared handle to the toast tray.
#[derive(Clone)]
pub struct ToastQueue {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    toasts: Mutex<Vec<Toast>>,
    events: broadcast::Sender<ToastEvent>,
}

impl ToastQueue {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(QueueInner {
                toasts: Mutex::new(Vec::new()),
                events,
            }),
        }
    }

    /// Append a toast and start its removal timer.
    ///
    /// Returns the new id so the caller can dismiss it early. Outside a
    /// Tokio runtime no timer can be started and the toast stays until
    /// removed explicitly.
    pub fn show_toast(&self, options: ToastOptions) -> ToastId {
        let toast = Toast {
            id: ToastId::next(),
            title: options.title,
            description: options.description,
            kind: options.kind,
            duration: options.duration.unwrap_or(DEFAULT_TOAST_DURATION),
            closable: options.closable.unwrap_or(true),
            action: options.action,
        };
        let id = toast.id.clone();
        let duration = toast.duration;

        tracing::debug!(id = %id, kind = ?toast.kind, title = %toast.title, "Toast shown");
        {
            // Events go out under the tray lock so renderers see them in
            // the order the tray changed.
            let mut toasts = self.lock();
            toasts.push(toast.clone());
            let _ = self.inner.events.send(ToastEvent::Shown(toast));
        }

        if !duration.is_zero() {
            self.schedule_removal(id.clone(), duration);
        }

        id
    }

    /// Remove a toast. Unknown or already-removed ids are ignored.
    ///
    /// Returns `true` if a toast was removed.
    pub fn remove_toast(&self, id: &ToastId) -> bool {
        let removed = {
            let mut toasts = self.lock();
            let before = toasts.len();
            toasts.retain(|t| &t.id != id);
            let removed = toasts.len() != before;
            if removed {
                let _ = self.inner.events.send(ToastEvent::Removed(id.clone()));
            }
            removed
        };

        if removed {
            tracing::debug!(id = %id, "Toast removed");
        }
        removed
    }

    /// Remove every toast. Pending timers become no-ops.
    pub fn clear_toasts(&self) {
        let mut toasts = self.lock();
        toasts.clear();
        let _ = self.inner.events.send(ToastEvent::Cleared);
    }

    /// Snapshot of the tray, oldest first.
    pub fn toasts(&self) -> Vec<Toast> {
        self.lock().clone()
    }

    pub fn contains(&self, id: &ToastId) -> bool {
        self.lock().iter().any(|t| &t.id == id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Receive lifecycle events for rendering.
    pub fn subscribe(&self) -> broadcast::Receiver<ToastEvent> {
        self.inner.events.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Toast>> {
        self.inner
            .toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn schedule_removal(&self, id: ToastId, duration: Duration) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(id = %id, "No async runtime, toast will not auto-dismiss");
            return;
        };

        // The timer must not keep a dropped queue alive.
        let queue: Weak<QueueInner> = Arc::downgrade(&self.inner);
        runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(inner) = queue.upgrade() {
                ToastQueue { inner }.remove_toast(&id);
            }
        });
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new()
    }
}
