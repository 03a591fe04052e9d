//! Self-healing client for the notification stream.
//!
//! [`EventStreamClient`] keeps at most one live connection open through
//! an [`EventSource`]. Parsed notifications go to the most recently
//! registered handler. Any failure (open error, transport error, server
//! close) flips the connection state to `false` and schedules exactly
//! one reconnect after the configured fixed delay.
//!
//! State machine:
//!
//! ```text
//! Disconnected -> Connecting -> Connected -> Disconnected (error)
//!                      ^                          |
//!                      +------- after delay ------+
//! ```
//!
//! Only [`disconnect`](EventStreamClient::disconnect) ends the cycle.
//! All methods must be called from within a Tokio runtime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use futures::StreamExt;
use pawalert_core::NotificationMessage;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::messages::{classify, StreamMessage};
use crate::reconnect::ReconnectConfig;
use crate::source::EventSource;
use crate::sse::SseEvent;

/// Callback invoked for every parsed notification.
pub type NotificationHandler = Arc<dyn Fn(NotificationMessage) + Send + Sync>;

/// Cheaply cloneable handle to a single notification stream connection.
#[derive(Clone)]
pub struct EventStreamClient {
    inner: Arc<Inner>,
}

struct Inner {
    source: Arc<dyn EventSource>,
    config: ReconnectConfig,
    handler: RwLock<Option<NotificationHandler>>,
    slots: Mutex<Slots>,
    connected: watch::Sender<bool>,
}

/// Mutable connection bookkeeping. Never locked across an `.await`.
#[derive(Default)]
struct Slots {
    /// Task reading the live connection.
    connection: Option<JoinHandle<()>>,
    /// Pending reconnect timer.
    reconnect: Option<CancellationToken>,
    /// Bumped on every connect and disconnect; a connection task whose
    /// generation is stale may not touch the slots.
    generation: u64,
}

impl EventStreamClient {
    pub fn new(source: Arc<dyn EventSource>, config: ReconnectConfig) -> Self {
        let (connected, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                source,
                config,
                handler: RwLock::new(None),
                slots: Mutex::new(Slots::default()),
                connected,
            }),
        }
    }

    /// Replace the notification handler.
    ///
    /// Takes effect immediately, including for a connection that is
    /// already open.
    pub fn set_handler<F>(&self, handler: F)
    where
        F: Fn(NotificationMessage) + Send + Sync + 'static,
    {
        *self
            .inner
            .handler
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(handler));
    }

    pub fn clear_handler(&self) {
        *self
            .inner
            .handler
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Open the connection unless one already exists.
    pub fn connect(&self) {
        let mut slots = self.inner.lock_slots();
        self.inner.connect_locked(&mut slots);
    }

    /// Cancel any pending reconnect and close the live connection.
    ///
    /// Safe to call repeatedly.
    pub fn disconnect(&self) {
        let mut slots = self.inner.lock_slots();

        if let Some(token) = slots.reconnect.take() {
            token.cancel();
        }
        if let Some(handle) = slots.connection.take() {
            handle.abort();
            tracing::info!("Notification stream disconnected");
        }
        slots.generation += 1;

        self.inner.connected.send_replace(false);
    }

    /// `true` between a `connected` acknowledgement and the next failure.
    pub fn is_connected(&self) -> bool {
        *self.inner.connected.borrow()
    }

    /// Observe connection state changes.
    pub fn watch_connection(&self) -> watch::Receiver<bool> {
        self.inner.connected.subscribe()
    }

    /// Whether a connection handle is currently held (open or opening).
    pub fn has_connection(&self) -> bool {
        self.inner.lock_slots().connection.is_some()
    }

    /// Whether a reconnect is scheduled and not yet fired.
    pub fn has_pending_reconnect(&self) -> bool {
        self.inner.lock_slots().reconnect.is_some()
    }
}

impl Inner {
    fn lock_slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn connect_locked(self: &Arc<Self>, slots: &mut Slots) {
        if slots.connection.is_some() {
            tracing::debug!("Notification stream already connecting or connected");
            return;
        }

        // A fresh attempt supersedes any scheduled one.
        if let Some(token) = slots.reconnect.take() {
            token.cancel();
        }

        slots.generation += 1;
        let generation = slots.generation;
        let inner = Arc::clone(self);

        tracing::info!(generation, "Connecting to notification stream");
        slots.connection = Some(tokio::spawn(run_connection(inner, generation)));
    }

    /// Handle the end of connection `generation`: release the handle and
    /// schedule a single reconnect.
    fn connection_lost(self: &Arc<Self>, generation: u64) {
        let mut slots = self.lock_slots();
        if slots.generation != generation {
            return;
        }

        self.connected.send_replace(false);
        slots.connection = None;

        if let Some(token) = slots.reconnect.take() {
            token.cancel();
        }

        let token = CancellationToken::new();
        slots.reconnect = Some(token.clone());

        let inner = Arc::clone(self);
        let delay = self.config.delay;
        tracing::info!(
            delay_ms = delay.as_millis() as u64,
            "Notification stream lost, reconnect scheduled",
        );

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => inner.fire_reconnect(&token),
            }
        });
    }

    fn fire_reconnect(self: &Arc<Self>, token: &CancellationToken) {
        let mut slots = self.lock_slots();
        // Cancelled between the timer firing and taking the lock.
        if token.is_cancelled() {
            return;
        }
        slots.reconnect = None;
        self.connect_locked(&mut slots);
    }

    /// Act on one event from connection `generation`.
    ///
    /// Events from a superseded connection are dropped. Abort only lands
    /// at the task's next `.await`, so a task that already holds an event
    /// may still get here after `disconnect()`.
    fn dispatch(&self, generation: u64, event: SseEvent) {
        match classify(event) {
            StreamMessage::Connected => {
                let slots = self.lock_slots();
                if slots.generation != generation {
                    tracing::debug!(generation, "Dropping event from stale connection");
                    return;
                }
                // Set under the lock so it cannot overwrite a concurrent
                // disconnect().
                self.connected.send_replace(true);
                drop(slots);
                tracing::info!("Notification stream connected");
            }
            StreamMessage::Notification(message) => {
                let handler = {
                    let slots = self.lock_slots();
                    if slots.generation != generation {
                        tracing::debug!(generation, id = %message.id, "Dropping notification from stale connection");
                        return;
                    }
                    self.handler
                        .read()
                        .unwrap_or_else(PoisonError::into_inner)
                        .clone()
                };
                match handler {
                    Some(handler) => handler(message),
                    None => tracing::debug!(id = %message.id, "No notification handler registered"),
                }
            }
            StreamMessage::Malformed { error, raw } => {
                tracing::warn!(error = %error, raw = %raw, "Dropping malformed notification payload");
            }
            StreamMessage::Ignored(name) => {
                tracing::debug!(event = %name, "Ignoring stream event");
            }
        }
    }
}

/// Drive one connection until it fails or closes.
async fn run_connection(inner: Arc<Inner>, generation: u64) {
    let mut events = match inner.source.open().await {
        Ok(events) => events,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to open notification stream");
            inner.connection_lost(generation);
            return;
        }
    };

    while let Some(item) = events.next().await {
        match item {
            Ok(event) => inner.dispatch(generation, event),
            Err(e) => {
                tracing::warn!(error = %e, "Notification stream error");
                break;
            }
        }
    }

    tracing::debug!(generation, "Notification stream ended");
    inner.connection_lost(generation);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::StreamError;
    use crate::messages::{EVENT_CONNECTED, EVENT_NOTIFICATION};
    use crate::source::EventStream;
    use crate::testing::ChannelSource;

    const PAYLOAD: &str = r#"{"id":"n-1","type":"NEW_ALERT","title":"t","message":"m","alertId":"9","timestamp":"2024-05-01T10:15:00Z"}"#;

    /// Let spawned tasks run without reaching the reconnect timer.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    fn collecting_handler(client: &EventStreamClient) -> Arc<Mutex<Vec<String>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        client.set_handler(move |msg| sink.lock().unwrap().push(msg.alert_id));
        seen
    }

    #[tokio::test(start_paused = true)]
    async fn connect_is_idempotent() {
        let source = ChannelSource::new();
        let _feed = source.push_stream();
        let client = EventStreamClient::new(source.clone(), ReconnectConfig::default());

        client.connect();
        client.connect();
        settle().await;
        client.connect();
        settle().await;

        assert_eq!(source.opens(), 1);
        assert!(client.has_connection());
    }

    #[tokio::test(start_paused = true)]
    async fn connected_event_sets_state() {
        let source = ChannelSource::new();
        let feed = source.push_stream();
        let client = EventStreamClient::new(source.clone(), ReconnectConfig::default());

        client.connect();
        settle().await;
        assert!(!client.is_connected());

        feed.connected();
        settle().await;
        assert!(client.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn notifications_reach_latest_handler() {
        let source = ChannelSource::new();
        let feed = source.push_stream();
        let client = EventStreamClient::new(source.clone(), ReconnectConfig::default());

        let stale = collecting_handler(&client);
        client.connect();
        settle().await;

        let current = collecting_handler(&client);
        feed.connected();
        feed.notification(PAYLOAD);
        settle().await;

        assert!(stale.lock().unwrap().is_empty());
        assert_eq!(*current.lock().unwrap(), vec!["9".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_payload_is_dropped_without_disconnecting() {
        let source = ChannelSource::new();
        let feed = source.push_stream();
        let client = EventStreamClient::new(source.clone(), ReconnectConfig::default());
        let seen = collecting_handler(&client);

        client.connect();
        feed.connected();
        feed.notification("this is not json");
        settle().await;

        assert!(client.is_connected());
        assert!(seen.lock().unwrap().is_empty());
        assert!(!client.has_pending_reconnect());

        feed.notification(PAYLOAD);
        settle().await;
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_events_are_ignored() {
        let source = ChannelSource::new();
        let feed = source.push_stream();
        let client = EventStreamClient::new(source.clone(), ReconnectConfig::default());
        let seen = collecting_handler(&client);

        client.connect();
        feed.connected();
        feed.event("heartbeat", PAYLOAD);
        settle().await;

        assert!(client.is_connected());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stream_error_schedules_single_reconnect() {
        let source = ChannelSource::new();
        let feed = source.push_stream();
        let client = EventStreamClient::new(source.clone(), ReconnectConfig::default());

        client.connect();
        feed.connected();
        settle().await;
        assert!(client.is_connected());

        feed.fail();
        settle().await;

        assert!(!client.is_connected());
        assert!(!client.has_connection());
        assert!(client.has_pending_reconnect());
        assert_eq!(source.opens(), 1);

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert_eq!(source.opens(), 1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(source.opens(), 2);
        assert!(client.has_connection());
        assert!(!client.has_pending_reconnect());

        // Nothing else was scheduled behind it.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.opens(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_during_delay_prevents_reconnect() {
        let source = ChannelSource::new();
        let feed = source.push_stream();
        let client = EventStreamClient::new(source.clone(), ReconnectConfig::default());

        client.connect();
        feed.connected();
        feed.fail();
        settle().await;
        assert!(client.has_pending_reconnect());

        tokio::time::sleep(Duration::from_millis(1000)).await;
        client.disconnect();
        assert!(!client.has_pending_reconnect());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(source.opens(), 1);
        assert!(!client.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn server_close_is_treated_as_failure() {
        let source = ChannelSource::new();
        let feed = source.push_stream();
        let client = EventStreamClient::new(source.clone(), ReconnectConfig::default());

        client.connect();
        feed.connected();
        settle().await;

        drop(feed);
        settle().await;

        assert!(!client.is_connected());
        assert!(client.has_pending_reconnect());
    }

    #[tokio::test(start_paused = true)]
    async fn refused_open_is_retried_after_delay() {
        let source = ChannelSource::new();
        source.push_refusal();
        let feed = source.push_stream();
        let client = EventStreamClient::new(
            source.clone(),
            ReconnectConfig::with_delay(Duration::from_millis(500)),
        );

        client.connect();
        settle().await;
        assert_eq!(source.opens(), 1);
        assert!(client.has_pending_reconnect());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(source.opens(), 2);

        feed.connected();
        settle().await;
        assert!(client.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn manual_connect_supersedes_pending_reconnect() {
        let source = ChannelSource::new();
        let first = source.push_stream();
        let _second = source.push_stream();
        let client = EventStreamClient::new(source.clone(), ReconnectConfig::default());

        client.connect();
        first.fail();
        settle().await;
        assert!(client.has_pending_reconnect());

        client.connect();
        settle().await;
        assert_eq!(source.opens(), 2);
        assert!(!client.has_pending_reconnect());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(source.opens(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_is_idempotent_and_reconnectable() {
        let source = ChannelSource::new();
        let feed = source.push_stream();
        let client = EventStreamClient::new(source.clone(), ReconnectConfig::default());
        let mut state = client.watch_connection();

        client.disconnect();

        client.connect();
        feed.connected();
        settle().await;
        assert!(*state.borrow_and_update());

        client.disconnect();
        client.disconnect();
        assert!(!client.is_connected());
        assert!(!*state.borrow_and_update());
        assert!(!client.has_connection());

        // The aborted connection must not schedule anything.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(source.opens(), 1);

        client.connect();
        settle().await;
        assert_eq!(source.opens(), 2);
    }

    /// Source whose first poll blocks its worker thread for `stall`, then
    /// yields `events` back to back and stays open.
    struct StallingSource {
        stall: Duration,
        events: Vec<SseEvent>,
    }

    #[async_trait::async_trait]
    impl EventSource for StallingSource {
        async fn open(&self) -> Result<EventStream, StreamError> {
            let stall = self.stall;
            let events = self.events.clone();
            let burst = futures::stream::once(async move {
                std::thread::sleep(stall);
                futures::stream::iter(events.into_iter().map(Ok::<SseEvent, StreamError>))
            })
            .flatten();
            Ok(burst.chain(futures::stream::pending()).boxed())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn events_in_flight_at_disconnect_are_dropped() {
        let source = Arc::new(StallingSource {
            stall: Duration::from_millis(300),
            events: vec![
                SseEvent::new(EVENT_CONNECTED, ""),
                SseEvent::new(EVENT_NOTIFICATION, PAYLOAD),
            ],
        });
        let client = EventStreamClient::new(source, ReconnectConfig::default());
        let seen = collecting_handler(&client);

        client.connect();
        tokio::time::sleep(Duration::from_millis(100)).await;
        client.disconnect();

        // The stalled task wakes up after disconnect() and must not
        // resurrect the connection state or reach the handler.
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(!client.is_connected());
        assert!(!client.has_connection());
        assert!(!client.has_pending_reconnect());
        assert!(seen.lock().unwrap().is_empty());
    }
}
