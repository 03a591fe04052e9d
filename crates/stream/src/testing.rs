//! In-process [`EventSource`] for tests.
//!
//! Each call to [`ChannelSource::push_stream`] queues one scripted
//! connection and returns a [`StreamFeed`] that drives it. Opens beyond
//! the scripted ones get a stream that never yields, i.e. a connection
//! that stays open and silent.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures::channel::mpsc;
use futures::StreamExt;

use crate::error::StreamError;
use crate::messages::{EVENT_CONNECTED, EVENT_NOTIFICATION};
use crate::source::{EventSource, EventStream};
use crate::sse::SseEvent;

type Item = Result<SseEvent, StreamError>;

enum Scripted {
    Stream(mpsc::UnboundedReceiver<Item>),
    Refuse(StreamError),
}

/// Scripted event source counting how often it was opened.
#[derive(Default)]
pub struct ChannelSource {
    opens: AtomicUsize,
    scripts: Mutex<VecDeque<Scripted>>,
}

impl ChannelSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a connection that succeeds and is driven by the returned feed.
    ///
    /// Dropping the feed ends the stream, which the client treats as a
    /// connection close.
    pub fn push_stream(&self) -> StreamFeed {
        let (tx, rx) = mpsc::unbounded();
        self.lock().push_back(Scripted::Stream(rx));
        StreamFeed { tx }
    }

    /// Queue a connection attempt that fails to open.
    pub fn push_refusal(&self) {
        self.lock()
            .push_back(Scripted::Refuse(StreamError::Connection("refused".into())));
    }

    /// Number of times [`EventSource::open`] was called.
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Scripted>> {
        self.scripts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl EventSource for ChannelSource {
    async fn open(&self) -> Result<EventStream, StreamError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let next = self.lock().pop_front();
        match next {
            Some(Scripted::Stream(rx)) => Ok(rx.boxed()),
            Some(Scripted::Refuse(err)) => Err(err),
            None => Ok(futures::stream::pending::<Item>().boxed()),
        }
    }
}

/// Sender half of one scripted connection.
pub struct StreamFeed {
    tx: mpsc::UnboundedSender<Item>,
}

impl StreamFeed {
    pub fn event(&self, name: &str, data: &str) {
        let _ = self.tx.unbounded_send(Ok(SseEvent::new(name, data)));
    }

    pub fn connected(&self) {
        self.event(EVENT_CONNECTED, "");
    }

    pub fn notification(&self, json: &str) {
        self.event(EVENT_NOTIFICATION, json);
    }

    /// Deliver a transport error, terminating the connection.
    pub fn fail(&self) {
        let _ = self
            .tx
            .unbounded_send(Err(StreamError::Transport("connection reset".into())));
    }
}
