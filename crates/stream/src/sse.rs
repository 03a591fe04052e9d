//! Incremental decoder for the `text/event-stream` wire format.
//!
//! Bytes arrive in arbitrary chunks; [`SseDecoder::push`] buffers
//! partial lines and returns every event completed by the chunk.
//! Lines may end in LF, CRLF or a lone CR, and a CRLF pair may be split
//! across two chunks. A byte order mark at the very start is skipped,
//! and lines longer than [`MAX_LINE_LENGTH`] are dropped with a warning.

/// Event name used when the server does not send an `event:` field.
pub const DEFAULT_EVENT: &str = "message";

/// Longest line kept in memory. Longer lines are discarded whole.
pub const MAX_LINE_LENGTH: usize = 256 * 1024;

/// UTF-8 byte order mark, allowed once at the start of the stream.
const BOM: &[u8] = b"\xEF\xBB\xBF";

/// A single dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Value of the `event:` field, or [`DEFAULT_EVENT`].
    pub event: String,
    /// All `data:` lines joined with `\n`.
    pub data: String,
    /// Last `id:` seen on the stream, if any.
    pub id: Option<String>,
}

impl SseEvent {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
            id: None,
        }
    }
}

/// Stateful line/field parser for one event stream.
#[derive(Debug)]
pub struct SseDecoder {
    line: Vec<u8>,
    max_line: usize,
    /// Current line overflowed; drop bytes until its terminator.
    discarding: bool,
    /// Previous chunk ended in CR; swallow a leading LF.
    skip_lf: bool,
    /// First line not yet finished; it may start with a BOM.
    at_start: bool,
    event: Option<String>,
    data: Vec<String>,
    last_id: Option<String>,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_max_line(MAX_LINE_LENGTH)
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that discards lines longer than `max_line` bytes.
    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            line: Vec::new(),
            max_line,
            discarding: false,
            skip_lf: false,
            at_start: true,
            event: None,
            data: Vec::new(),
            last_id: None,
        }
    }

    /// Feed a chunk of bytes, returning the events it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        let mut events = Vec::new();

        for &byte in chunk {
            if self.skip_lf {
                self.skip_lf = false;
                if byte == b'\n' {
                    continue;
                }
            }

            match byte {
                b'\n' => self.end_line(&mut events),
                b'\r' => {
                    self.skip_lf = true;
                    self.end_line(&mut events);
                }
                _ if self.discarding => {}
                _ if self.line.len() >= self.max_line => {
                    tracing::warn!(limit = self.max_line, "SSE line too long, discarding it");
                    self.line.clear();
                    self.discarding = true;
                }
                _ => self.line.push(byte),
            }
        }

        events
    }

    fn end_line(&mut self, events: &mut Vec<SseEvent>) {
        let mut raw = std::mem::take(&mut self.line);
        let first = std::mem::take(&mut self.at_start);
        if std::mem::take(&mut self.discarding) {
            return;
        }
        if first && raw.starts_with(BOM) {
            raw.drain(..BOM.len());
        }
        let line = String::from_utf8_lossy(&raw);

        if line.is_empty() {
            if let Some(event) = self.dispatch() {
                events.push(event);
            }
            return;
        }

        // Comment line, used by servers as keep-alive.
        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.find(':') {
            Some(idx) => {
                let value = &line[idx + 1..];
                (&line[..idx], value.strip_prefix(' ').unwrap_or(value))
            }
            None => (&*line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" if !value.contains('\0') => self.last_id = Some(value.to_string()),
            // `retry` is a server hint; the client keeps its own fixed delay.
            _ => {}
        }
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take().filter(|e| !e.is_empty());
        let data = std::mem::take(&mut self.data);

        // Named events are delivered even without data (e.g. `connected`).
        if data.is_empty() && event.is_none() {
            return None;
        }

        Some(SseEvent {
            event: event.unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            data: data.join("\n"),
            id: self.last_id.clone(),
        })
    }
}
