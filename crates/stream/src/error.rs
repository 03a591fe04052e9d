/// Errors raised while opening or reading the event stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    /// The HTTP request could not be sent (DNS, TLS, refused, ...).
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server answered with a non-2xx status.
    #[error("Stream endpoint returned status {0}")]
    Status(u16),

    /// The body failed mid-stream.
    #[error("Transport error: {0}")]
    Transport(String),
}
