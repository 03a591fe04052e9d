#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("Invalid notification payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
