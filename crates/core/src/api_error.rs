//! Normalised description of a failed REST call.
//!
//! REST call sites hand the raw failure to [`ApiErrorInfo::from_response`]
//! or [`ApiErrorInfo::transport`] and forward the resulting
//! `{status, error, message}` triple to the toast dispatcher.

use serde::{Deserialize, Serialize};

/// The `{status, error, message}` triple shown to users on REST failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorInfo {
    /// HTTP status, or `None` when no response was received.
    pub status: Option<u16>,
    /// Short error label, e.g. `"Not Found"`.
    pub error: String,
    /// Human-readable detail.
    pub message: String,
}

/// Error body shape returned by the backend. Both fields are optional.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl ApiErrorInfo {
    /// Build the triple from an HTTP error response.
    ///
    /// The body is read as `{"error": ..., "message": ...}` when it is
    /// JSON; otherwise the raw text becomes the message.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

        let error = parsed
            .error
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| status_label(status).to_string());

        let message = parsed
            .message
            .filter(|m| !m.is_empty())
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty() && !trimmed.starts_with('{')).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| format!("Request failed with status {status}"));

        Self {
            status: Some(status),
            error,
            message,
        }
    }

    /// Build the triple for a request that never got a response.
    pub fn transport(detail: impl Into<String>) -> Self {
        Self {
            status: None,
            error: "Network Error".to_string(),
            message: detail.into(),
        }
    }
}

fn status_label(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500..=599 => "Server Error",
        _ => "Request Failed",
    }
}
