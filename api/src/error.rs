//! Failure taxonomy for backend calls.

use thiserror::Error;

/// Everything that can go wrong between picking a CSV and getting typed rows back.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request never produced a response (network down, CORS, DNS...).
    #[error("Upload failed: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("Upload failed: {message}")]
    Server { status: u16, message: String },

    /// The response parsed but does not have the expected shape.
    #[error("Invalid data format: {0}")]
    Format(String),
}

impl ApiError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    /// Build a server error from a response body. The `error` field of a JSON
    /// body wins; anything else is surfaced as raw text.
    pub fn server(status: u16, body: &str) -> Self {
        Self::Server {
            status,
            message: server_message(status, body),
        }
    }

    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }
}

fn server_message(status: u16, body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    if let Some(message) = parsed
        .as_ref()
        .and_then(|value| value.get("error"))
        .and_then(|value| value.as_str())
    {
        return message.to_string();
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("server responded with status {status}")
    } else {
        trimmed.to_string()
    }
}
