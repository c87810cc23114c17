//! Unified client error model.
//! Every request path (HTTP client, endpoint wrappers, session controller) reports failures
//! through `ClientError`, so callers classify them the same way regardless of the route.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// No response was received (connection refused, DNS, TLS, broken body stream).
    #[error("network error: {0}")]
    Network(String),
    /// The configured per-request timeout elapsed.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    /// HTTP 401: credential missing, expired or invalid.
    #[error("unauthorized: {message}")]
    Auth { message: String, body: Value },
    /// Any other 4xx, usually with a field-level message from the backend.
    #[error("rejected ({status}): {message}")]
    Validation { status: u16, message: String, body: Value },
    /// 5xx.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String, body: Value },
    /// A 2xx body that does not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Extract the human readable message the backend put in an error body.
pub fn backend_message_of(body: &Value) -> Option<&str> {
    body.get("message")
        .and_then(|m| m.as_str())
        .or_else(|| body.get("error").and_then(|m| m.as_str()))
        .or_else(|| body.as_str())
        .filter(|m| !m.trim().is_empty())
}

impl ClientError {
    /// Classify a non-2xx response.
    pub fn from_status(status: u16, body: Value) -> Self {
        let message = backend_message_of(&body)
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status));
        match status {
            401 => ClientError::Auth { message, body },
            500..=599 => ClientError::Server { status, message, body },
            _ => ClientError::Validation { status, message, body },
        }
    }

    /// HTTP status carried by the error, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Auth { .. } => Some(401),
            ClientError::Validation { status, .. } | ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_auth(&self) -> bool { matches!(self, ClientError::Auth { .. }) }

    /// True for both flavours of "no response received".
    pub fn is_network(&self) -> bool { matches!(self, ClientError::Network(_) | ClientError::Timeout(_)) }

    /// The message supplied by the backend, when there was a response with one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ClientError::Auth { body, .. }
            | ClientError::Validation { body, .. }
            | ClientError::Server { body, .. } => backend_message_of(body),
            _ => None,
        }
    }

    /// Message suitable for display: the backend's own wording, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.backend_message().unwrap_or(fallback).to_string()
    }
}
