use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::retry::is_token_expiry;

#[derive(Debug, Error)]
pub enum LouieApiError {
    #[error("no credentials available: {0}")]
    MissingCredentials(String),

    #[error("credential refresh failed: {0}")]
    Refresh(String),

    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: &'static str },

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} {message}")]
    Status {
        status: StatusCode,
        message: String,
        body: String,
    },

    #[error(
        "Louie API timeout after {:.1}s waiting for response. Only received {lines_received} lines. \
         Agentic flows can take time - consider increasing timeout (current: {}s per chunk, {}s total).",
        .elapsed.as_secs_f64(),
        .chunk_timeout.as_secs_f64(),
        .total_timeout.as_secs_f64()
    )]
    StreamTimeout {
        elapsed: Duration,
        lines_received: usize,
        chunk_timeout: Duration,
        total_timeout: Duration,
    },

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("failed to decode table {block_id}: {message}")]
    Decode { block_id: String, message: String },

    #[error("failed to initialize runtime: {0}")]
    Runtime(String),
}

impl LouieApiError {
    #[must_use]
    pub fn status(status: StatusCode, body: impl Into<String>) -> Self {
        let body = body.into();
        Self::Status {
            status,
            message: parse_error_message(status, &body),
            body,
        }
    }

    #[must_use]
    pub fn decode(block_id: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            block_id: block_id.into(),
            message: message.to_string(),
        }
    }

    /// A 401 whose body carries an expired/invalid token signature.
    pub fn is_token_expiry(&self) -> bool {
        match self {
            Self::Status { status, body, .. } => is_token_expiry(status.as_u16(), body),
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            Self::StreamTimeout { .. } => true,
            Self::Request(error) => error.is_timeout(),
            _ => false,
        }
    }

    pub fn http_status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(error) => error.status(),
            _ => None,
        }
    }
}

/// Error bodies seen from the service: FastAPI-style `{"detail": ...}` or
/// `{"error": ..., "message": ...}`. `error` may be a string or an object.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    pub detail: Option<serde_json::Value>,
    pub error: Option<serde_json::Value>,
    pub message: Option<String>,
}

impl ErrorPayload {
    fn message(&self) -> Option<String> {
        self.detail
            .as_ref()
            .and_then(value_message)
            .or_else(|| self.error.as_ref().and_then(value_message))
            .or_else(|| self.message.clone().filter(|message| !message.is_empty()))
    }
}

fn value_message(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(text) if !text.is_empty() => Some(text.clone()),
        serde_json::Value::Object(object) => object
            .get("message")
            .and_then(serde_json::Value::as_str)
            .filter(|text| !text.is_empty())
            .map(ToOwned::to_owned),
        serde_json::Value::Null | serde_json::Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

/// Human-readable message for a failed response.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ErrorPayload>(body) {
        if let Some(message) = payload.message() {
            return message;
        }
    }

    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}
