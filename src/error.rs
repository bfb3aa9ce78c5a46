//! The normalized error every backend failure is turned into.
//!
//! Callers above the transport only ever see [`ApiError`]; raw `reqwest`
//! errors and HTTP statuses are mapped here exactly once.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MSG_BAD_REQUEST: &str = "Bad request";
pub const MSG_FILE_TOO_LARGE: &str = "File too large (max 10 MB)";
pub const MSG_UNPROCESSABLE: &str = "The document could not be processed";
pub const MSG_SERVER_ERROR: &str = "Server error. Please try again.";
pub const MSG_CONNECTION: &str = "Connection error";
pub const MSG_UNKNOWN: &str = "Unknown error";

/// Status reported when there was no HTTP response at all
pub const DEFAULT_STATUS: u16 = 500;

/// Normalized backend error: a human readable message, the HTTP status
/// (500 when none was received) and the raw backend detail if any.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message} (status {status})")]
pub struct ApiError {
    pub message: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Error body returned by the backend on failure
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

impl ApiError {
    /// Map an HTTP error status and its optional backend detail.
    pub fn from_status(status: u16, detail: Option<String>) -> Self {
        let message = match status {
            400 => non_empty(detail.as_deref()).unwrap_or(MSG_BAD_REQUEST),
            413 => MSG_FILE_TOO_LARGE,
            422 => non_empty(detail.as_deref()).unwrap_or(MSG_UNPROCESSABLE),
            500 => MSG_SERVER_ERROR,
            _ => MSG_UNKNOWN,
        }
        .to_string();

        Self {
            message,
            status,
            detail,
        }
    }

    /// Map an HTTP error status together with the raw response body.
    ///
    /// Only a string `detail` is used as the message; anything else (e.g. a
    /// validation list) is kept verbatim in `detail`.
    pub fn from_response_body(status: StatusCode, body: &[u8]) -> Self {
        let detail = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail);

        match detail {
            Some(serde_json::Value::String(text)) => Self::from_status(status.as_u16(), Some(text)),
            Some(other) => {
                let mut err = Self::from_status(status.as_u16(), None);
                err.detail = Some(other.to_string());
                err
            }
            None => Self::from_status(status.as_u16(), None),
        }
    }

    /// The request never produced a response (connection refused, DNS,
    /// timeout). Uses the transport's own message when it has one.
    pub fn no_response(message: Option<&str>) -> Self {
        Self {
            message: non_empty(message).unwrap_or(MSG_CONNECTION).to_string(),
            status: DEFAULT_STATUS,
            detail: None,
        }
    }

    /// Convert a transport-level failure
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_status(status.as_u16(), None);
        }
        let text = if err.is_timeout() {
            "Request timed out".to_string()
        } else {
            err.to_string()
        };
        Self::no_response(Some(&text))
    }

    /// A 2xx response whose body could not be decoded
    pub fn undecodable(status: StatusCode, err: &reqwest::Error) -> Self {
        Self {
            message: format!("Invalid response from server: {}", err),
            status: status.as_u16(),
            detail: None,
        }
    }

    /// The message, or `fallback` when the backend gave an empty one
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        non_empty(Some(&self.message)).unwrap_or(fallback)
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}
