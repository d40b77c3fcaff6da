use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

/// Wait applied when a 429 body carries no usable `retryAfter` value.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

#[derive(Debug)]
pub enum StudioApiError {
    MissingAccessToken,
    InvalidHeader(String),
    Request(reqwest::Error),
    Status(StatusCode, String),
    /// HTTP 429 observed before any streaming began.
    RateLimited {
        retry_after: u64,
    },
    Serde(JsonError),
    Cancelled,
}

impl StudioApiError {
    /// Seconds the caller should wait, when this is a rate-limit error.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

impl fmt::Display for StudioApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAccessToken => write!(f, "access token is required"),
            Self::InvalidHeader(message) => write!(f, "invalid header: {message}"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::RateLimited { retry_after } => {
                write!(f, "rate limited, retry after {retry_after}s")
            }
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::Cancelled => write!(f, "request was cancelled"),
        }
    }
}

impl std::error::Error for StudioApiError {}

impl From<reqwest::Error> for StudioApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for StudioApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ErrorBodyFields>,
    message: Option<String>,
    #[serde(rename = "retryAfter")]
    retry_after: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorBodyFields {
    message: Option<String>,
}

/// Extract a user-presentable message from a non-2xx response body.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        let nested = parsed.error.and_then(|fields| fields.message);
        if let Some(message) = nested
            .or(parsed.message)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
        {
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

/// Parse `retryAfter` seconds from a 429 body, defaulting when absent or
/// malformed.
pub fn parse_retry_after(body: &str) -> u64 {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.retry_after)
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}
