//! Error types for API calls.

use thiserror::Error;

/// Classified failure of a single API call.
///
/// None of these are retried by the client; the caller decides what a failure
/// means for the surrounding cycle. The type is `Clone` so a single failed
/// cycle can be reported to every waiter that joined it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The endpoint could not be reached (refused, reset, DNS, timeout).
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The endpoint answered with a non-success status.
    #[error("Error response {status} from {url}")]
    Response { status: u16, url: String },

    /// Anything else: malformed payloads, unexpected shapes, client setup.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ClientError {
    /// Returns true for network-level failures that are expected to heal.
    pub fn is_connection(&self) -> bool {
        matches!(self, ClientError::Connection(_))
    }

    /// HTTP status of a rejected request.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Response { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            ClientError::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Response {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            ClientError::Unexpected(err.to_string())
        }
    }
}

/// A base URL that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid base URL `{url}`: {reason}")]
pub struct InvalidBaseUrl {
    pub url: String,
    pub reason: String,
}
