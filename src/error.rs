//! Standard errors used by all functions in the crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error collecting all possible failures of the CoreLedger client.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The client configuration is invalid. Raised before any network I/O.
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    /// The HTTP transaction (or the STOMP connection) could not be completed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    /// Error returned by a CoreLedger API endpoint.
    #[error("{0}")]
    Protocol(#[from] ApiError),
    /// A payload could not be encoded to or decoded from JSON.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The self-identity assertion could not be signed.
    #[error("Error signing the authentication assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    /// Catch-all variant for unexpected errors.
    #[error(transparent)]
    Other(anyhow::Error),
}

/// Coarse classification of an [`Error`](crate::error::Error), useful to decide whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Protocol,
    Serialization,
    Internal,
}

impl Error {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Protocol(_) => ErrorKind::Protocol,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::Signing(_) | Error::Other(_) => ErrorKind::Internal,
        }
    }

    /// Returns `true` if the operation was aborted through its cancellation token.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Transport(TransportError::Cancelled))
    }

    /// Returns `true` if the transport gave up waiting for the server.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Transport(TransportError::Http(e)) if e.is_timeout())
    }

    /// HTTP status of a protocol error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Protocol(api_error) => Some(api_error.status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(TransportError::Http(e))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Transport(TransportError::Io(e))
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(e: reqwest_middleware::Error) -> Self {
        match e {
            reqwest_middleware::Error::Reqwest(e) => e.into(),
            reqwest_middleware::Error::Middleware(e) => {
                e.downcast::<Error>().unwrap_or_else(Error::Other)
            }
        }
    }
}

impl From<Error> for reqwest_middleware::Error {
    fn from(e: Error) -> Self {
        reqwest_middleware::Error::Middleware(e.into())
    }
}

/// Failures below the HTTP/STOMP protocol level.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// Reqwest error (DNS, TCP, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The cancellation token bound to the operation fired.
    #[error("Operation cancelled")]
    Cancelled,
    /// I/O error on a raw connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TLS setup failure.
    #[error("TLS error: {0}")]
    Tls(String),
    /// The connection was closed and can no longer be used.
    #[error("Connection closed")]
    ConnectionClosed,
    /// The message broker answered with an `ERROR` frame.
    #[error("Message broker error: {0}")]
    Broker(String),
}

/// Error envelope returned by CoreLedger for non-success responses.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(default)]
    pub status: Option<u16>,
    pub errors: Vec<ApiErrorDetail>,
}

/// A single entry of the error envelope.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorDetail {
    /// Service-defined error number.
    #[serde(default)]
    pub code: i64,
    /// Human readable summary.
    #[serde(default)]
    pub title: String,
    /// Diagnostic detail.
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}

/// CoreLedger HTTP APIs error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status returned by the server.
    pub status: u16,
    /// Errors listed in the response envelope.
    pub errors: Vec<ApiErrorDetail>,
    /// Raw response body, kept only when it was not a valid error envelope.
    pub raw_body: Option<String>,
}

impl ApiError {
    pub(crate) fn from_response_body(http_status: u16, bytes: &[u8]) -> Self {
        match serde_json::from_slice::<ErrorBody>(bytes) {
            Ok(body) => ApiError {
                status: body.status.unwrap_or(http_status),
                errors: body.errors,
                raw_body: None,
            },
            Err(_) => ApiError {
                status: http_status,
                errors: Vec::new(),
                raw_body: Some(String::from_utf8_lossy(bytes).into_owned()),
            },
        }
    }

    /// Returns the first error code of the envelope, if any.
    pub fn code(&self) -> Option<i64> {
        self.errors.first().map(|e| e.code)
    }
}

#[derive(Serialize)]
struct CompactDetail<'a> {
    code: i64,
    title: &'a str,
    detail: &'a str,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let compact = self
            .errors
            .iter()
            .map(|e| CompactDetail {
                code: e.code,
                title: &e.title,
                detail: &e.detail,
            })
            .collect::<Vec<_>>();
        let compact = serde_json::to_string(&compact).map_err(|_| fmt::Error)?;

        write!(f, "CoreLedger HTTP error {}: {}", self.status, compact)?;

        if let Some(ref raw_body) = self.raw_body {
            if !raw_body.is_empty() {
                write!(f, "\nResponse body: {}", raw_body)?;
            }
        }

        Ok(())
    }
}
