//! Error types for the wudder library.
//!
//! This module provides a unified error type with explicit variants for
//! transport faults, classified service failures, session state, malformed
//! responses, and input validation errors.

use thiserror::Error;

use crate::failure::{Failure, FailureKind};

/// The unified error type for wudder operations.
///
/// Callers are expected to branch on [`Error::failure_kind`] rather than on
/// message text. No variant hides the kind of a classified failure.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A failure reported by the service and classified by kind.
    #[error("{0}")]
    Failure(#[from] Failure),

    /// Local session state errors.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The service answered without an error but with an unusable payload.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (endpoint URL, header values, JSON payloads).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns the classified failure kind, if this error came from the service.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Error::Failure(failure) => Some(failure.kind()),
            _ => None,
        }
    }

    /// Whether a new attempt of the same call may succeed.
    ///
    /// Rate limiting and every transport fault are retryable. Everything
    /// else is surfaced immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(_) => true,
            Error::Failure(failure) => failure.is_retryable(),
            Error::Auth(_) | Error::Protocol(_) | Error::InvalidInput(_) => false,
        }
    }

    /// Shorthand for `failure_kind() == Some(FailureKind::NotFound)`.
    pub fn is_not_found(&self) -> bool {
        self.failure_kind() == Some(FailureKind::NotFound)
    }
}

/// Transport-level errors. None of these carry a structured error payload.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// The endpoint answered with a non-success status and no GraphQL body.
    #[error("HTTP {status}")]
    Status { status: u16 },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                message: err.to_string(),
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(TransportError::from(err))
    }
}

/// Local session state errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No refresh token is held yet; the client has not logged in.
    #[error("no refresh token available; log in first")]
    NotLoggedIn,
}

/// Errors for responses that carry no error list but cannot be used.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The response had neither `data` nor `errors`.
    #[error("{operation}: response carried no data")]
    MissingData { operation: &'static str },

    /// A required field was absent from the response.
    #[error("{operation}: missing field '{field}'")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    /// The response payload did not match the expected shape.
    #[error("{operation}: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid endpoint URL.
    #[error("invalid endpoint URL '{value}': {reason}")]
    Endpoint { value: String, reason: String },

    /// A header name or value that cannot be sent.
    #[error("invalid header '{name}': {reason}")]
    Header { name: String, reason: String },

    /// Invalid JSON payload.
    #[error("invalid JSON: {message}")]
    Json { message: String },
}

impl From<serde_json::Error> for InvalidInputError {
    fn from(err: serde_json::Error) -> Self {
        InvalidInputError::Json {
            message: err.to_string(),
        }
    }
}
