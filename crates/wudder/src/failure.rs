//! Classification of service error lists into typed failures.
//!
//! The service reports failures as a list of error entries, each possibly
//! carrying an integer `code`. Only the first entry decides the kind; the
//! whole list is kept on the [`Failure`] for diagnostics.

use std::fmt;

use serde_json::json;

use crate::transport::ErrorEntry;

/// The kind of a classified failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Code 429: throughput exceeded. Retried with backoff.
    RateLimited,
    /// Code 404: the requested resource does not exist.
    NotFound,
    /// Code 401: token invalid, expired or insufficient.
    Unauthorized,
    /// Code 400: the request was malformed.
    BadRequest,
    /// Any other code, or no code at all.
    Unexpected,
}

impl FailureKind {
    /// Map a structured error code to a kind.
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(429) => FailureKind::RateLimited,
            Some(404) => FailureKind::NotFound,
            Some(401) => FailureKind::Unauthorized,
            Some(400) => FailureKind::BadRequest,
            _ => FailureKind::Unexpected,
        }
    }

    /// Whether a call failing with this kind may be attempted again.
    pub fn is_retryable(self) -> bool {
        matches!(self, FailureKind::RateLimited)
    }

    fn as_str(self) -> &'static str {
        match self {
            FailureKind::RateLimited => "rate limit exceeded",
            FailureKind::NotFound => "not found",
            FailureKind::Unauthorized => "unauthorized",
            FailureKind::BadRequest => "bad request",
            FailureKind::Unexpected => "unexpected error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure reported by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    kind: FailureKind,
    errors: Vec<ErrorEntry>,
}

impl Failure {
    /// A failure raised locally, e.g. for a null lookup result.
    pub(crate) fn synthetic(kind: FailureKind, message: &str) -> Self {
        let code = match kind {
            FailureKind::RateLimited => Some(429),
            FailureKind::NotFound => Some(404),
            FailureKind::Unauthorized => Some(401),
            FailureKind::BadRequest => Some(400),
            FailureKind::Unexpected => None,
        };
        Self {
            kind,
            errors: vec![ErrorEntry::new(json!({ "message": message, "code": code }))],
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// The entry the classification was based on.
    pub fn first(&self) -> &ErrorEntry {
        // Failures are only built from non-empty lists
        &self.errors[0]
    }

    /// Every entry the service returned.
    pub fn errors(&self) -> &[ErrorEntry] {
        &self.errors
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.first())?;
        if self.errors.len() > 1 {
            write!(f, " (+{} more)", self.errors.len() - 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for Failure {}

/// Classify a response's error list.
///
/// Returns `None` for an empty list, meaning the response data is
/// authoritative. Otherwise the first entry's `code` picks the kind; a
/// missing or non-integer code yields [`FailureKind::Unexpected`].
pub fn classify(errors: &[ErrorEntry]) -> Option<Failure> {
    let first = errors.first()?;
    Some(Failure {
        kind: FailureKind::from_code(first.code()),
        errors: errors.to_vec(),
    })
}
