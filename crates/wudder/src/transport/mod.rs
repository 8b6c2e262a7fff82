//! Query/mutation transport.
//!
//! The [`Transport`] trait is the seam between the client core and the wire.
//! [`GraphqlTransport`] is the HTTP implementation used in production.

mod graphql;
#[cfg(test)]
pub(crate) mod mock;
pub(crate) mod operations;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;
use crate::error::TransportError;

pub use graphql::{AUTH_HEADER, GraphqlTransport};

/// A named query or mutation document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// GraphQL operation name.
    pub name: &'static str,
    /// The full document text.
    pub document: &'static str,
    /// The field under `data` holding this operation's result.
    pub root_field: &'static str,
}

/// The `(data, errors)` pair returned by a transport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub data: Option<Value>,
    pub errors: Vec<ErrorEntry>,
}

/// A single entry of a response's error list.
///
/// Entries are kept as raw JSON. The structured `code` field is optional and
/// its absence is not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorEntry(Value);

impl ErrorEntry {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// The integer `code` field, if present.
    pub fn code(&self) -> Option<i64> {
        self.0.get("code").and_then(Value::as_i64)
    }

    pub fn message(&self) -> Option<&str> {
        self.0.get("message").and_then(Value::as_str)
    }

    /// The raw entry as sent by the service.
    pub fn raw(&self) -> &Value {
        &self.0
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code(), self.message()) {
            (Some(code), Some(message)) => write!(f, "[{}] {}", code, message),
            (None, Some(message)) => write!(f, "{}", message),
            _ => write!(f, "{}", self.0),
        }
    }
}

/// Executes operations against the service.
///
/// Implementations hold the header state attached to every request.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one operation. Returns `Err` only for faults that produced no
    /// usable response envelope.
    async fn execute(
        &self,
        operation: &Operation,
        variables: Value,
    ) -> std::result::Result<Response, TransportError>;

    /// Set a header sent with every subsequent request.
    fn set_header(&self, name: &str, value: &str) -> Result<()>;
}
