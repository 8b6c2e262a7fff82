//! GraphQL-over-HTTP transport.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument, trace};

use crate::Result;
use crate::error::{InvalidInputError, TransportError};
use crate::failure::FailureKind;
use crate::types::EndpointUrl;

use super::{ErrorEntry, Operation, Response, Transport};

/// Header carrying the access token.
pub const AUTH_HEADER: &str = "x-jwt-token";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlRequest<'a> {
    query: &'a str,
    operation_name: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphqlEnvelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<ErrorEntry>>,
}

impl From<GraphqlEnvelope> for Response {
    fn from(envelope: GraphqlEnvelope) -> Self {
        Response {
            data: envelope.data.filter(|d| !d.is_null()),
            errors: envelope.errors.unwrap_or_default(),
        }
    }
}

/// HTTP client posting GraphQL documents to a single endpoint.
#[derive(Debug)]
pub struct GraphqlTransport {
    client: reqwest::Client,
    endpoint: EndpointUrl,
    headers: RwLock<HeaderMap>,
}

impl GraphqlTransport {
    /// Create a transport for the given endpoint.
    ///
    /// `timeout` bounds every single request.
    pub fn new(endpoint: EndpointUrl, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("wudder/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            headers: RwLock::new(HeaderMap::new()),
        })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = self
            .headers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }
}

#[async_trait]
impl Transport for GraphqlTransport {
    #[instrument(skip(self, variables), fields(endpoint = %self.endpoint, operation = operation.name))]
    async fn execute(
        &self,
        operation: &Operation,
        variables: Value,
    ) -> std::result::Result<Response, TransportError> {
        debug!("GraphQL request");

        let body = GraphqlRequest {
            query: operation.document,
            operation_name: operation.name,
            variables,
        };

        let response = self
            .client
            .post(self.endpoint.as_str())
            .headers(self.headers())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        trace!(status = %status, "GraphQL response");

        let bytes = response.bytes().await?;
        let parsed = serde_json::from_slice::<GraphqlEnvelope>(&bytes);

        if status.is_success() {
            return parsed
                .map(Response::from)
                .map_err(|err| TransportError::Http {
                    message: format!("undecodable response body: {}", err),
                });
        }

        // Error statuses still count as structured when they carry an error list
        match parsed {
            Ok(envelope) if envelope.errors.as_ref().is_some_and(|e| !e.is_empty()) => {
                Ok(envelope.into())
            }
            _ => bare_status(status),
        }
    }

    fn set_header(&self, name: &str, value: &str) -> Result<()> {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| InvalidInputError::Header {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let mut header_value =
            HeaderValue::from_str(value).map_err(|e| InvalidInputError::Header {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        header_value.set_sensitive(true);

        self.headers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(header_name, header_value);
        Ok(())
    }
}

/// A non-2xx reply without an error list. Statuses that name a failure kind
/// become a one-entry error list so they classify like any service failure;
/// the rest stay transport faults.
fn bare_status(status: StatusCode) -> std::result::Result<Response, TransportError> {
    let code = i64::from(status.as_u16());
    match FailureKind::from_code(Some(code)) {
        FailureKind::Unexpected => Err(TransportError::Status {
            status: status.as_u16(),
        }),
        _ => Ok(Response {
            data: None,
            errors: vec![ErrorEntry::new(json!({
                "message": status.canonical_reason().unwrap_or("HTTP error"),
                "code": code,
            }))],
        }),
    }
}
