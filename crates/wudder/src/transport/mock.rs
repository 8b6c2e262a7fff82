//! In-memory transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::Result;
use crate::error::{InvalidInputError, TransportError};

use super::{ErrorEntry, Operation, Response, Transport};

/// A canned reply for one `execute` call.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    /// Success; the value is placed under the operation's root field.
    Data(Value),
    /// A response carrying this error list.
    Errors(Vec<Value>),
    /// A connection fault with no response.
    Fault,
    /// Wait, then reply.
    Delayed(Duration, Box<Reply>),
}

impl Reply {
    pub(crate) fn code(code: i64) -> Self {
        Reply::Errors(vec![json!({ "message": "scripted", "code": code })])
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub variables: Value,
    pub auth_header: Option<String>,
}

/// Replies are scripted per operation name. Once a script runs out, its last
/// reply repeats.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    scripts: Mutex<HashMap<&'static str, VecDeque<Reply>>>,
    headers: Mutex<HashMap<String, String>>,
    calls: Mutex<HashMap<&'static str, Vec<Call>>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn script(&self, operation: &Operation, reply: Reply) -> &Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(operation.name)
            .or_default()
            .push_back(reply);
        self
    }

    pub(crate) fn calls(&self, operation: &Operation) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap()
            .get(operation.name)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn header(&self, name: &str) -> Option<String> {
        self.headers.lock().unwrap().get(name).cloned()
    }

    fn next_reply(&self, operation: &Operation) -> Reply {
        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts.entry(operation.name).or_default();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or_else(|| panic!("no reply scripted for {}", operation.name))
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(
        &self,
        operation: &Operation,
        variables: Value,
    ) -> std::result::Result<Response, TransportError> {
        let auth_header = self.header(super::AUTH_HEADER);
        self.calls
            .lock()
            .unwrap()
            .entry(operation.name)
            .or_default()
            .push(Call {
                variables,
                auth_header,
            });

        let mut reply = self.next_reply(operation);
        loop {
            match reply {
                Reply::Data(value) => {
                    let mut data = serde_json::Map::new();
                    data.insert(operation.root_field.to_string(), value);
                    return Ok(Response {
                        data: Some(Value::Object(data)),
                        errors: Vec::new(),
                    });
                }
                Reply::Errors(errors) => {
                    return Ok(Response {
                        data: None,
                        errors: errors.into_iter().map(ErrorEntry::new).collect(),
                    });
                }
                Reply::Fault => {
                    return Err(TransportError::Connection {
                        message: "scripted connection fault".into(),
                    });
                }
                Reply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
            }
        }
    }

    fn set_header(&self, name: &str, value: &str) -> Result<()> {
        if value.chars().any(char::is_control) {
            return Err(InvalidInputError::Header {
                name: name.to_string(),
                reason: "control character in value".into(),
            }
            .into());
        }
        self.headers
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }
}
