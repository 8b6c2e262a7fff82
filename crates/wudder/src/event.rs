//! Notarized content records.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single named piece of content inside an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub field: String,
    pub value: String,
}

impl Fragment {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Content submitted for notarization.
///
/// # Example
///
/// ```
/// use wudder::{Event, Fragment};
///
/// let event = Event::new("NEW_TRACE", vec![Fragment::new("lot", "A-113")]);
/// assert!(event.trace.is_none());
/// assert!(!event.salt.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    /// Evhash of the trace this event extends.
    #[serde(default)]
    pub trace: Option<String>,
    #[serde(default)]
    pub fragments: Vec<Fragment>,
    /// Unix seconds.
    pub timestamp: i64,
    pub salt: String,
}

impl Event {
    /// A new event stamped with the current time and a random salt.
    pub fn new(event_type: impl Into<String>, fragments: Vec<Fragment>) -> Self {
        Self {
            event_type: event_type.into(),
            trace: None,
            fragments,
            timestamp: Utc::now().timestamp(),
            salt: uuid::Uuid::new_v4().simple().to_string(),
        }
    }

    /// Attach this event to an existing trace.
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }
}

/// The output of the prepare step of a two-phase submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedEvent {
    /// The transaction to sign and confirm.
    pub tx: Value,
    /// The event as the service will store it.
    pub event: Event,
    /// Temporary hash identifying the prepared evidence.
    pub hash: String,
    pub url: String,
}

/// A stored evidence record as returned by trace queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub evhash: String,
    #[serde(rename = "type", default)]
    pub evidence_type: Option<String>,
    #[serde(default)]
    pub graphn_data: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub original_content: Option<String>,
}

/// A trace: its creating evidence and every evidence appended to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub creation_evidence: Evidence,
    #[serde(default)]
    pub childs: Vec<Evidence>,
}

/// Anchoring proof for an evidence.
///
/// `proof` and `prefixes` are only present once the evidence is included in
/// an anchored tree; they are omitted, not emptied, otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    pub block_proof: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefixes: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_uses_wire_field_names() {
        let event = Event {
            event_type: "ADD_EVENT".into(),
            trace: Some("abc".into()),
            fragments: vec![Fragment::new("k", "v")],
            timestamp: 1_600_000_000,
            salt: "s".into(),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "type": "ADD_EVENT",
                "trace": "abc",
                "fragments": [{ "field": "k", "value": "v" }],
                "timestamp": 1_600_000_000,
                "salt": "s",
            })
        );
    }

    #[test]
    fn new_events_get_distinct_salts() {
        let a = Event::new("NEW_TRACE", vec![]);
        let b = Event::new("NEW_TRACE", vec![]);
        assert_ne!(a.salt, b.salt);
        assert!(a.timestamp > 0);
    }

    #[test]
    fn proof_omits_absent_fields() {
        let proof = Proof {
            block_proof: json!({ "block": 1 }),
            proof: None,
            prefixes: None,
        };
        assert_eq!(
            serde_json::to_value(&proof).unwrap(),
            json!({ "block_proof": { "block": 1 } })
        );
    }

    #[test]
    fn trace_deserializes_from_camel_case() {
        let trace: Trace = serde_json::from_value(json!({
            "creationEvidence": { "evhash": "root", "type": "NEW_TRACE", "displayName": "t" },
            "childs": [{ "evhash": "child", "graphnData": null }],
        }))
        .unwrap();
        assert_eq!(trace.creation_evidence.evhash, "root");
        assert_eq!(trace.creation_evidence.display_name.as_deref(), Some("t"));
        assert_eq!(trace.childs.len(), 1);
        assert!(trace.childs[0].graphn_data.is_none());
    }
}
