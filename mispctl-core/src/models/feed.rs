//! Feed descriptors.
//!
//! The REST API returns feeds either flat (`{"id": "1", ...}`) or wrapped in
//! an envelope (`{"Feed": {"id": "1", ...}}`). Callers only rely on the
//! identifier; everything else is carried through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which the API nests a feed object.
pub const FEED_ENVELOPE_KEY: &str = "Feed";

/// A feed as returned by the remote server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedDescriptor(Value);

impl FeedDescriptor {
    /// Wraps a raw JSON value.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the raw JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Returns the attribute map, unwrapping the envelope if present.
    ///
    /// Returns `None` if the descriptor is not a JSON object.
    pub fn attributes(&self) -> Option<&Map<String, Value>> {
        let outer = self.0.as_object()?;
        match outer.get(FEED_ENVELOPE_KEY) {
            Some(Value::Object(inner)) => Some(inner),
            _ => Some(outer),
        }
    }

    /// Resolves the feed identifier from either shape.
    ///
    /// Strings are trimmed and numbers rendered in decimal. Empty,
    /// missing or non-scalar identifiers yield `None`.
    pub fn id(&self) -> Option<String> {
        let raw = self.attributes()?.get("id")?;
        let id = match raw {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!id.is_empty()).then_some(id)
    }

    /// Builds a full edit payload: existing attributes with the enabling
    /// flags merged on top and the identifier guaranteed present as a string.
    pub fn merged_enable_payload(&self, feed_id: &str) -> Value {
        let mut base = self.attributes().cloned().unwrap_or_default();
        base.insert("enabled".to_string(), Value::Bool(true));
        base.insert("caching_enabled".to_string(), Value::Bool(true));
        let id = match base.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => feed_id.to_string(),
        };
        base.insert("id".to_string(), Value::String(id));
        Value::Object(base)
    }
}

impl From<Value> for FeedDescriptor {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
