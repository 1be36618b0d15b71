//! Extracted records

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One structured item returned by the extraction backend.
///
/// The schema belongs to the extraction contract; the orchestrator only
/// moves records around in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Value);

impl Record {
    /// Wrap a JSON value
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Borrow the underlying JSON value
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume the record, yielding its JSON value
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Look up a top-level field when the record is a JSON object
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.as_object().and_then(|obj| obj.get(name))
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
