use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One catalog row as returned by the API, keyed by wire field name
pub type Record = Map<String, Value>;

/// Identifier of a catalog row
pub type RecordId = i64;

/// Signed-in session persisted between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
}

/// Read a record's identifier from its key field.
///
/// Accepts both numeric and numeric-string identifiers.
pub fn record_id(record: &Record, key_field: &str) -> Option<RecordId> {
    match record.get(key_field)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Plain text rendering of a JSON cell
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
