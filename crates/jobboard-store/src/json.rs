//! BSON to JSON rendering for API responses.
//!
//! ObjectIds render as 24-character hex strings and dates as RFC 3339
//! strings, matching what browser clients expect. Every other value uses
//! relaxed extended JSON.

use mongodb::bson::{Bson, Document};
use serde_json::{Map, Value};

/// Render a BSON value as plain JSON.
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Value::from(dt.timestamp_millis()),
        },
        Bson::Document(doc) => document_to_json(doc),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

/// Render a document as a JSON object.
pub fn document_to_json(doc: Document) -> Value {
    let map: Map<String, Value> = doc
        .into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect();
    Value::Object(map)
}
