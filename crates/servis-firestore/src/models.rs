//! Firestore REST wire models and value conversion
//!
//! Firestore wraps every field value in a single-key object naming its type,
//! e.g. `{"stringValue": "Marko"}` or `{"integerValue": "182000"}` (64-bit
//! integers travel as strings).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, json};
use servis_api::{Fields, Value};

/// Text layout timestamp values are converted to
pub const TIMESTAMP_TEXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreDocument {
    /// Full resource name, `projects/{p}/databases/{d}/documents/{collection}/{id}`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl FirestoreDocument {
    pub fn with_fields(fields: &Fields) -> Self {
        Self {
            fields: encode_fields(fields),
            ..Self::default()
        }
    }

    /// Document id: the last segment of the resource name
    pub fn id(&self) -> &str {
        document_id(&self.name)
    }

    pub fn decoded_fields(&self) -> Fields {
        decode_fields(&self.fields)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<FirestoreDocument>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

pub fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

pub fn encode_value(value: &Value) -> serde_json::Value {
    match value {
        Value::String(s) => json!({ "stringValue": s }),
        Value::Integer(i) => json!({ "integerValue": i.to_string() }),
        Value::Float(f) => json!({ "doubleValue": f }),
        Value::Boolean(b) => json!({ "booleanValue": b }),
        Value::Null => json!({ "nullValue": null }),
    }
}

/// Decode a typed Firestore value.
///
/// Timestamps become `yyyy-MM-dd HH:mm:ss` text in UTC. References keep
/// their resource name; maps, arrays and other kinds keep their JSON text.
pub fn decode_value(raw: &serde_json::Value) -> Value {
    let Some((kind, inner)) = raw.as_object().and_then(|o| o.iter().next()) else {
        return Value::Null;
    };
    match kind.as_str() {
        "stringValue" | "referenceValue" => {
            Value::String(inner.as_str().unwrap_or_default().to_string())
        }
        "integerValue" => match inner {
            serde_json::Value::String(s) => s
                .parse()
                .map(Value::Integer)
                .unwrap_or_else(|_| Value::String(s.clone())),
            other => Value::from_json_value(other.clone()),
        },
        "doubleValue" => match inner.as_f64() {
            Some(f) => Value::Float(f),
            // NaN and infinities arrive as strings
            None => Value::String(inner.as_str().unwrap_or_default().to_string()),
        },
        "booleanValue" => Value::Boolean(inner.as_bool().unwrap_or_default()),
        "nullValue" => Value::Null,
        "timestampValue" => {
            let text = inner.as_str().unwrap_or_default();
            match DateTime::parse_from_rfc3339(text) {
                Ok(ts) => Value::String(
                    ts.with_timezone(&Utc)
                        .format(TIMESTAMP_TEXT_FORMAT)
                        .to_string(),
                ),
                Err(_) => Value::String(text.to_string()),
            }
        }
        _ => Value::String(inner.to_string()),
    }
}

pub fn encode_fields(fields: &Fields) -> Map<String, serde_json::Value> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), encode_value(value)))
        .collect()
}

pub fn decode_fields(fields: &Map<String, serde_json::Value>) -> Fields {
    fields
        .iter()
        .map(|(name, raw)| (name.clone(), decode_value(raw)))
        .collect()
}

/// Field path as written in an update mask; names that are not plain
/// identifiers are quoted with backticks
pub fn field_path(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}
