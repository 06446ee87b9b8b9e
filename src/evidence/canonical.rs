//! Canonical JSON encoding for deterministic hashing and signing.
//!
//! Anything that is hashed or signed goes through this module first: object
//! keys are sorted lexicographically and output is compact, so the same
//! logical value always produces byte-identical output. The canonical
//! encoding is critical — it is what makes content digests and certificate
//! signatures reproducible.

use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;

/// The unit of content that gets hashed and stored: raw bytes plus the
/// caller-supplied metadata, wrapped into one canonical JSON document.
#[derive(Debug, Clone)]
pub struct ContentEnvelope {
    pub content: Vec<u8>,
    pub metadata: Value,
}

impl ContentEnvelope {
    pub fn new(content: Vec<u8>, metadata: Value) -> Self {
        Self { content, metadata }
    }

    /// Canonical byte encoding of the envelope.
    ///
    /// Identical (content, metadata) pairs always yield identical bytes.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let value = serde_json::json!({
            "content": general_purpose::STANDARD.encode(&self.content),
            "metadata": self.metadata,
        });
        canonical_json(&value).into_bytes()
    }
}

/// Serialize a JSON value with sorted object keys and no insignificant
/// whitespace.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(&mut out, value);
    out
}

fn write_canonical(out: &mut String, value: &Value) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Key escaping via serde_json keeps string semantics exact
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(out, &map[*key]);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(out, item);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}
