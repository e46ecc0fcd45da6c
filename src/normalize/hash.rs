//! Content-addressed atom identity.
//!
//! The dedup contract: two atoms of the same evidence type with
//! byte-identical canonical payloads always share an id. Canonical means a
//! key-sorted, compact JSON serialization, so neither key insertion order
//! nor source column order can perturb the hash.

use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Hex chars of the content hash carried into the atom id.
const ATOM_ID_HASH_LEN: usize = 12;

/// Serialize a JSON value with all object keys sorted, recursively.
pub fn canonical_json(value: &Value) -> String {
    fn sort(value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: std::collections::BTreeMap<String, Value> =
                    map.iter().map(|(k, v)| (k.clone(), sort(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(items) => Value::Array(items.iter().map(sort).collect()),
            other => other.clone(),
        }
    }
    sort(value).to_string()
}

/// SHA-256 over the canonical serialization, lowercase hex.
pub fn content_hash(payload: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(payload).as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Derive an atom id from the evidence type and content hash. The legacy
/// path (no hash available) falls back to a random id.
pub fn atom_id(evidence_type: &str, content_hash: Option<&str>) -> String {
    match content_hash {
        Some(hash) => format!("{evidence_type}:{}", &hash[..ATOM_ID_HASH_LEN.min(hash.len())]),
        None => {
            let random = Uuid::new_v4().simple().to_string();
            format!("{evidence_type}:{}", &random[..ATOM_ID_HASH_LEN])
        }
    }
}
