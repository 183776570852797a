//! Content fingerprints for change detection.
//!
//! Uses BLAKE3 over the canonical JSON encoding of a panel's content.
//! `serde_json` maps keep keys sorted, so equal values always encode to
//! the same bytes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Short, stable fingerprint of a structured value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Number of hex characters kept from the digest
    pub const LEN: usize = 12;

    /// Fingerprint a JSON value
    #[must_use]
    pub fn of(value: &Value) -> Self {
        let bytes = serde_json::to_vec(value).unwrap_or_default();
        Self::of_bytes(&bytes)
    }

    /// Fingerprint raw bytes
    #[must_use]
    pub fn of_bytes(data: &[u8]) -> Self {
        let digest = blake3::hash(data);
        let mut hex = hex::encode(digest.as_bytes());
        hex.truncate(Self::LEN);
        Self(hex)
    }

    /// Get as str
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Fingerprint {
    fn default() -> Self {
        Self::of(&Value::Null)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fingerprint_length() {
        let fp = Fingerprint::of(&json!({"rows": [1, 2, 3]}));
        assert_eq!(fp.as_str().len(), Fingerprint::LEN);
    }

    #[test]
    fn test_fingerprint_key_order_independent() {
        let a: Value = serde_json::from_str(r#"{"a": 1, "b": 2}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"b": 2, "a": 1}"#).unwrap();
        assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn test_fingerprint_detects_change() {
        let a = Fingerprint::of(&json!({"value": 1}));
        let b = Fingerprint::of(&json!({"value": 2}));
        assert_ne!(a, b);
    }

    proptest::proptest! {
        #[test]
        fn prop_fingerprint_deterministic(s: String, n: i64) {
            let value = json!({"label": s, "value": n});
            proptest::prop_assert_eq!(Fingerprint::of(&value), Fingerprint::of(&value.clone()));
        }
    }
}
