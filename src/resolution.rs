//! Resolution outcomes with provenance.
//!
//! A [`ResolvedKey`] records what one key resolved to and how; a
//! [`Resolution`] holds every key of a resolved merge set. The fingerprint is
//! the SHA-256 hex digest of the RFC 8785 canonical JSON of the key → value
//! map, so identical inputs always produce identical digests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::MergeError;
use crate::priority::OverridePriority;

/// Whether a key merged as a scalar or as a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    Scalar,
    List,
}

/// The outcome for one configuration key after merging all contributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedKey {
    /// The resolved value. List keys resolve to an array.
    pub value: Value,

    /// How the key merged.
    pub kind: KeyKind,

    /// Number of contributions considered.
    pub contributions: usize,

    /// Override priority that won (scalar keys only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_priority: Option<OverridePriority>,

    /// Origin of the winning contribution (scalar keys, when labeled).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    /// Origins of list segments in concatenation order (labeled ones only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merged_from: Vec<String>,
}

/// Outcome of resolving a whole merge set.
///
/// Computed fresh on every resolve; contributions added afterwards are picked
/// up by the next resolve, never by an existing `Resolution`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Per-key outcomes, in key order.
    pub entries: BTreeMap<String, ResolvedKey>,
}

impl Resolution {
    pub(crate) fn new(entries: BTreeMap<String, ResolvedKey>) -> Self {
        Self { entries }
    }

    /// The resolved value for a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// The full outcome record for a key.
    pub fn entry(&self, key: &str) -> Option<&ResolvedKey> {
        self.entries.get(key)
    }

    /// The resolved value for a key, as a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|value| value.as_str())
    }

    /// The resolved value for a key, as a bool.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|value| value.as_bool())
    }

    /// The resolved value for a key, as a u64.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|value| value.as_u64())
    }

    /// The resolved elements for a list key.
    pub fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.get(key).and_then(|value| value.as_array())
    }

    /// Number of resolved keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no key resolved.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Key → resolved value view, without provenance.
    pub fn values(&self) -> BTreeMap<&str, &Value> {
        self.entries
            .iter()
            .map(|(key, entry)| (key.as_str(), &entry.value))
            .collect()
    }

    /// Serialize the full resolution to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// SHA-256 hex digest of the RFC 8785 canonical JSON of the values view.
    ///
    /// The digest covers resolved values only; provenance metadata does not
    /// affect it. Integers with magnitude above 2^53 cannot be canonicalized
    /// exactly and fail with [`MergeError::Fingerprint`] before digesting.
    pub fn fingerprint(&self) -> Result<String, MergeError> {
        for (key, entry) in &self.entries {
            check_canonical_range(key, &entry.value)?;
        }
        let jcs_bytes = serde_json_canonicalizer::to_vec(&self.values())
            .map_err(|e| MergeError::Fingerprint(e.to_string()))?;
        let mut hasher = Sha256::new();
        hasher.update(&jcs_bytes);
        Ok(hex::encode(hasher.finalize()))
    }
}

/// Largest integer magnitude canonical JSON serializes exactly.
const JCS_INTEGER_LIMIT: u64 = 1 << 53;

// The canonicalizer writes integers through f64; past the limit distinct
// values share a representation.
fn check_canonical_range(key: &str, value: &Value) -> Result<(), MergeError> {
    match value {
        Value::Number(number) => {
            let in_range = if let Some(unsigned) = number.as_u64() {
                unsigned <= JCS_INTEGER_LIMIT
            } else if let Some(signed) = number.as_i64() {
                signed >= -(JCS_INTEGER_LIMIT as i64)
            } else {
                true
            };
            if in_range {
                Ok(())
            } else {
                Err(MergeError::Fingerprint(format!(
                    "integer {} at key `{}` cannot be represented exactly",
                    number, key
                )))
            }
        }
        Value::Array(elements) => elements
            .iter()
            .try_for_each(|element| check_canonical_range(key, element)),
        Value::Object(members) => members
            .values()
            .try_for_each(|member| check_canonical_range(key, member)),
        _ => Ok(()),
    }
}
