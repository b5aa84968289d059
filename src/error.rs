//! Typed merge failures.
//!
//! All failure modes are local, recoverable conditions reported to the caller.
//! Resolution is pure and deterministic, so retrying with identical input can
//! only reproduce the same error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::priority::OverridePriority;

/// One contribution tied at the winning priority of a conflict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contender {
    /// Position of the contribution in the input sequence.
    pub index: usize,

    /// Origin label, when the contribution carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    /// The contributed value.
    pub value: Value,
}

impl Contender {
    /// Identity for messages: the origin label, or the input position.
    pub fn identity(&self) -> String {
        match &self.origin {
            Some(origin) => origin.clone(),
            None => format!("contribution #{}", self.index),
        }
    }
}

/// Details of a scalar merge conflict: two or more contributions tied at the
/// winning override priority with differing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    /// The key under resolution, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// The tied (winning) override priority.
    pub priority: OverridePriority,

    /// Every contribution tied at that priority.
    pub contenders: Vec<Contender>,
}

impl Conflict {
    /// Number of tied contributions.
    pub fn count(&self) -> usize {
        self.contenders.len()
    }

    /// Identities of the tied contributions, in input order.
    pub fn contender_identities(&self) -> Vec<String> {
        self.contenders.iter().map(Contender::identity).collect()
    }
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let identities = self.contender_identities().join(", ");
        match &self.key {
            Some(key) => write!(
                f,
                "{} conflicting definitions for key `{}` at override priority {}: {}",
                self.count(),
                key,
                self.priority,
                identities
            ),
            None => write!(
                f,
                "{} conflicting definitions at override priority {}: {}",
                self.count(),
                self.priority,
                identities
            ),
        }
    }
}

/// Errors produced by merge resolution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MergeError {
    /// Two or more contributions tied at the winning override priority with
    /// differing values. Resolution never silently picks one.
    #[error("{0}")]
    Conflict(Conflict),

    /// Preset name not present in the priority tables.
    #[error("unknown priority preset `{0}`")]
    UnknownPreset(String),

    /// Scalar resolution invoked with no contributions. Carries the key when
    /// reached through a merge set.
    #[error("no contributions to resolve{}", key_suffix(.key))]
    Empty { key: Option<String> },

    /// One key received both scalar and list contributions.
    #[error("key `{0}` received both scalar and list contributions")]
    KindMismatch(String),

    /// Canonical-JSON digest of a resolution failed.
    #[error("canonical JSON fingerprint failed: {0}")]
    Fingerprint(String),
}

impl MergeError {
    /// Machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            MergeError::Conflict(_) => "CONFLICT",
            MergeError::UnknownPreset(_) => "UNKNOWN_PRESET",
            MergeError::Empty { .. } => "EMPTY",
            MergeError::KindMismatch(_) => "KIND_MISMATCH",
            MergeError::Fingerprint(_) => "FINGERPRINT",
        }
    }

    /// Attach the key under resolution to errors that can carry one.
    pub(crate) fn with_key(self, key: &str) -> Self {
        match self {
            MergeError::Conflict(conflict) => MergeError::Conflict(Conflict {
                key: Some(key.to_string()),
                ..conflict
            }),
            MergeError::Empty { .. } => MergeError::Empty {
                key: Some(key.to_string()),
            },
            other => other,
        }
    }
}

fn key_suffix(key: &Option<String>) -> String {
    match key {
        Some(key) => format!(" for key `{}`", key),
        None => String::new(),
    }
}
