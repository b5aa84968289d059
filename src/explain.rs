//! Explain output for merge decisions
//!
//! Provides structured JSON and human-readable explanations of how each key
//! resolved for diagnostic purposes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::contribution::{Contribution, ListContribution};
use crate::priority::{OrderPriority, OverridePriority};
use crate::resolution::KeyKind;
use crate::resolve::{ordered, resolve_scalar_key};
use crate::set::MergeSet;

/// Explanation output for a full merge set.
///
/// Unlike [`MergeSet::resolve`], building an explanation never fails: keys
/// that conflict or mix kinds are reported inside the output instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainOutput {
    /// Whether every key resolved
    pub resolved: bool,

    /// Per-key accounts, in key order
    pub keys: Vec<KeyExplanation>,

    /// Human-readable explanation
    pub explanation: String,
}

/// How a single key fared during resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyExplanation {
    /// The key being explained
    pub key: String,

    /// Whether this key resolved
    pub resolved: bool,

    /// The merge kind applied (absent when the key mixes kinds)
    pub kind: Option<KeyKind>,

    /// The merged value (only if resolved)
    pub value: Option<Value>,

    /// Override priority of the winning contribution (scalar keys only)
    pub winning_priority: Option<OverridePriority>,

    /// Failure description when the key did not resolve
    pub failure: Option<String>,

    /// Candidate contributions; declaration order for scalar keys,
    /// concatenation order for list keys
    pub candidates: Vec<CandidateOutput>,
}

/// One contribution as seen by the explainer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateOutput {
    /// Position in declaration order
    pub index: usize,

    /// Declaring origin, when labeled
    pub origin: Option<String>,

    /// Override priority (scalar candidates)
    pub priority: Option<OverridePriority>,

    /// Order priority (list candidates)
    pub order: Option<OrderPriority>,

    /// The contributed value, or the segment elements for list candidates
    pub value: Value,

    /// Whether this candidate supplied (part of) the merged value
    pub selected: bool,
}

impl CandidateOutput {
    /// Origin label, falling back to the declaration position (`contribution
    /// #N` for scalar candidates, `segment #N` for list candidates).
    pub fn identity(&self) -> String {
        match &self.origin {
            Some(origin) => origin.clone(),
            None if self.order.is_some() => format!("segment #{}", self.index),
            None => format!("contribution #{}", self.index),
        }
    }
}

impl ExplainOutput {
    /// Build an explanation for every key in the set.
    pub fn from_set(set: &MergeSet) -> Self {
        let mut keys = Vec::new();
        for key in set.keys() {
            keys.push(Self::explain_key(set, key));
        }

        let resolved = keys.iter().all(|key| key.resolved);
        let explanation = Self::generate_explanation(resolved, &keys);

        Self {
            resolved,
            keys,
            explanation,
        }
    }

    fn explain_key(set: &MergeSet, key: &str) -> KeyExplanation {
        let scalars = set.scalars.get(key);
        let lists = set.lists.get(key);

        match (scalars, lists) {
            (Some(contributions), None) => Self::explain_scalar(key, contributions),
            (None, Some(segments)) => Self::explain_list(key, segments),
            (Some(contributions), Some(segments)) => {
                let mut candidates = scalar_candidates(contributions, None);
                candidates.extend(list_candidates(segments, false));
                KeyExplanation {
                    key: key.to_string(),
                    resolved: false,
                    kind: None,
                    value: None,
                    winning_priority: None,
                    failure: Some("declared as both a scalar and a list".to_string()),
                    candidates,
                }
            }
            (None, None) => KeyExplanation {
                key: key.to_string(),
                resolved: false,
                kind: None,
                value: None,
                winning_priority: None,
                failure: Some("no contributions".to_string()),
                candidates: Vec::new(),
            },
        }
    }

    fn explain_scalar(key: &str, contributions: &[Contribution]) -> KeyExplanation {
        match resolve_scalar_key(contributions) {
            Ok(resolved) => KeyExplanation {
                key: key.to_string(),
                resolved: true,
                kind: Some(KeyKind::Scalar),
                value: Some(resolved.value.clone()),
                winning_priority: resolved.winning_priority,
                failure: None,
                candidates: scalar_candidates(contributions, resolved.winning_priority),
            },
            Err(err) => KeyExplanation {
                key: key.to_string(),
                resolved: false,
                kind: Some(KeyKind::Scalar),
                value: None,
                winning_priority: None,
                failure: Some(err.to_string()),
                candidates: scalar_candidates(contributions, None),
            },
        }
    }

    fn explain_list(key: &str, segments: &[ListContribution]) -> KeyExplanation {
        let elements: Vec<Value> = ordered(segments)
            .into_iter()
            .flat_map(|segment| segment.elements.iter().cloned())
            .collect();
        KeyExplanation {
            key: key.to_string(),
            resolved: true,
            kind: Some(KeyKind::List),
            value: Some(Value::Array(elements)),
            winning_priority: None,
            failure: None,
            candidates: list_candidates(segments, true),
        }
    }

    /// Generate human-readable explanation
    fn generate_explanation(resolved: bool, keys: &[KeyExplanation]) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Keys: {}", keys.len()));
        if resolved {
            lines.push("Decision: RESOLVED".to_string());
        } else {
            let failed = keys.iter().filter(|key| !key.resolved).count();
            lines.push(format!("Decision: FAILED ({} of {} keys)", failed, keys.len()));
        }
        lines.push(String::new());

        for key in keys {
            lines.push(Self::format_key(key));
        }

        lines.join("\n")
    }

    /// Format a single key for human reading
    fn format_key(key: &KeyExplanation) -> String {
        if let Some(ref failure) = key.failure {
            return format!("{}: FAILED: {}", key.key, failure);
        }

        let value = match key.value {
            Some(ref value) => value.to_string(),
            None => "?".to_string(),
        };
        match key.kind {
            Some(KeyKind::Scalar) => {
                let priority = key
                    .winning_priority
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "?".to_string());
                format!(
                    "{} = {} (scalar, won at override priority {})",
                    key.key, value, priority
                )
            }
            Some(KeyKind::List) => format!(
                "{} = {} (list, {} segments)",
                key.key,
                value,
                key.candidates.len()
            ),
            None => format!("{}: unresolved", key.key),
        }
    }

    /// Format as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Format as human-readable text
    pub fn to_human(&self) -> String {
        let mut output = self.explanation.clone();
        output.push_str("\n\n--- Candidates ---\n");

        for key in &self.keys {
            output.push_str(&format!("{}:\n", key.key));
            for candidate in &key.candidates {
                let marker = if candidate.selected { "*" } else { " " };
                let priority = match (candidate.priority, candidate.order) {
                    (Some(p), _) => format!("override {}", p),
                    (_, Some(o)) => format!("order {}", o),
                    _ => "unprioritized".to_string(),
                };
                output.push_str(&format!(
                    "  {} {} @ {}: {}\n",
                    marker,
                    candidate.identity(),
                    priority,
                    candidate.value
                ));
            }
        }

        output
    }
}

fn scalar_candidates(
    contributions: &[Contribution],
    winning: Option<OverridePriority>,
) -> Vec<CandidateOutput> {
    contributions
        .iter()
        .enumerate()
        .map(|(index, contribution)| CandidateOutput {
            index,
            origin: contribution.origin.clone(),
            priority: Some(contribution.priority),
            order: None,
            value: contribution.value.clone(),
            selected: winning == Some(contribution.priority),
        })
        .collect()
}

fn list_candidates(segments: &[ListContribution], selected: bool) -> Vec<CandidateOutput> {
    let indexed: Vec<(usize, &ListContribution)> = segments.iter().enumerate().collect();
    let mut by_order = indexed;
    by_order.sort_by_key(|(_, segment)| segment.order);
    by_order
        .into_iter()
        .map(|(index, segment)| CandidateOutput {
            index,
            origin: segment.origin.clone(),
            priority: None,
            order: Some(segment.order),
            value: Value::Array(segment.elements.clone()),
            selected,
        })
        .collect()
}
