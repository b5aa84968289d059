//! The merge kernel.
//!
//! Scalar keys resolve by override priority: the numerically lowest priority
//! wins, and a tie with differing values is a conflict. List keys resolve by
//! concatenation: every segment appears, stable-sorted by order priority.
//! Both operations are pure functions over their input slice.

use serde_json::Value;

use crate::contribution::{Contribution, ListContribution};
use crate::error::{Conflict, Contender, MergeError};
use crate::priority::OverridePriority;
use crate::resolution::{KeyKind, ResolvedKey};

/// Resolve a scalar key to its winning value.
///
/// The contribution with the lowest override priority wins. Several
/// contributions may share the lowest priority as long as their values are
/// equal; differing values at the winning priority fail with
/// [`MergeError::Conflict`]. An empty slice fails with [`MergeError::Empty`].
pub fn resolve_scalar(contributions: &[Contribution]) -> Result<Value, MergeError> {
    resolve_scalar_key(contributions).map(|resolved| resolved.value)
}

/// Resolve a scalar key, keeping the provenance of the decision.
///
/// When several equal-valued contributions tie at the winning priority, the
/// earliest of them is reported as the winner.
pub fn resolve_scalar_key(contributions: &[Contribution]) -> Result<ResolvedKey, MergeError> {
    let lowest = match contributions.iter().map(|c| c.priority).min() {
        Some(priority) => priority,
        None => return Err(MergeError::Empty { key: None }),
    };

    let winners: Vec<(usize, &Contribution)> = contributions
        .iter()
        .enumerate()
        .filter(|(_, c)| c.priority == lowest)
        .collect();

    match winners.as_slice() {
        [] => Err(MergeError::Empty { key: None }),
        [(_, winner)] => Ok(scalar_outcome(winner, lowest, contributions.len())),
        [(_, first), rest @ ..] => {
            if rest.iter().all(|(_, c)| c.value == first.value) {
                Ok(scalar_outcome(first, lowest, contributions.len()))
            } else {
                Err(MergeError::Conflict(Conflict {
                    key: None,
                    priority: lowest,
                    contenders: winners
                        .iter()
                        .map(|(index, c)| Contender {
                            index: *index,
                            origin: c.origin.clone(),
                            value: c.value.clone(),
                        })
                        .collect(),
                }))
            }
        }
    }
}

/// Resolve a list key to its flattened element sequence.
///
/// Segments are stable-sorted by order priority ascending, so segments sharing
/// an order priority keep declaration order; then their elements concatenate
/// in that sorted order. List merging is additive: every segment appears
/// regardless of any override tagging elsewhere. An empty slice concatenates
/// to an empty sequence.
pub fn resolve_list(contributions: &[ListContribution]) -> Vec<Value> {
    ordered(contributions)
        .into_iter()
        .flat_map(|segment| segment.elements.iter().cloned())
        .collect()
}

/// Resolve a list key, keeping the concatenation-order provenance.
pub fn resolve_list_key(contributions: &[ListContribution]) -> ResolvedKey {
    let segments = ordered(contributions);
    let merged_from = segments
        .iter()
        .filter_map(|segment| segment.origin.clone())
        .collect();
    let elements: Vec<Value> = segments
        .into_iter()
        .flat_map(|segment| segment.elements.iter().cloned())
        .collect();

    ResolvedKey {
        value: Value::Array(elements),
        kind: KeyKind::List,
        contributions: contributions.len(),
        winning_priority: None,
        origin: None,
        merged_from,
    }
}

fn scalar_outcome(
    winner: &Contribution,
    priority: OverridePriority,
    considered: usize,
) -> ResolvedKey {
    ResolvedKey {
        value: winner.value.clone(),
        kind: KeyKind::Scalar,
        contributions: considered,
        winning_priority: Some(priority),
        origin: winner.origin.clone(),
        merged_from: Vec::new(),
    }
}

// sort_by_key is stable: ties keep input order.
pub(crate) fn ordered(contributions: &[ListContribution]) -> Vec<&ListContribution> {
    let mut segments: Vec<&ListContribution> = contributions.iter().collect();
    segments.sort_by_key(|segment| segment.order);
    segments
}
