//! Flat per-key contribution registry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::contribution::{Contribution, ListContribution};
use crate::error::MergeError;
use crate::resolution::Resolution;
use crate::resolve::{resolve_list_key, resolve_scalar_key};

/// Collects contributions per key and resolves them all at once.
///
/// Keys are opaque names merged independently of each other. Scalar and list
/// contributions are tracked separately; a key that receives both kinds fails
/// resolution with [`MergeError::KindMismatch`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeSet {
    pub(crate) scalars: BTreeMap<String, Vec<Contribution>>,
    pub(crate) lists: BTreeMap<String, Vec<ListContribution>>,
}

impl MergeSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scalar contribution for a key. Declaration order is preserved.
    pub fn contribute(&mut self, key: impl Into<String>, contribution: Contribution) {
        let key = key.into();
        trace!(%key, priority = %contribution.priority, "Adding scalar contribution");
        self.scalars.entry(key).or_default().push(contribution);
    }

    /// Add a list segment for a key. Declaration order is preserved.
    pub fn contribute_list(&mut self, key: impl Into<String>, segment: ListContribution) {
        let key = key.into();
        trace!(%key, order = %segment.order, "Adding list contribution");
        self.lists.entry(key).or_default().push(segment);
    }

    /// Number of distinct keys with contributions.
    pub fn len(&self) -> usize {
        self.scalars.len()
            + self
                .lists
                .keys()
                .filter(|key| !self.scalars.contains_key(*key))
                .count()
    }

    /// True when no key has contributions.
    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty() && self.lists.is_empty()
    }

    /// Keys with contributions, sorted, each listed once.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.scalars.keys().map(String::as_str).collect();
        keys.extend(
            self.lists
                .keys()
                .filter(|key| !self.scalars.contains_key(*key))
                .map(String::as_str),
        );
        keys.sort_unstable();
        keys
    }

    /// Resolve every key independently.
    ///
    /// The resolution is computed fresh on every call; contributions added
    /// afterwards are reflected by the next call, never by a resolution
    /// already returned. Fails fast on the first failing key in key order.
    pub fn resolve(&self) -> Result<Resolution, MergeError> {
        if let Some(key) = self.scalars.keys().find(|key| self.lists.contains_key(*key)) {
            return Err(MergeError::KindMismatch(key.clone()));
        }

        debug!(keys = self.len(), "Resolving merge set");

        let mut entries = BTreeMap::new();
        for (key, contributions) in &self.scalars {
            let resolved = resolve_scalar_key(contributions).map_err(|e| {
                debug!(%key, "Scalar key failed to resolve");
                e.with_key(key)
            })?;
            trace!(%key, contributions = contributions.len(), "Resolved scalar key");
            entries.insert(key.clone(), resolved);
        }
        for (key, segments) in &self.lists {
            let resolved = resolve_list_key(segments);
            trace!(%key, segments = segments.len(), "Resolved list key");
            entries.insert(key.clone(), resolved);
        }

        Ok(Resolution::new(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::priority::{OrderPriority, OverridePriority};
    use serde_json::json;

    fn sample_set() -> MergeSet {
        let mut set = MergeSet::new();
        set.contribute("users.shell", Contribution::new("fish").with_origin("host.nix"));
        set.contribute(
            "users.shell",
            Contribution::new("bash")
                .with_priority(OverridePriority::OPTION_DEFAULT)
                .with_origin("defaults.nix"),
        );
        set.contribute_list(
            "environment.packages",
            ListContribution::new(["vim"])
                .with_order(OrderPriority::AFTER)
                .with_origin("editors.nix"),
        );
        set.contribute_list(
            "environment.packages",
            ListContribution::new(["curl", "git"]).with_origin("base.nix"),
        );
        set
    }

    #[test]
    fn test_resolves_scalar_and_list_keys() {
        let resolution = sample_set().resolve().unwrap();
        assert_eq!(resolution.get_str("users.shell"), Some("fish"));
        assert_eq!(
            resolution.get("environment.packages"),
            Some(&json!(["curl", "git", "vim"]))
        );
    }

    #[test]
    fn test_keys_merge_independently() {
        let base = sample_set().resolve().unwrap();

        let mut extended = sample_set();
        extended.contribute("networking.hostname", Contribution::new("atlas"));
        let resolution = extended.resolve().unwrap();

        assert_eq!(resolution.get_str("networking.hostname"), Some("atlas"));
        assert_eq!(resolution.get("users.shell"), base.get("users.shell"));
        assert_eq!(
            resolution.get("environment.packages"),
            base.get("environment.packages")
        );
    }

    #[test]
    fn test_conflict_carries_key_name() {
        let mut set = sample_set();
        set.contribute(
            "users.shell",
            Contribution::new("zsh").with_origin("laptop.nix"),
        );
        let err = set.resolve().unwrap_err();
        match err {
            MergeError::Conflict(conflict) => {
                assert_eq!(conflict.key.as_deref(), Some("users.shell"));
                assert_eq!(conflict.count(), 2);
            }
            other => panic!("expected Conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_kind_mismatch_detected() {
        let mut set = sample_set();
        set.contribute("environment.packages", Contribution::new("oops"));
        let err = set.resolve().unwrap_err();
        assert_eq!(
            err,
            MergeError::KindMismatch("environment.packages".to_string())
        );
    }

    #[test]
    fn test_empty_contribution_vector_names_the_key() {
        // Only deserialization can produce a key with zero contributions.
        let set: MergeSet = serde_json::from_value(json!({
            "scalars": { "users.shell": [] },
            "lists": {}
        }))
        .unwrap();

        let err = set.resolve().unwrap_err();
        assert_eq!(err.code(), "EMPTY");
        assert!(err.to_string().contains("users.shell"));
    }

    #[test]
    fn test_resolution_recomputes_from_current_contributions() {
        let mut set = sample_set();
        let before = set.resolve().unwrap();
        assert_eq!(before.get_str("users.shell"), Some("fish"));

        set.contribute(
            "users.shell",
            Contribution::new("zsh").with_priority(OverridePriority::FORCE),
        );
        let after = set.resolve().unwrap();

        assert_eq!(after.get_str("users.shell"), Some("zsh"));
        // The earlier resolution is untouched.
        assert_eq!(before.get_str("users.shell"), Some("fish"));
    }

    #[test]
    fn test_len_and_keys() {
        let set = sample_set();
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        assert_eq!(set.keys(), vec!["environment.packages", "users.shell"]);
    }

    #[test]
    fn test_empty_set_resolves_to_empty_resolution() {
        let set = MergeSet::new();
        assert!(set.is_empty());
        let resolution = set.resolve().unwrap();
        assert!(resolution.is_empty());
    }

    #[test]
    fn test_set_serialization_round_trips() {
        let set = sample_set();
        let json = serde_json::to_string(&set).unwrap();
        let parsed: MergeSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, set);
    }
}
