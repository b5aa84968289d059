//! Contribution records: values and list segments offered toward a key.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::priority::{OrderPriority, OverridePriority};

/// One value offered toward a configuration key.
///
/// Contributions are immutable once created; resolution reads them and
/// allocates fresh output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// The contributed value (scalar or whole mapping).
    pub value: Value,

    /// Override priority; lower wins. Absent means direct assignment (1000).
    #[serde(default)]
    pub priority: OverridePriority,

    /// Label for the contributing module or layer. Provenance only; never
    /// affects the resolved outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl Contribution {
    /// Contribution at direct-assignment priority.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            priority: OverridePriority::DEFAULT,
            origin: None,
        }
    }

    /// Set the override priority.
    pub fn with_priority(mut self, priority: OverridePriority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the origin label.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

/// One ordered segment offered toward a list-valued configuration key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListContribution {
    /// The segment's elements, in declaration order.
    pub elements: Vec<Value>,

    /// Order priority; lower sorts earlier. Absent means untagged (100).
    #[serde(default)]
    pub order: OrderPriority,

    /// Label for the contributing module or layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl ListContribution {
    /// Untagged segment.
    pub fn new<I, V>(elements: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            elements: elements.into_iter().map(Into::into).collect(),
            order: OrderPriority::DEFAULT,
            origin: None,
        }
    }

    /// Set the order priority.
    pub fn with_order(mut self, order: OrderPriority) -> Self {
        self.order = order;
        self
    }

    /// Set the origin label.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_contribution_defaults_to_direct_assignment() {
        let contribution = Contribution::new(true);
        assert_eq!(contribution.priority, OverridePriority::DEFAULT);
        assert_eq!(contribution.value, json!(true));
        assert!(contribution.origin.is_none());
    }

    #[test]
    fn test_contribution_builders() {
        let contribution = Contribution::new("fish")
            .with_priority(OverridePriority::FORCE)
            .with_origin("flavors/interactive.nix");
        assert_eq!(contribution.priority, OverridePriority::FORCE);
        assert_eq!(contribution.origin.as_deref(), Some("flavors/interactive.nix"));
    }

    #[test]
    fn test_contribution_missing_priority_deserializes_to_default() {
        let contribution: Contribution = serde_json::from_value(json!({
            "value": 42
        }))
        .unwrap();
        assert_eq!(contribution.priority, OverridePriority::DEFAULT);
    }

    #[test]
    fn test_list_contribution_defaults_to_untagged() {
        let segment = ListContribution::new(["git", "vim"]);
        assert_eq!(segment.order, OrderPriority::DEFAULT);
        assert_eq!(segment.elements, vec![json!("git"), json!("vim")]);
    }

    #[test]
    fn test_list_contribution_builders() {
        let segment = ListContribution::new(["curl"])
            .with_order(OrderPriority::BEFORE)
            .with_origin("base.nix");
        assert_eq!(segment.order, OrderPriority::BEFORE);
        assert_eq!(segment.origin.as_deref(), Some("base.nix"));
    }

    #[test]
    fn test_list_contribution_missing_order_deserializes_to_default() {
        let segment: ListContribution = serde_json::from_value(json!({
            "elements": ["curl"]
        }))
        .unwrap();
        assert_eq!(segment.order, OrderPriority::DEFAULT);
    }

    #[test]
    fn test_contribution_serialization_skips_absent_origin() {
        let json = serde_json::to_string(&Contribution::new(1)).unwrap();
        assert!(!json.contains("origin"));
    }
}
