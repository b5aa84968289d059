//! Priority newtypes and the named preset registry.
//!
//! Two independent priority spaces exist: override priorities decide which
//! scalar contribution wins, order priorities decide where a list segment
//! sorts. Both are plain integers where lower numbers come first.

use serde::{Deserialize, Serialize};

use crate::error::MergeError;

/// Override priority for scalar contributions. Lower wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverridePriority(pub u32);

impl OverridePriority {
    /// Virtualisation override, wins over everything below.
    pub const VM_OVERRIDE: Self = Self(10);

    /// Forced value.
    pub const FORCE: Self = Self(50);

    /// Image-media override.
    pub const IMAGE_MEDIA_OVERRIDE: Self = Self(60);

    /// Setting a value directly, with no priority tag.
    pub const DEFAULT: Self = Self(1000);

    /// Option-level default, loses to any direct setting.
    pub const OPTION_DEFAULT: Self = Self(1500);
}

impl Default for OverridePriority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u32> for OverridePriority {
    fn from(priority: u32) -> Self {
        Self(priority)
    }
}

impl std::fmt::Display for OverridePriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order priority for list contributions. Lower sorts earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderPriority(pub u32);

impl OrderPriority {
    /// Untagged list segment.
    pub const DEFAULT: Self = Self(100);

    /// Segment sorted toward the front.
    pub const BEFORE: Self = Self(500);

    /// Segment sorted toward the back.
    pub const AFTER: Self = Self(1500);
}

impl Default for OrderPriority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u32> for OrderPriority {
    fn from(priority: u32) -> Self {
        Self(priority)
    }
}

impl std::fmt::Display for OrderPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named override presets recognized by [`classify`].
const OVERRIDE_PRESETS: &[(&str, OverridePriority)] = &[
    ("default", OverridePriority::DEFAULT),
    ("force", OverridePriority::FORCE),
    ("image-media-override", OverridePriority::IMAGE_MEDIA_OVERRIDE),
    ("option-default", OverridePriority::OPTION_DEFAULT),
    ("vm-override", OverridePriority::VM_OVERRIDE),
];

/// Named order presets recognized by [`classify`].
const ORDER_PRESETS: &[(&str, OrderPriority)] = &[
    ("after", OrderPriority::AFTER),
    ("before", OrderPriority::BEFORE),
];

/// A preset resolved by name: either an override priority or an order priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "priority", rename_all = "lowercase")]
pub enum PresetPriority {
    /// The name belongs to the override-priority table.
    Override(OverridePriority),

    /// The name belongs to the order-priority table.
    Order(OrderPriority),
}

/// Look up a named priority preset.
///
/// Names are kebab-case: `vm-override`, `force`, `image-media-override`,
/// `default`, `option-default`, `before`, `after`. Unrecognized names fail
/// with [`MergeError::UnknownPreset`].
pub fn classify(name: &str) -> Result<PresetPriority, MergeError> {
    if let Some((_, priority)) = OVERRIDE_PRESETS.iter().find(|(n, _)| *n == name) {
        return Ok(PresetPriority::Override(*priority));
    }
    if let Some((_, priority)) = ORDER_PRESETS.iter().find(|(n, _)| *n == name) {
        return Ok(PresetPriority::Order(*priority));
    }
    Err(MergeError::UnknownPreset(name.to_string()))
}
