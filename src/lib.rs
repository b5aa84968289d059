//! Priority-aware merging for module-contributed configuration values.
//!
//! Many modules contribute values for the same named keys without
//! coordinating with each other. This crate resolves those contributions
//! deterministically. A scalar key is won by the contribution with the
//! numerically lowest override priority; contributions tied at the winning
//! priority with differing values surface as a conflict instead of being
//! broken arbitrarily. A list key is merged additively: segments are sorted
//! by order priority (stable, so ties keep declaration order) and
//! concatenated.
//!
//! Well-known priorities are exposed as constants on [`OverridePriority`]
//! and [`OrderPriority`], and by preset name through [`classify`].

mod contribution;
mod error;
mod explain;
mod priority;
mod resolution;
mod resolve;
mod set;

pub use contribution::{Contribution, ListContribution};
pub use error::{Conflict, Contender, MergeError};
pub use explain::{CandidateOutput, ExplainOutput, KeyExplanation};
pub use priority::{classify, OrderPriority, OverridePriority, PresetPriority};
pub use resolution::{KeyKind, Resolution, ResolvedKey};
pub use resolve::{resolve_list, resolve_list_key, resolve_scalar, resolve_scalar_key};
pub use set::MergeSet;
