// Dependency classification

mod classifier;

pub use classifier::DependencyClassifier;

use std::collections::BTreeSet;

/// Outcome of classifying a project's dependencies.
///
/// All four sets hold dependency identifiers (`group:name` or
/// `project :name`) and iterate in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySets {
    /// Every dependency some compiled class references
    pub required: BTreeSet<String>,

    /// Dependencies referenced from the public API surface; a subset of `required`
    pub api_required: BTreeSet<String>,

    /// Referenced but not declared
    pub implicit: BTreeSet<String>,

    /// Declared directly but never referenced
    pub unused: BTreeSet<String>,
}

impl DependencySets {
    /// Whether the build file needs changing
    pub fn has_findings(&self) -> bool {
        !self.implicit.is_empty() || !self.unused.is_empty()
    }
}
