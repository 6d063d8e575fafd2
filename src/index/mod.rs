// Class to artifact index

mod indexer;
mod scan;

pub use indexer::ArtifactIndexer;
pub use scan::{directory_classes, jar_classes};

use crate::model::{ArtifactId, ResolvedArtifact};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Which artifact provides each class, and which classes each artifact holds.
///
/// Owned by a single classification run. Populated once through
/// [`ArtifactIndexer`], read many times, then cleared.
#[derive(Debug, Default)]
pub struct ClassIndex {
    class_to_artifact: HashMap<String, ArtifactId>,
    artifact_to_classes: HashMap<ArtifactId, BTreeSet<String>>,
    artifact_to_dependency: HashMap<ArtifactId, String>,
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an artifact's classes. A class already owned by another artifact
    /// moves to this one, so the last artifact in classpath order wins.
    pub fn insert(&mut self, artifact: &ResolvedArtifact, classes: impl IntoIterator<Item = String>) {
        let id = &artifact.id;
        self.artifact_to_dependency
            .insert(id.clone(), artifact.dependency_name());

        let owned = self.artifact_to_classes.entry(id.clone()).or_default();
        for class in classes {
            if let Some(previous) = self.class_to_artifact.insert(class.clone(), id.clone()) {
                if &previous != id {
                    debug!("Class {} shadowed: {} replaces {}", class, id, previous);
                }
            }
            owned.insert(class);
        }
    }

    pub fn artifact_for(&self, class: &str) -> Option<&ArtifactId> {
        self.class_to_artifact.get(class)
    }

    pub fn classes_of(&self, artifact: &ArtifactId) -> Option<&BTreeSet<String>> {
        self.artifact_to_classes.get(artifact)
    }

    /// Declared dependency an artifact was resolved from
    pub fn dependency_of(&self, artifact: &ArtifactId) -> Option<&str> {
        self.artifact_to_dependency.get(artifact).map(String::as_str)
    }

    pub fn class_count(&self) -> usize {
        self.class_to_artifact.len()
    }

    pub fn artifact_count(&self) -> usize {
        self.artifact_to_classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifact_to_classes.is_empty()
    }

    /// Drop every entry and give the memory back
    pub fn clear(&mut self) {
        self.class_to_artifact = HashMap::new();
        self.artifact_to_classes = HashMap::new();
        self.artifact_to_dependency = HashMap::new();
    }
}
