// Dependency model shared by the indexer, classifier and reports

mod artifact;
mod manifest;

pub use artifact::{is_project_dependency, normalize_dependency, suggestion, ArtifactId, ContainerKind, ResolvedArtifact};
pub use manifest::{Configuration, ResolutionManifest};
