use super::{normalize_dependency, ArtifactId, ResolvedArtifact};
use crate::error::{DepError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// A dependency scope as resolved by the build
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Configuration {
    pub name: String,

    /// Parent configurations whose declarations this one inherits
    pub extends_from: Vec<String>,

    /// Dependencies declared directly on this configuration
    pub dependencies: Vec<String>,

    /// Full transitive set of resolved artifacts
    pub artifacts: Vec<ResolvedArtifact>,
}

impl Configuration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn extends_from(mut self, parent: impl Into<String>) -> Self {
        self.extends_from.push(parent.into());
        self
    }

    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    pub fn with_artifact(mut self, artifact: ResolvedArtifact) -> Self {
        self.artifacts.push(artifact);
        self
    }
}

/// Everything the build tool knows about a project's dependencies.
///
/// This is the hand-off point from the build: it lists each configuration
/// with its direct declarations, its parents, and the artifacts it resolves to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionManifest {
    /// Name of the project whose classes are analyzed
    pub project: String,

    pub configurations: Vec<Configuration>,
}

impl ResolutionManifest {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            configurations: Vec::new(),
        }
    }

    pub fn with_configuration(mut self, configuration: Configuration) -> Self {
        self.configurations.push(configuration);
        self
    }

    /// Load a manifest from YAML, JSON or TOML
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| DepError::Manifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let parsed: std::result::Result<Self, String> = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents).map_err(|e| e.to_string()),
            "json" => serde_json::from_str(&contents).map_err(|e| e.to_string()),
            "toml" => toml::from_str(&contents).map_err(|e| e.to_string()),
            _ => serde_yaml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .map_err(|e| e.to_string()),
        };

        parsed.map_err(|reason| DepError::Manifest {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn configuration(&self, name: &str) -> Result<&Configuration> {
        self.configurations
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| DepError::UnknownConfiguration {
                name: name.to_string(),
            })
    }

    /// Dependencies declared on the given configurations or any configuration they extend
    pub fn declared_dependencies(&self, names: &[String]) -> Result<BTreeSet<String>> {
        let mut declared = BTreeSet::new();
        let mut visited = HashSet::new();
        let mut stack: Vec<&str> = names.iter().map(String::as_str).collect();

        while let Some(name) = stack.pop() {
            if !visited.insert(name) {
                continue;
            }
            let configuration = self.configuration(name)?;
            declared.extend(configuration.dependencies.iter().map(|d| normalize_dependency(d)));
            stack.extend(configuration.extends_from.iter().map(String::as_str));
        }

        Ok(declared)
    }

    /// Dependencies listed directly on the given configurations, ignoring parents
    pub fn direct_dependencies(&self, names: &[String]) -> Result<BTreeSet<String>> {
        let mut direct = BTreeSet::new();
        for name in names {
            let configuration = self.configuration(name)?;
            direct.extend(configuration.dependencies.iter().map(|d| normalize_dependency(d)));
        }
        Ok(direct)
    }

    /// Whether an artifact is the analyzed project's own output
    pub fn is_self(&self, id: &ArtifactId) -> bool {
        match id {
            ArtifactId::Project { name } => {
                !self.project.is_empty() && name == self.project.trim_start_matches(':')
            }
            ArtifactId::Module { .. } => false,
        }
    }
}
