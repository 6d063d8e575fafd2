use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Identity of a resolved binary unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ArtifactId {
    /// External module, `group:name[:version]`
    Module {
        group: String,
        name: String,
        version: Option<String>,
    },
    /// Project in the current build
    Project { name: String },
}

impl ArtifactId {
    pub fn module(group: impl Into<String>, name: impl Into<String>, version: Option<&str>) -> Self {
        ArtifactId::Module {
            group: group.into(),
            name: name.into(),
            version: version.map(str::to_string),
        }
    }

    pub fn project(name: impl Into<String>) -> Self {
        let name = name.into();
        ArtifactId::Project {
            name: name.trim_start_matches(':').to_string(),
        }
    }

    /// Identifier used in reports and build files: `group:name` or `project :name`.
    /// Versions are dropped so that upgrades do not change the report.
    pub fn dependency_name(&self) -> String {
        match self {
            ArtifactId::Module { group, name, .. } => format!("{}:{}", group, name),
            ArtifactId::Project { name } => format!("project :{}", name),
        }
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactId::Module {
                group,
                name,
                version: Some(version),
            } => write!(f, "{}:{}:{}", group, name, version),
            ArtifactId::Module { group, name, .. } => write!(f, "{}:{}", group, name),
            ArtifactId::Project { name } => write!(f, "project :{}", name),
        }
    }
}

impl FromStr for ArtifactId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty artifact identifier".to_string());
        }

        if let Some(rest) = s.strip_prefix("project(") {
            let name = rest
                .trim_end_matches(')')
                .trim_matches(|c| c == '\'' || c == '"');
            return Ok(ArtifactId::project(name));
        }
        if let Some(rest) = s.strip_prefix("project ") {
            return Ok(ArtifactId::project(rest.trim()));
        }
        if !s.contains(':') {
            return Ok(ArtifactId::project(s));
        }
        if let Some(path) = s.strip_prefix(':') {
            return Ok(ArtifactId::project(path));
        }

        let parts: Vec<&str> = s.split(':').collect();
        let (group, name) = (parts[0].trim(), parts[1].trim());
        if group.is_empty() || name.is_empty() {
            return Err(format!("invalid artifact identifier '{}'", s));
        }
        let version = parts.get(2).map(|v| v.trim()).filter(|v| !v.is_empty());

        Ok(ArtifactId::module(group, name, version))
    }
}

impl TryFrom<String> for ArtifactId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArtifactId> for String {
    fn from(id: ArtifactId) -> Self {
        id.to_string()
    }
}

/// Whether a dependency identifier string names a project of this build.
///
/// Accepts every spelling used by reports and build files: `project :x`,
/// `project(':x')` and a bare name without a group.
pub fn is_project_dependency(dependency: &str) -> bool {
    dependency.starts_with("project :") || dependency.starts_with("project(") || !dependency.contains(':')
}

/// Report spelling of a dependency identifier: versions dropped, project
/// spellings unified to `project :name`
pub fn normalize_dependency(dependency: &str) -> String {
    dependency
        .parse::<ArtifactId>()
        .map(|id| id.dependency_name())
        .unwrap_or_else(|_| dependency.trim().to_string())
}

/// Build-file line that would declare the given dependency.
pub fn suggestion(dependency: &str) -> String {
    let declaration = if is_project_dependency(dependency) {
        let name = dependency
            .trim_start_matches("project")
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')')
            .trim_matches(|c| c == '\'' || c == '"')
            .trim_start_matches(':');
        format!("project(':{}')", name)
    } else {
        dependency.to_string()
    };
    format!("implementation {}", declaration)
}

/// Kind of binary container an artifact lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Jar,
    Directory,
}

impl ContainerKind {
    /// Jars and extension-less paths (unpacked class directories) are analyzable;
    /// anything else (aar, pom, zip distributions) is not.
    pub fn from_path(path: &Path) -> Option<Self> {
        if path.is_dir() {
            return Some(ContainerKind::Directory);
        }
        match path.extension().and_then(OsStr::to_str) {
            Some(ext) if ext.eq_ignore_ascii_case("jar") => Some(ContainerKind::Jar),
            None => Some(ContainerKind::Directory),
            Some(_) => None,
        }
    }
}

/// An artifact resolved by the build, with the file that backs it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedArtifact {
    pub id: ArtifactId,

    /// Jar or classes directory
    pub file: PathBuf,

    /// Declared dependency this artifact was resolved from, if it differs from the artifact itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency: Option<String>,
}

impl ResolvedArtifact {
    pub fn new(id: ArtifactId, file: impl Into<PathBuf>) -> Self {
        Self {
            id,
            file: file.into(),
            dependency: None,
        }
    }

    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependency = Some(dependency.into());
        self
    }

    pub fn dependency_name(&self) -> String {
        match &self.dependency {
            Some(dependency) => normalize_dependency(dependency),
            None => self.id.dependency_name(),
        }
    }

    pub fn container(&self) -> Option<ContainerKind> {
        ContainerKind::from_path(&self.file)
    }
}
