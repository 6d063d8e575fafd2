use crate::analysis::DependencySets;
use crate::error::{DepError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The persisted dependency report: four sorted lists of dependency identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportContent {
    #[serde(alias = "requiredDeps")]
    pub all_dependencies: Vec<String>,
    pub api_dependencies: Vec<String>,
    pub implicit_dependencies: Vec<String>,
    pub unused_dependencies: Vec<String>,
}

impl ReportContent {
    pub fn new(
        all_dependencies: Vec<String>,
        api_dependencies: Vec<String>,
        implicit_dependencies: Vec<String>,
        unused_dependencies: Vec<String>,
    ) -> Self {
        let mut content = Self {
            all_dependencies,
            api_dependencies,
            implicit_dependencies,
            unused_dependencies,
        };
        content.normalize();
        content
    }

    pub fn has_findings(&self) -> bool {
        !self.implicit_dependencies.is_empty() || !self.unused_dependencies.is_empty()
    }

    /// Write the report as YAML, creating missing parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        let write_error = |source| DepError::ReportWrite {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_error)?;
            }
        }
        let yaml = self.to_yaml().map_err(|e| {
            write_error(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
        })?;
        std::fs::write(path, yaml).map_err(write_error)
    }

    /// Read a report written by [`ReportContent::save`]. Lists are re-sorted.
    pub fn load(path: &Path) -> Result<Self> {
        let read_error = |reason: String| DepError::ReportRead {
            path: path.to_path_buf(),
            reason,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| read_error(e.to_string()))?;
        let mut content: Self = serde_yaml::from_str(&contents).map_err(|e| read_error(e.to_string()))?;
        content.normalize();
        Ok(content)
    }

    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    fn normalize(&mut self) {
        for list in [
            &mut self.all_dependencies,
            &mut self.api_dependencies,
            &mut self.implicit_dependencies,
            &mut self.unused_dependencies,
        ] {
            list.sort();
            list.dedup();
        }
    }
}

impl From<&DependencySets> for ReportContent {
    fn from(sets: &DependencySets) -> Self {
        // BTreeSet iteration is already sorted
        Self {
            all_dependencies: sets.required.iter().cloned().collect(),
            api_dependencies: sets.api_required.iter().cloned().collect(),
            implicit_dependencies: sets.implicit.iter().cloned().collect(),
            unused_dependencies: sets.unused.iter().cloned().collect(),
        }
    }
}
