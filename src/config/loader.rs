use crate::model::normalize_dependency;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Configuration for exactdeps analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configurations whose declarations are validated ("direct" scopes)
    pub configurations: Vec<String>,

    /// Configuration whose resolved artifacts make up the class index
    pub classpath_configuration: String,

    /// Configurations whose dependencies leave no bytecode trace and are
    /// never reported implicit or unused
    pub source_only_configurations: Vec<String>,

    /// Dependencies never reported implicit or unused
    pub ignore: Vec<String>,

    /// Dependencies never reported implicit
    pub ignore_implicit: Vec<String>,

    /// Dependencies never reported unused
    pub ignore_unused: Vec<String>,

    /// Report configuration
    pub report: ReportConfig,

    /// Index artifacts and parse class files on all cores
    pub parallel: bool,

    /// Artifact cache file, reused across runs when set
    pub cache: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Where the YAML report is written
    pub output: PathBuf,

    /// Console output format: terminal, json, yaml
    pub format: String,

    /// Print build-file suggestions for every finding
    pub suggestions: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            configurations: vec!["implementation".to_string()],
            classpath_configuration: "compileClasspath".to_string(),
            source_only_configurations: vec![
                "compileOnly".to_string(),
                "annotationProcessor".to_string(),
            ],
            ignore: vec![],
            ignore_implicit: vec!["org.slf4j:slf4j-api".to_string()],
            ignore_unused: vec!["javax.annotation:javax.annotation-api".to_string()],
            report: ReportConfig::default(),
            parallel: true,
            cache: None,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("build/reports/dependency-report.yaml"),
            format: "terminal".to_string(),
            suggestions: true,
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to parse YAML config: {}", path.display())),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to parse TOML config: {}", path.display())),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".exactdeps.yml",
            ".exactdeps.yaml",
            ".exactdeps.toml",
            "exactdeps.yml",
            "exactdeps.yaml",
            "exactdeps.toml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Dependencies exempt from the implicit list, as `group:name`
    pub fn implicit_exemptions(&self) -> BTreeSet<String> {
        normalize_all(self.ignore.iter().chain(&self.ignore_implicit))
    }

    /// Dependencies exempt from the unused list, as `group:name`
    pub fn unused_exemptions(&self) -> BTreeSet<String> {
        normalize_all(self.ignore.iter().chain(&self.ignore_unused))
    }
}

/// Ignore entries may carry versions; matching is on `group:name`
fn normalize_all<'a>(entries: impl Iterator<Item = &'a String>) -> BTreeSet<String> {
    entries.map(|entry| normalize_dependency(entry)).collect()
}
