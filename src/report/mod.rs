mod content;
mod json;
mod terminal;

pub use content::ReportContent;
pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::model::suggestion;
use miette::{IntoDiagnostic, Result};

/// Output format for reports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
    Yaml,
}

impl ReportFormat {
    /// Parse a format name as used in config files
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "terminal" => Some(ReportFormat::Terminal),
            "json" => Some(ReportFormat::Json),
            "yaml" | "yml" => Some(ReportFormat::Yaml),
            _ => None,
        }
    }
}

/// Reporter for printing dependency analysis results
pub struct Reporter {
    format: ReportFormat,
    suggestions: bool,
}

impl Reporter {
    pub fn new(format: ReportFormat) -> Self {
        Self {
            format,
            suggestions: true,
        }
    }

    pub fn with_suggestions(mut self, show: bool) -> Self {
        self.suggestions = show;
        self
    }

    pub fn report(&self, content: &ReportContent) -> Result<()> {
        match &self.format {
            ReportFormat::Terminal => {
                let reporter = TerminalReporter::new().with_suggestions(self.suggestions);
                reporter.report(content)
            }
            ReportFormat::Json => {
                let reporter = JsonReporter::new();
                reporter.report(content)
            }
            ReportFormat::Yaml => {
                let yaml = content.to_yaml().into_diagnostic()?;
                print!("{}", yaml);
                Ok(())
            }
        }
    }
}

/// One line per finding explaining how to fix the build file; empty when
/// the declarations match what the code uses
pub fn check_failures(content: &ReportContent) -> Vec<String> {
    let mut failures = Vec::new();
    for dependency in &content.implicit_dependencies {
        failures.push(format!(
            "Implicit dependency {}: add '{}'",
            dependency,
            suggestion(dependency)
        ));
    }
    for dependency in &content.unused_dependencies {
        failures.push(format!(
            "Unused dependency {}: remove '{}'",
            dependency,
            suggestion(dependency)
        ));
    }
    failures
}
