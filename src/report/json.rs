use super::ReportContent;
use crate::model::suggestion;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

/// JSON reporter for programmatic output on stdout
#[derive(Debug, Default)]
pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report(&self, content: &ReportContent) -> Result<()> {
        let report = JsonReport::from_content(content);
        let json = serde_json::to_string_pretty(&report).into_diagnostic()?;
        println!("{}", json);
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    #[serde(flatten)]
    content: &'a ReportContent,
    suggestions: Vec<String>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonSummary {
    required: usize,
    api: usize,
    implicit: usize,
    unused: usize,
}

impl<'a> JsonReport<'a> {
    fn from_content(content: &'a ReportContent) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            content,
            suggestions: content
                .implicit_dependencies
                .iter()
                .map(|d| suggestion(d))
                .collect(),
            summary: JsonSummary {
                required: content.all_dependencies.len(),
                api: content.api_dependencies.len(),
                implicit: content.implicit_dependencies.len(),
                unused: content.unused_dependencies.len(),
            },
        }
    }
}
