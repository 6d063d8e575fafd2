use super::ReportContent;
use crate::model::suggestion;
use colored::Colorize;
use miette::Result;

/// Terminal reporter with colored output
pub struct TerminalReporter {
    /// Print build-file suggestions under each finding
    show_suggestions: bool,
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            show_suggestions: true,
        }
    }

    pub fn with_suggestions(mut self, show: bool) -> Self {
        self.show_suggestions = show;
        self
    }

    pub fn report(&self, content: &ReportContent) -> Result<()> {
        println!();
        self.print_section("Required dependencies", &content.all_dependencies);
        self.print_section("API dependencies", &content.api_dependencies);

        if !content.has_findings() {
            println!("{}", "All dependencies are declared and used!".green().bold());
            println!();
            self.print_summary(content);
            return Ok(());
        }

        if !content.implicit_dependencies.is_empty() {
            println!(
                "{}",
                format!(
                    "Found {} implicit dependencies (used but not declared):",
                    content.implicit_dependencies.len()
                )
                .yellow()
                .bold()
            );
            for dependency in &content.implicit_dependencies {
                println!("  {} {}", "+".yellow().bold(), dependency);
                if self.show_suggestions {
                    println!("      {}", suggestion(dependency).dimmed());
                }
            }
            println!();
        }

        if !content.unused_dependencies.is_empty() {
            println!(
                "{}",
                format!(
                    "Found {} unused dependencies (declared but not used):",
                    content.unused_dependencies.len()
                )
                .red()
                .bold()
            );
            for dependency in &content.unused_dependencies {
                println!("  {} {}", "-".red().bold(), dependency);
                if self.show_suggestions {
                    println!("      {}", format!("remove: {}", suggestion(dependency)).dimmed());
                }
            }
            println!();
        }

        self.print_summary(content);
        Ok(())
    }

    fn print_section(&self, title: &str, dependencies: &[String]) {
        if dependencies.is_empty() {
            return;
        }
        println!("{}", format!("{} ({}):", title, dependencies.len()).cyan().bold());
        for dependency in dependencies {
            println!("  {}", dependency);
        }
        println!();
    }

    fn print_summary(&self, content: &ReportContent) {
        println!("{}", "Summary:".bold());
        println!(
            "  {} required, {} api, {} implicit, {} unused",
            content.all_dependencies.len().to_string().cyan(),
            content.api_dependencies.len().to_string().cyan(),
            content.implicit_dependencies.len().to_string().yellow(),
            content.unused_dependencies.len().to_string().red()
        );
    }
}
