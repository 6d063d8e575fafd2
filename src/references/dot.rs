// jdeps dot report parsing
//
// jdeps writes one edge per line:
//
//     digraph "main" {
//         "com.example.Service" -> "com.google.common.base.Preconditions (guava-28.0-jre.jar)";
//     }

use super::ReferenceSource;
use crate::error::{DepError, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

const SUMMARY_REPORT: &str = "summary.dot";
const API_SUBDIRECTORY: &str = "api";

fn decoration() -> &'static Regex {
    static DECORATION: OnceLock<Regex> = OnceLock::new();
    DECORATION.get_or_init(|| Regex::new(r" \([^)]*\)").expect("static regex"))
}

/// Strip the archive annotation and quoting jdeps adds to node names
pub fn clean_node_name(name: &str) -> String {
    decoration().replace_all(name, "").replace('"', "")
}

/// A parsed reference graph; nodes are class names, an edge `a -> b`
/// means `a` references `b`
#[derive(Debug, Default)]
pub struct DotGraph {
    graph: DiGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl DotGraph {
    pub fn parse_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DepError::io(path, e))?;
        Self::parse(&content, path)
    }

    /// Parse dot text; `path` is only used in error messages
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut graph = Self::default();

        for (i, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with("//") || line == "}" {
                continue;
            }
            if line.starts_with("digraph") {
                if !line.ends_with('{') {
                    return Err(DepError::malformed_graph(path, i + 1, "graph header must end with '{'"));
                }
                continue;
            }

            match line.split_once("->") {
                Some((from, to)) => {
                    let from = node_id(from).ok_or_else(|| {
                        DepError::malformed_graph(path, i + 1, format!("invalid edge source in '{}'", line))
                    })?;
                    let to = node_id(to).ok_or_else(|| {
                        DepError::malformed_graph(path, i + 1, format!("invalid edge target in '{}'", line))
                    })?;
                    graph.add_edge(from, to);
                }
                None if is_attribute(line) => {}
                None => {
                    return Err(DepError::malformed_graph(
                        path,
                        i + 1,
                        format!("expected an edge, found '{}'", line),
                    ))
                }
            }
        }

        Ok(graph)
    }

    fn add_edge(&mut self, from: String, to: String) {
        let from = self.node(from);
        let to = self.node(to);
        self.graph.add_edge(from, to, ());
    }

    fn node(&mut self, name: String) -> NodeIndex {
        if let Some(index) = self.nodes.get(&name) {
            return *index;
        }
        let index = self.graph.add_node(name.clone());
        self.nodes.insert(name, index);
        index
    }

    /// Target of every edge: the classes that something references
    pub fn referenced_classes(&self) -> BTreeSet<String> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(_, to)| self.graph[to].clone())
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Read a (possibly quoted, possibly decorated) node id from one side of an edge
fn node_id(raw: &str) -> Option<String> {
    let raw = raw.trim().trim_end_matches(';').trim();
    // Drop a trailing attribute list such as `[label="..."]`
    let raw = match raw.find('[') {
        Some(start) if raw.ends_with(']') => raw[..start].trim(),
        _ => raw,
    };
    let name = clean_node_name(raw);
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some(name.to_string())
}

fn is_attribute(line: &str) -> bool {
    let line = line.trim_end_matches(';');
    match line.split_once('=') {
        Some((key, _)) => {
            let key = key.trim();
            !key.is_empty() && key.chars().all(|c| c.is_alphanumeric() || c == '_')
        }
        None => false,
    }
}

/// The detailed report in a jdeps output directory: the first `.dot`
/// file by name that is not the summary
pub fn find_detailed_report(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut reports: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| p.extension().is_some_and(|e| e == "dot"))
        .filter(|p| p.file_name().is_some_and(|n| n != SUMMARY_REPORT))
        .collect();
    reports.sort();
    reports.into_iter().next()
}

/// References read from jdeps dot reports
#[derive(Debug, Clone, Default)]
pub struct DotReferences {
    used: BTreeSet<String>,
    api: BTreeSet<String>,
}

impl DotReferences {
    /// Read the detailed report in `dir` and the API report in `dir/api`.
    /// A missing report contributes no references.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let used = Self::read_report(find_detailed_report(dir), dir)?;
        let api_dir = dir.join(API_SUBDIRECTORY);
        let api = Self::read_report(find_detailed_report(&api_dir), &api_dir)?;
        Ok(Self { used, api })
    }

    fn read_report(report: Option<PathBuf>, dir: &Path) -> Result<BTreeSet<String>> {
        match report {
            Some(path) => {
                let graph = DotGraph::parse_file(&path)?;
                debug!(
                    "Read {} edges between {} classes from {}",
                    graph.edge_count(),
                    graph.node_count(),
                    path.display()
                );
                Ok(graph.referenced_classes())
            }
            None => {
                warn!("No dot report found in {}", dir.display());
                Ok(BTreeSet::new())
            }
        }
    }
}

impl ReferenceSource for DotReferences {
    fn used_classes(&self) -> &BTreeSet<String> {
        &self.used
    }

    fn api_classes(&self) -> &BTreeSet<String> {
        &self.api
    }
}
