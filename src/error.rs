//! Typed errors for dependency analysis.
//!
//! Every variant carries the artifact, class or file that caused it so the
//! CLI can print something actionable without a backtrace.

use crate::bytecode::ClassParseError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = DepError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum DepError {
    /// A resolved artifact could not be opened or read as a class container.
    #[error("Unable to analyze artifact {artifact} ({path}): {reason}")]
    UnresolvableArtifact {
        artifact: String,
        path: PathBuf,
        reason: String,
    },

    /// A dot reference graph could not be parsed.
    #[error("Malformed reference graph {path} at line {line}: {reason}")]
    MalformedReferenceGraph {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// A compiled class of the analyzed output is not a valid class file.
    #[error("Unable to analyze class file {path}: {source}")]
    ClassFile {
        path: PathBuf,
        #[source]
        source: ClassParseError,
    },

    #[error("Failed to write dependency report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read dependency report {path}: {reason}")]
    ReportRead { path: PathBuf, reason: String },

    #[error("Invalid resolution manifest {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    #[error("Unknown configuration '{name}'")]
    UnknownConfiguration { name: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DepError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed_graph(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedReferenceGraph {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}
