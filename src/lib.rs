//! exactdeps - Exact dependency analysis for JVM projects
//!
//! This library finds the library dependencies a project's compiled code
//! actually uses, and compares them with what the build declares.
//!
//! # Architecture
//!
//! The analysis pipeline consists of:
//! 1. **Manifest** - Read configurations and resolved artifacts written by the build
//! 2. **Indexing** - List the classes in every classpath jar and classes directory
//! 3. **Reference Extraction** - Read class files (or jdeps dot reports) for referenced classes
//! 4. **Classification** - Map references to artifacts and compare with declarations
//! 5. **Reporting** - Write the YAML report and print findings

pub mod analysis;
pub mod bytecode;
pub mod cache;
pub mod config;
pub mod error;
pub mod index;
pub mod model;
pub mod references;
pub mod report;

pub use analysis::{DependencyClassifier, DependencySets};
pub use cache::ArtifactCache;
pub use config::Config;
pub use error::{DepError, Result};
pub use index::{ArtifactIndexer, ClassIndex};
pub use model::{ArtifactId, Configuration, ResolutionManifest, ResolvedArtifact};
pub use references::{BytecodeReferences, ClassReferences, DotReferences, ReferenceSource};
pub use report::{ReportContent, ReportFormat, Reporter};
