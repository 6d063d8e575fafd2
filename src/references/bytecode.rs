use super::ReferenceSource;
use crate::bytecode::{class_name_from_entry, ClassFile};
use crate::error::{DepError, Result};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// References found by reading the class files of a compiled output
#[derive(Debug, Clone, Default)]
pub struct BytecodeReferences {
    used: BTreeSet<String>,
    api: BTreeSet<String>,
    defined: BTreeSet<String>,
}

/// One class file waiting to be parsed, with the path used in errors
struct ClassBytes {
    path: PathBuf,
    bytes: Vec<u8>,
}

struct ParsedClass {
    name: String,
    used: BTreeSet<String>,
    api: BTreeSet<String>,
}

impl BytecodeReferences {
    /// Analyze a classes directory, a single `.class` file or a jar.
    ///
    /// Classes defined by the output itself are not references. A missing
    /// output (a project without sources) has no references.
    pub fn analyze(path: &Path, parallel: bool) -> Result<Self> {
        let classes = read_classes(path)?;
        if classes.is_empty() {
            warn!("No class files found at {}", path.display());
            return Ok(Self::default());
        }
        info!("Analyzing {} class files in {}", classes.len(), path.display());

        let parse = |class: &ClassBytes| -> Result<ParsedClass> {
            let parsed = ClassFile::parse(&class.bytes).map_err(|source| DepError::ClassFile {
                path: class.path.clone(),
                source,
            })?;
            Ok(ParsedClass {
                used: parsed.referenced_classes(),
                api: parsed.api_classes(),
                name: parsed.name,
            })
        };

        let results: Vec<Result<ParsedClass>> = if parallel {
            classes.par_iter().map(parse).collect()
        } else {
            classes.iter().map(parse).collect()
        };

        let mut references = Self::default();
        for result in results {
            let parsed = result?;
            references.used.extend(parsed.used);
            references.api.extend(parsed.api);
            references.defined.insert(parsed.name);
        }

        let defined = &references.defined;
        references.used.retain(|c| !defined.contains(c));
        references.api.retain(|c| !defined.contains(c));

        debug!(
            "{} classes reference {} external classes ({} in API)",
            references.defined.len(),
            references.used.len(),
            references.api.len()
        );
        Ok(references)
    }

    /// Classes defined by the analyzed output
    pub fn defined_classes(&self) -> &BTreeSet<String> {
        &self.defined
    }
}

impl ReferenceSource for BytecodeReferences {
    fn used_classes(&self) -> &BTreeSet<String> {
        &self.used
    }

    fn api_classes(&self) -> &BTreeSet<String> {
        &self.api
    }
}

/// Classes referenced anywhere by the compiled unit at `path`
pub fn extract(path: &Path) -> Result<BTreeSet<String>> {
    Ok(BytecodeReferences::analyze(path, true)?.used)
}

/// Classes referenced by the public API surface of the compiled unit at `path`
pub fn extract_api(path: &Path) -> Result<BTreeSet<String>> {
    Ok(BytecodeReferences::analyze(path, true)?.api)
}

fn read_classes(path: &Path) -> Result<Vec<ClassBytes>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    if path.is_dir() {
        let mut classes = Vec::new();
        for entry in WalkDir::new(path).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let at = e.path().unwrap_or(path).to_path_buf();
                DepError::io(at, e.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(path).unwrap_or(entry.path());
            if class_name_from_entry(&relative.to_string_lossy()).is_none() {
                continue;
            }
            let bytes = std::fs::read(entry.path()).map_err(|e| DepError::io(entry.path(), e))?;
            classes.push(ClassBytes {
                path: entry.path().to_path_buf(),
                bytes,
            });
        }
        return Ok(classes);
    }

    let is_jar = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jar"));
    if is_jar {
        return read_jar_classes(path);
    }

    let bytes = std::fs::read(path).map_err(|e| DepError::io(path, e))?;
    Ok(vec![ClassBytes {
        path: path.to_path_buf(),
        bytes,
    }])
}

fn read_jar_classes(path: &Path) -> Result<Vec<ClassBytes>> {
    let jar_error = |e: zip::result::ZipError| DepError::io(path, e.into());

    let file = File::open(path).map_err(|e| DepError::io(path, e))?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file)).map_err(jar_error)?;

    let mut classes = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(jar_error)?;
        if !entry.is_file() || class_name_from_entry(entry.name()).is_none() {
            continue;
        }
        let entry_path = path.join(entry.name());
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| DepError::io(&entry_path, e))?;
        classes.push(ClassBytes {
            path: entry_path,
            bytes,
        });
    }
    Ok(classes)
}
