// Listing the classes contained in a jar or a classes directory

use crate::bytecode::class_name_from_entry;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use walkdir::WalkDir;

/// Names of all classes stored in a jar, in entry order
pub fn jar_classes(path: &Path) -> Result<Vec<String>, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let archive = zip::ZipArchive::new(BufReader::new(file)).map_err(|e| e.to_string())?;

    Ok(archive.file_names().filter_map(class_name_from_entry).collect())
}

/// Names of all classes below a classes directory, derived from relative paths
pub fn directory_classes(root: &Path) -> Result<Vec<String>, String> {
    if !root.is_dir() {
        return Err("not a directory".to_string());
    }

    let mut classes = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| e.to_string())?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if let Some(class) = class_name_from_entry(&relative.to_string_lossy()) {
            classes.push(class);
        }
    }
    Ok(classes)
}
