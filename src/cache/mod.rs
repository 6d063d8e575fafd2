//! Persistent artifact cache for exactdeps
//!
//! Listing the classes of a large jar is the expensive part of indexing.
//! The cache remembers the class list of every jar it has seen, keyed by
//! the jar's path and validated against its metadata, so that repeated
//! runs across many modules sharing the same libraries only read each jar once.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, warn};

/// Cache errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to read cache file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse cache: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Cache version mismatch (found {found}, expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
}

/// Current cache format version
const CACHE_VERSION: u32 = 1;

/// File metadata for change detection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileMetadata {
    /// File modification time (as seconds since UNIX epoch)
    pub mtime: u64,
    /// File size in bytes
    pub size: u64,
    /// Content hash, hex encoded
    pub content_hash: String,
}

impl FileMetadata {
    /// Create metadata from a file path
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = fs::metadata(path)?;
        let mtime = metadata
            .modified()?
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let size = metadata.len();

        let content = fs::read(path)?;
        let hash = Self::compute_hash(&content);

        Ok(Self {
            mtime,
            size,
            content_hash: hash,
        })
    }

    /// Quick check if file might have changed (fast path)
    pub fn quick_changed(&self, path: &Path) -> bool {
        if let Ok(metadata) = fs::metadata(path) {
            let mtime = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
                .map(|d| d.as_secs())
                .unwrap_or(0);
            let size = metadata.len();

            mtime != self.mtime || size != self.size
        } else {
            true
        }
    }

    /// Full check with content hash (slow path, only if quick check fails)
    pub fn content_changed(&self, path: &Path) -> bool {
        if let Ok(content) = fs::read(path) {
            let hash = Self::compute_hash(&content);
            hash != self.content_hash
        } else {
            true
        }
    }

    fn compute_hash(content: &[u8]) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }
}

/// Cached class listing for one jar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactCacheEntry {
    pub metadata: FileMetadata,
    pub classes: Vec<String>,
}

/// Class listings of previously indexed jars, keyed by jar path.
///
/// Classes directories are never cached: they are the outputs of sibling
/// projects and change on every compile.
#[derive(Debug, Serialize, Deserialize)]
pub struct ArtifactCache {
    pub version: u32,
    pub artifacts: HashMap<PathBuf, ArtifactCacheEntry>,
    /// Timestamp when cache was created
    pub created_at: u64,
}

impl Default for ArtifactCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactCache {
    pub fn new() -> Self {
        Self {
            version: CACHE_VERSION,
            artifacts: HashMap::new(),
            created_at: SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        }
    }

    /// Load cache from disk
    pub fn load(cache_path: &Path) -> Result<Self, CacheError> {
        let file = fs::File::open(cache_path)?;
        let reader = BufReader::new(file);
        let cache: Self = serde_json::from_reader(reader)?;

        if cache.version != CACHE_VERSION {
            return Err(CacheError::VersionMismatch {
                found: cache.version,
                expected: CACHE_VERSION,
            });
        }

        Ok(cache)
    }

    /// Load the cache, starting empty when it is missing, stale or corrupt
    pub fn load_or_default(cache_path: &Path) -> Self {
        if !cache_path.exists() {
            debug!("No artifact cache at {}", cache_path.display());
            return Self::new();
        }
        match Self::load(cache_path) {
            Ok(cache) => {
                debug!("Loaded artifact cache: {}", cache.stats());
                cache
            }
            Err(e) => {
                warn!("Ignoring artifact cache {}: {}", cache_path.display(), e);
                Self::new()
            }
        }
    }

    /// Save cache to disk
    pub fn save(&self, cache_path: &Path) -> Result<(), CacheError> {
        if let Some(parent) = cache_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = fs::File::create(cache_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Classes of a jar if the cached listing is still valid
    pub fn lookup(&self, jar: &Path) -> Option<&[String]> {
        let entry = self.artifacts.get(jar)?;
        if entry.metadata.quick_changed(jar) && entry.metadata.content_changed(jar) {
            return None;
        }
        Some(&entry.classes)
    }

    /// Record the classes of a jar together with its current metadata
    pub fn insert(&mut self, jar: &Path, classes: Vec<String>) -> std::io::Result<()> {
        let metadata = FileMetadata::from_path(jar)?;
        self.artifacts
            .insert(jar.to_path_buf(), ArtifactCacheEntry { metadata, classes });
        Ok(())
    }

    /// Remove entries for jars that no longer exist
    pub fn prune_missing(&mut self) {
        self.artifacts.retain(|path, _| path.exists());
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_artifacts: self.artifacts.len(),
            total_classes: self.artifacts.values().map(|e| e.classes.len()).sum(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total_artifacts: usize,
    pub total_classes: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} artifacts, {} classes cached",
            self.total_artifacts, self.total_classes
        )
    }
}
