// Parallel artifact indexer using rayon

use super::scan::{directory_classes, jar_classes};
use super::ClassIndex;
use crate::cache::ArtifactCache;
use crate::error::{DepError, Result};
use crate::model::{ContainerKind, ResolvedArtifact};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Outcome of looking at one artifact
enum Listing {
    /// Not a jar or classes directory
    Skipped,
    Cached(Vec<String>),
    Scanned(Vec<String>, ContainerKind),
}

/// Builds a [`ClassIndex`] from resolved artifacts.
///
/// Every artifact is listed independently, in parallel by default, and
/// the per-artifact results are merged in input order so that class name
/// collisions resolve the same way on every run.
pub struct ArtifactIndexer<'c> {
    parallel: bool,
    show_progress: bool,
    cache: Option<&'c mut ArtifactCache>,
}

impl Default for ArtifactIndexer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'c> ArtifactIndexer<'c> {
    pub fn new() -> Self {
        Self {
            parallel: true,
            show_progress: false,
            cache: None,
        }
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn with_cache(mut self, cache: &'c mut ArtifactCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Index every artifact.
    ///
    /// Fails on the first artifact (in input order) that is missing or
    /// cannot be read; no partial index is returned.
    pub fn populate(&mut self, artifacts: &[ResolvedArtifact]) -> Result<ClassIndex> {
        info!("Indexing {} artifacts...", artifacts.len());

        let progress = self.progress_bar(artifacts.len());
        let cache = self.cache.as_deref();
        let list = |artifact: &ResolvedArtifact| {
            let listing = list_artifact(artifact, cache);
            progress.inc(1);
            listing
        };

        let listings: Vec<Result<Listing>> = if self.parallel {
            artifacts.par_iter().map(list).collect()
        } else {
            artifacts.iter().map(list).collect()
        };
        progress.finish_and_clear();

        let mut index = ClassIndex::new();
        let mut scanned = 0;
        let mut cached = 0;
        for (artifact, listing) in artifacts.iter().zip(listings) {
            match listing? {
                Listing::Skipped => {
                    debug!("Skipping {} ({}): not a jar or classes directory", artifact.id, artifact.file.display());
                }
                Listing::Cached(classes) => {
                    cached += 1;
                    index.insert(artifact, classes);
                }
                Listing::Scanned(classes, kind) => {
                    scanned += 1;
                    if kind == ContainerKind::Jar {
                        if let Some(cache) = self.cache.as_deref_mut() {
                            if let Err(e) = cache.insert(&artifact.file, classes.clone()) {
                                warn!("Could not cache {}: {}", artifact.file.display(), e);
                            }
                        }
                    }
                    index.insert(artifact, classes);
                }
            }
        }

        info!(
            "Indexed {} classes from {} artifacts ({} scanned, {} cached)",
            index.class_count(),
            index.artifact_count(),
            scanned,
            cached
        );
        Ok(index)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} artifacts")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }
}

fn list_artifact(artifact: &ResolvedArtifact, cache: Option<&ArtifactCache>) -> Result<Listing> {
    let unresolvable = |reason: String| DepError::UnresolvableArtifact {
        artifact: artifact.id.to_string(),
        path: artifact.file.clone(),
        reason,
    };

    let kind = match artifact.container() {
        Some(kind) => kind,
        None => return Ok(Listing::Skipped),
    };
    if !artifact.file.exists() {
        return Err(unresolvable("file does not exist".to_string()));
    }

    match kind {
        ContainerKind::Jar => {
            if let Some(classes) = cache.and_then(|c| c.lookup(&artifact.file)) {
                return Ok(Listing::Cached(classes.to_vec()));
            }
            let classes = jar_classes(&artifact.file).map_err(unresolvable)?;
            Ok(Listing::Scanned(classes, kind))
        }
        ContainerKind::Directory => {
            let classes = directory_classes(&artifact.file).map_err(unresolvable)?;
            Ok(Listing::Scanned(classes, kind))
        }
    }
}
