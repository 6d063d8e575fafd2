use super::DependencySets;
use crate::cache::ArtifactCache;
use crate::config::Config;
use crate::error::Result;
use crate::index::{ArtifactIndexer, ClassIndex};
use crate::model::{ArtifactId, ResolutionManifest};
use crate::references::ReferenceSource;
use std::collections::BTreeSet;
use tracing::{debug, info, trace};

/// Works out which dependencies a project uses, which of those it never
/// declared, and which declared ones it never uses.
///
/// A classification indexes the classpath configuration's artifacts,
/// maps every referenced class to the artifact providing it, and
/// compares the result with the declared dependencies of the configurations
/// under validation.
pub struct DependencyClassifier<'a> {
    config: &'a Config,
    cache: Option<&'a mut ArtifactCache>,
    show_progress: bool,
}

impl<'a> DependencyClassifier<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            cache: None,
            show_progress: false,
        }
    }

    /// Reuse artifact class listings across runs
    pub fn with_cache(mut self, cache: &'a mut ArtifactCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn classify(&mut self, manifest: &ResolutionManifest, source: &dyn ReferenceSource) -> Result<DependencySets> {
        let validated = &self.config.configurations;
        for name in validated {
            manifest.configuration(name)?;
        }
        let classpath = manifest.configuration(&self.config.classpath_configuration)?;

        let mut indexer = ArtifactIndexer::new()
            .parallel(self.config.parallel)
            .show_progress(self.show_progress);
        if let Some(cache) = self.cache.as_deref_mut() {
            indexer = indexer.with_cache(cache);
        }
        let mut index = indexer.populate(&classpath.artifacts)?;

        let required = referenced_dependencies(&index, manifest, source.used_classes());
        let mut api_required = referenced_dependencies(&index, manifest, source.api_classes());
        api_required.retain(|d| required.contains(d));

        // Nothing else needs the index; release it before the set arithmetic
        index.clear();

        let declared = manifest.declared_dependencies(validated)?;
        let direct = manifest.direct_dependencies(validated)?;
        let source_only = self.source_only_dependencies(manifest)?;
        debug!(
            "{} declared dependencies ({} direct), {} source-only",
            declared.len(),
            direct.len(),
            source_only.len()
        );

        let implicit_exempt = self.config.implicit_exemptions();
        let unused_exempt = self.config.unused_exemptions();

        let implicit: BTreeSet<String> = required
            .difference(&declared)
            .filter(|d| !source_only.contains(*d))
            .filter(|d| !implicit_exempt.contains(*d))
            .cloned()
            .collect();

        let unused: BTreeSet<String> = declared
            .difference(&required)
            .filter(|d| direct.contains(*d))
            .filter(|d| !source_only.contains(*d))
            .filter(|d| !unused_exempt.contains(*d))
            .cloned()
            .collect();

        let mut sets = DependencySets {
            required,
            api_required,
            implicit,
            unused,
        };
        if !manifest.project.is_empty() {
            let own = ArtifactId::project(manifest.project.as_str()).dependency_name();
            for set in [&mut sets.required, &mut sets.api_required, &mut sets.implicit, &mut sets.unused] {
                set.remove(&own);
            }
        }

        info!(
            "{} required ({} api), {} implicit, {} unused",
            sets.required.len(),
            sets.api_required.len(),
            sets.implicit.len(),
            sets.unused.len()
        );
        Ok(sets)
    }

    /// Direct dependencies of the source-only configurations the manifest has
    fn source_only_dependencies(&self, manifest: &ResolutionManifest) -> Result<BTreeSet<String>> {
        let present: Vec<String> = self
            .config
            .source_only_configurations
            .iter()
            .filter(|name| manifest.configurations.iter().any(|c| &c.name == *name))
            .cloned()
            .collect();
        manifest.direct_dependencies(&present)
    }
}

/// Dependencies providing the given classes. Classes nothing provides,
/// like JDK classes, and classes of the project itself are dropped.
fn referenced_dependencies(
    index: &ClassIndex,
    manifest: &ResolutionManifest,
    classes: &BTreeSet<String>,
) -> BTreeSet<String> {
    let mut dependencies = BTreeSet::new();
    for class in classes {
        let artifact = match index.artifact_for(class) {
            Some(artifact) => artifact,
            None => {
                trace!("No artifact provides {}", class);
                continue;
            }
        };
        if manifest.is_self(artifact) {
            trace!("{} is provided by the project itself", class);
            continue;
        }
        let dependency = index
            .dependency_of(artifact)
            .map(str::to_string)
            .unwrap_or_else(|| artifact.dependency_name());
        dependencies.insert(dependency);
    }
    dependencies
}
