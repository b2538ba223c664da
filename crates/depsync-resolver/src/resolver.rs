//! Walk a resolution report and turn it into project model dependencies.
//!
//! Configurations are visited in inheritance order, parents first. A
//! dependency reached through several configurations takes the default scope
//! of the earliest of them in that order. Each failure is recorded as a
//! [`ResolveProblem`] and only affects the dependency it concerns.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

use depsync_core::artifact::{Artifact, ArtifactCategory};
use depsync_core::coordinate::ModuleRevisionId;
use depsync_core::project::ModuleInfo;
use depsync_core::report::{ArtifactDownload, ResolveReport};
use depsync_core::settings::ResolveSettings;
use depsync_util::errors::DepsyncError;

use crate::dependency::{ExternalDependency, ExternalKey, InternalDependency, ResolvedDependency};
use crate::engine::{EngineProvider, ModuleRegistry, ResolutionEngine};
use crate::graph::{topo_sort, ConfigurationGraph};
use crate::problem::{ProblemReport, ResolveProblem};

/// Resolves one module and keeps the outcome of the last call.
pub struct DependencyResolver<'a> {
    module: &'a ModuleInfo,
    settings: &'a ResolveSettings,
    engines: &'a dyn EngineProvider,
    registry: &'a dyn ModuleRegistry,
    problems: ProblemReport,
    external: Vec<ExternalDependency>,
    internal: Vec<InternalDependency>,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(
        module: &'a ModuleInfo,
        settings: &'a ResolveSettings,
        engines: &'a dyn EngineProvider,
        registry: &'a dyn ModuleRegistry,
    ) -> Self {
        Self {
            module,
            settings,
            engines,
            registry,
            problems: ProblemReport::new(),
            external: Vec::new(),
            internal: Vec::new(),
        }
    }

    /// Resolve the module's manifest and recompute every result from scratch.
    ///
    /// Fails only for module-level errors: a missing manifest, a manifest
    /// the engine can't read, cyclic configurations or an unusable engine.
    /// Previous results are cleared first, so after a failure the accessors
    /// are empty rather than showing a stale or partial set.
    pub fn resolve(&mut self) -> Result<(), DepsyncError> {
        self.problems = ProblemReport::new();
        self.external.clear();
        self.internal.clear();

        let manifest = self.module.manifest_file().map(PathBuf::from).ok_or_else(|| {
            DepsyncError::ManifestUnavailable {
                module: self.module.name.clone(),
                path: self.module.manifest.clone(),
            }
        })?;
        let engine = self.engines.engine(self.module)?;
        let descriptor = self.engines.descriptor(self.module, &manifest)?;
        let graph = ConfigurationGraph::from_configurations(&descriptor.configurations);
        let sorted = topo_sort(&graph)?;

        tracing::debug!(
            "Resolving module {} ({} configurations)",
            self.module.name,
            sorted.len()
        );
        let report = engine
            .resolve(&manifest, &self.settings.options)
            .map_err(|e| e.for_manifest(&self.module.name, &manifest))?;

        let mut walk = Walk::new(self.module, self.settings, self.registry, engine.as_ref());
        walk.run(&report, &sorted);
        let (problems, external, internal) = walk.finish();
        self.problems = problems;
        self.external = external;
        self.internal = internal;

        tracing::info!(
            "Module {}: {} external, {} internal dependencies, {} problems",
            self.module.name,
            self.external.len(),
            self.internal.len(),
            self.problems.len()
        );
        Ok(())
    }

    pub fn problems(&self) -> &[ResolveProblem] {
        self.problems.as_slice()
    }

    pub fn external_dependencies(&self) -> &[ExternalDependency] {
        &self.external
    }

    pub fn internal_dependencies(&self) -> &[InternalDependency] {
        &self.internal
    }

    /// Every resolved dependency, externals first.
    pub fn dependencies(&self) -> Vec<ResolvedDependency> {
        self.external
            .iter()
            .cloned()
            .map(ResolvedDependency::from)
            .chain(self.internal.iter().cloned().map(ResolvedDependency::from))
            .collect()
    }
}

/// Visit order of the report's configurations.
///
/// Configurations known to the manifest come in inheritance order; any the
/// report has beyond those follow in report order. When nothing matches,
/// report order is used.
pub fn visit_order(sorted: &[String], report: &ResolveReport) -> Vec<String> {
    let present = report.configuration_names();
    let mut order: Vec<String> = sorted
        .iter()
        .filter(|c| present.contains(c))
        .cloned()
        .collect();
    if order.is_empty() {
        return present;
    }
    for c in present {
        if !order.contains(&c) {
            order.push(c);
        }
    }
    order
}

struct PendingExternal {
    artifact: Artifact,
    local_file: PathBuf,
    /// Seen as a regular artifact, not only as an attached sources/javadoc.
    scoped: bool,
}

/// Accumulated state of one report walk.
struct Walk<'w> {
    module: &'w ModuleInfo,
    settings: &'w ResolveSettings,
    registry: &'w dyn ModuleRegistry,
    engine: &'w dyn ResolutionEngine,
    order: Vec<String>,
    problems: ProblemReport,
    /// Lowest visit rank per external dependency (`org:name:rev`).
    external_rank: HashMap<String, usize>,
    /// Lowest visit rank per internal module name.
    internal_rank: BTreeMap<String, usize>,
    external: BTreeMap<ExternalKey, PendingExternal>,
    attempted: HashSet<Artifact>,
}

impl<'w> Walk<'w> {
    fn new(
        module: &'w ModuleInfo,
        settings: &'w ResolveSettings,
        registry: &'w dyn ModuleRegistry,
        engine: &'w dyn ResolutionEngine,
    ) -> Self {
        Self {
            module,
            settings,
            registry,
            engine,
            order: Vec::new(),
            problems: ProblemReport::new(),
            external_rank: HashMap::new(),
            internal_rank: BTreeMap::new(),
            external: BTreeMap::new(),
            attempted: HashSet::new(),
        }
    }

    fn run(&mut self, report: &ResolveReport, sorted: &[String]) {
        self.order = visit_order(sorted, report);
        let all_artifacts = report.all_artifacts();
        let attach = self.settings.always_attach_sources || self.settings.always_attach_javadocs;

        for rank in 0..self.order.len() {
            let Some(conf) = report.configuration(&self.order[rank]) else {
                continue;
            };

            for unresolved in &conf.unresolved {
                if let Some(module) = self.internal_module(&unresolved.id) {
                    self.record_internal(module, rank);
                } else {
                    tracing::info!(
                        "Unresolved dependency {} in configuration {}: {}",
                        unresolved.id,
                        conf.configuration,
                        unresolved.message
                    );
                    self.problems.add(
                        ResolveProblem::new(unresolved.id.to_string(), unresolved.message.clone())
                            .with_cause(unresolved.cause.clone()),
                    );
                }
            }

            for dependency in &conf.dependencies {
                if let Some(module) = self.internal_module(&dependency.id) {
                    self.record_internal(module, rank);
                    continue;
                }
                let name = dependency.id.to_string();
                let slot = self.external_rank.entry(name).or_insert(rank);
                *slot = (*slot).min(rank);

                for download in &dependency.downloads {
                    self.add_external(download, true);
                }
                if attach {
                    for declared in &dependency.declared_artifacts {
                        if !all_artifacts.contains(declared) {
                            self.attach_auxiliary(declared);
                        }
                    }
                }
            }
        }
    }

    /// The project module `id` refers to, if internal detection applies.
    fn internal_module(&self, id: &ModuleRevisionId) -> Option<String> {
        if !self.settings.detect_internal_modules {
            return None;
        }
        let found = self.registry.find_module(&id.module_id())?;
        if found.name == self.module.name {
            return None;
        }
        if self.settings.detect_internal_modules_same_revision
            && found.revision.as_deref() != Some(id.revision.as_str())
        {
            return None;
        }
        Some(found.name)
    }

    fn record_internal(&mut self, module: String, rank: usize) {
        let slot = self.internal_rank.entry(module).or_insert(rank);
        *slot = (*slot).min(rank);
    }

    fn add_external(&mut self, download: &ArtifactDownload, scoped: bool) {
        let artifact = &download.artifact;
        let Some(category) = self.settings.artifact_types.categorize(artifact) else {
            self.problems.add(ResolveProblem::new(
                artifact.module.to_string(),
                format!(
                    "Unrecognized artifact type: {}, will not add this as a dependency.",
                    artifact.artifact_type
                ),
            ));
            return;
        };
        let local_file = match download.local_file() {
            Some(path) if path.exists() => path.to_path_buf(),
            Some(path) => {
                self.problems.add(ResolveProblem::new(
                    artifact.module.to_string(),
                    format!("File not found: {}", path.display()),
                ));
                return;
            }
            None => {
                self.problems.add(ResolveProblem::new(
                    artifact.module.to_string(),
                    format!("File not found: no local file for {}", artifact.file_name()),
                ));
                return;
            }
        };

        let key = ExternalKey {
            id: artifact.module.clone(),
            category,
        };
        let entry = self.external.entry(key).or_insert_with(|| PendingExternal {
            artifact: artifact.clone(),
            local_file,
            scoped: false,
        });
        entry.scoped |= scoped;
    }

    fn attach_auxiliary(&mut self, declared: &Artifact) {
        let wanted = match self.settings.artifact_types.categorize(declared) {
            Some(ArtifactCategory::Sources) => self.settings.always_attach_sources,
            Some(ArtifactCategory::Javadoc) => self.settings.always_attach_javadocs,
            _ => false,
        };
        if !wanted || !self.attempted.insert(declared.clone()) {
            return;
        }
        match self.engine.download(declared) {
            Ok(download) if download.local_file().is_some_and(|p| p.exists()) => {
                self.add_external(&download, false);
            }
            Ok(_) => tracing::debug!("No local file for {}", declared.file_name()),
            Err(e) => tracing::debug!("Failed to download {}: {e}", declared.file_name()),
        }
    }

    fn scope_at(&self, rank: usize) -> depsync_core::scope::DependencyScope {
        self.order
            .get(rank)
            .map(|conf| self.settings.scope_for(conf))
            .unwrap_or_default()
    }

    fn finish(self) -> (ProblemReport, Vec<ExternalDependency>, Vec<InternalDependency>) {
        let external = self
            .external
            .iter()
            .map(|(key, pending)| {
                let scope = pending.scoped.then(|| {
                    let rank = self
                        .external_rank
                        .get(&key.id.to_string())
                        .copied()
                        .unwrap_or(0);
                    self.scope_at(rank)
                });
                ExternalDependency::new(
                    pending.artifact.clone(),
                    pending.local_file.clone(),
                    key.category,
                    scope,
                )
            })
            .collect();
        let internal = self
            .internal_rank
            .iter()
            .map(|(module, &rank)| InternalDependency::new(module.clone(), self.scope_at(rank)))
            .collect();
        (self.problems, external, internal)
    }
}
