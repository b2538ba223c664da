//! A resolution session: one loaded project plus its engine cache.

use std::path::Path;
use std::sync::Arc;

use depsync_core::coordinate::ModuleId;
use depsync_core::project::{ModuleInfo, Project};
use depsync_core::report::ModuleDescriptor;
use depsync_resolver::cache::EngineCache;
use depsync_resolver::dependency::ResolvedDependency;
use depsync_resolver::engine::{
    EngineFactory, EngineProvider, ModuleMatch, ModuleRegistry, ResolutionEngine,
};
use depsync_resolver::problem::ResolveProblem;
use depsync_resolver::resolver::DependencyResolver;
use depsync_util::errors::DepsyncError;

use crate::report_engine::{report_path, ReportFileEngineFactory};

/// The project modules known to a session, keyed by the module id each
/// one publishes.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceModules {
    entries: Vec<(ModuleId, ModuleMatch)>,
}

impl WorkspaceModules {
    pub fn new(entries: Vec<(ModuleId, ModuleMatch)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ModuleRegistry for WorkspaceModules {
    fn find_module(&self, id: &ModuleId) -> Option<ModuleMatch> {
        self.entries
            .iter()
            .find(|(m, _)| m == id)
            .map(|(_, found)| found.clone())
    }
}

/// Outcome of resolving one module, detached from the session.
#[derive(Debug, Clone)]
pub struct ModuleResolution {
    pub module: String,
    pub dependencies: Vec<ResolvedDependency>,
    pub problems: Vec<ResolveProblem>,
}

pub struct ResolveSession {
    project: Project,
    cache: EngineCache,
}

impl ResolveSession {
    pub fn new(project: Project, factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            project,
            cache: EngineCache::new(factory),
        }
    }

    /// Session using engines that read exported resolution reports.
    pub fn with_report_engine(project: Project) -> Self {
        Self::new(project, Arc::new(ReportFileEngineFactory))
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Forget the engine and parsed manifest of `module`.
    pub fn invalidate(&self, module: &str) {
        self.cache.invalidate(module);
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Modules affected by a change to `path`: the one whose manifest or
    /// exported report it is, plus every module whose engine is configured
    /// from it as a settings or properties file.
    pub fn modules_for_path(&self, path: &Path) -> Vec<String> {
        self.project
            .modules()
            .into_iter()
            .filter(|m| {
                let is_manifest = m
                    .manifest
                    .as_deref()
                    .is_some_and(|manifest| path == manifest || path == report_path(manifest));
                is_manifest || self.project.engine_inputs(&m.name).iter().any(|p| p == path)
            })
            .map(|m| m.name)
            .collect()
    }

    /// Snapshot of every project module with the id and revision its
    /// manifest declares.
    ///
    /// A module whose manifest can't be read is registered under its
    /// configured organisation and name, without a revision, or left out
    /// when no organisation is configured.
    pub fn registry(&self) -> WorkspaceModules {
        let mut entries = Vec::new();
        for module in self.project.modules() {
            let descriptor = module
                .manifest_file()
                .map(|manifest| self.descriptor(&module, manifest));
            match descriptor {
                Some(Ok(d)) => entries.push((
                    d.id.module_id(),
                    ModuleMatch {
                        name: module.name.clone(),
                        revision: Some(d.id.revision),
                    },
                )),
                other => {
                    if let Some(Err(e)) = other {
                        tracing::debug!("Manifest of module {} not readable: {e}", module.name);
                    }
                    if let Some(org) = &module.organisation {
                        entries.push((
                            ModuleId::new(org.clone(), module.name.clone()),
                            ModuleMatch {
                                name: module.name.clone(),
                                revision: None,
                            },
                        ));
                    }
                }
            }
        }
        WorkspaceModules::new(entries)
    }

    /// Resolve one module. Blocking.
    pub fn resolve_module(
        &self,
        name: &str,
        registry: &dyn ModuleRegistry,
    ) -> Result<ModuleResolution, DepsyncError> {
        let module = self.project.module(name)?;
        let settings = self.project.resolve_settings(name);
        let mut resolver = DependencyResolver::new(&module, &settings, self, registry);
        resolver.resolve()?;
        Ok(ModuleResolution {
            module: name.to_string(),
            dependencies: resolver.dependencies(),
            problems: resolver.problems().to_vec(),
        })
    }
}

impl EngineProvider for ResolveSession {
    fn engine(&self, module: &ModuleInfo) -> Result<Arc<dyn ResolutionEngine>, DepsyncError> {
        self.cache
            .engine(module, || self.project.engine_settings(&module.name))
    }

    fn descriptor(
        &self,
        module: &ModuleInfo,
        manifest: &Path,
    ) -> Result<ModuleDescriptor, DepsyncError> {
        if let Some(d) = self.cache.cached_descriptor(&module.name) {
            return Ok(d);
        }
        let engine = self.engine(module)?;
        self.cache.descriptor(module, engine.as_ref(), manifest)
    }
}
