//! Operation: resolve modules and bring their project model up to date.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;

use depsync_model::store::ProjectModelStore;
use depsync_model::wrapper::ProjectModelWrapper;
use depsync_resolver::problem::ResolveProblem;
use depsync_util::errors::DepsyncError;
use depsync_util::progress::{spinner, status, status_info, status_warn};

use crate::session::{ModuleResolution, ResolveSession};

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Modules to sync; empty means every module with a manifest.
    pub modules: Vec<String>,
    pub verbose: bool,
}

/// What happened to one module.
#[derive(Debug, Clone, Default)]
pub struct ModuleSyncReport {
    pub module: String,
    pub problems: Vec<ResolveProblem>,
    /// Number of model changes applied.
    pub changes: usize,
    pub committed: bool,
    /// Set when the module could not be resolved or applied; its model was
    /// left unchanged.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub modules: Vec<ModuleSyncReport>,
}

impl SyncReport {
    pub fn failed(&self) -> impl Iterator<Item = &ModuleSyncReport> {
        self.modules.iter().filter(|m| m.error.is_some())
    }

    pub fn problem_count(&self) -> usize {
        self.modules.iter().map(|m| m.problems.len()).sum()
    }

    pub fn module(&self, name: &str) -> Option<&ModuleSyncReport> {
        self.modules.iter().find(|m| m.module == name)
    }
}

/// Resolve the selected modules concurrently, then apply each result to
/// `store` one module at a time.
///
/// Per-dependency problems are reported and never stop the rest of the
/// module from being applied. A module that fails to resolve is reported
/// and its model is not touched.
pub async fn sync(
    session: Arc<ResolveSession>,
    store: &dyn ProjectModelStore,
    opts: &SyncOptions,
) -> miette::Result<SyncReport> {
    let selected = select_modules(&session, opts)?;
    if selected.is_empty() {
        status_info("Synced", "no modules with a manifest");
        return Ok(SyncReport::default());
    }

    let sp = spinner(&format!("Resolving {} modules...", selected.len()));
    let registry = {
        let session = session.clone();
        tokio::task::spawn_blocking(move || Arc::new(session.registry()))
            .await
            .map_err(|e| miette::miette!("Background task failed: {}", e))?
    };

    let mut join_set = JoinSet::new();
    for name in &selected {
        let session = session.clone();
        let registry = registry.clone();
        let name = name.clone();
        join_set.spawn_blocking(move || {
            let result = session.resolve_module(&name, registry.as_ref());
            (name, result)
        });
    }

    let mut resolved: HashMap<String, Result<ModuleResolution, DepsyncError>> = HashMap::new();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((name, result)) => {
                resolved.insert(name, result);
            }
            Err(e) => {
                sp.finish_and_clear();
                return Err(miette::miette!("Background task failed: {}", e));
            }
        }
    }
    sp.finish_and_clear();

    let mut report = SyncReport::default();
    for name in selected {
        let Some(result) = resolved.remove(&name) else {
            continue;
        };
        report.modules.push(apply(store, &name, result, opts.verbose));
    }

    let changes: usize = report.modules.iter().map(|m| m.changes).sum();
    let failed = report.failed().count();
    let summary = format!(
        "{} modules, {changes} changes, {} problems",
        report.modules.len(),
        report.problem_count()
    );
    if failed > 0 {
        status_warn("Synced", &format!("{summary}, {failed} failed"));
    } else {
        status("Synced", &summary);
    }
    Ok(report)
}

fn select_modules(session: &ResolveSession, opts: &SyncOptions) -> miette::Result<Vec<String>> {
    let project = session.project();
    if opts.modules.is_empty() {
        return Ok(project
            .modules()
            .into_iter()
            .filter(|m| {
                let has_manifest = m.manifest.is_some();
                if !has_manifest {
                    tracing::debug!("Skipping module {} without a manifest", m.name);
                }
                has_manifest
            })
            .map(|m| m.name)
            .collect());
    }
    let mut names = Vec::new();
    for name in &opts.modules {
        project.module(name)?;
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
    Ok(names)
}

fn apply(
    store: &dyn ProjectModelStore,
    name: &str,
    result: Result<ModuleResolution, DepsyncError>,
    verbose: bool,
) -> ModuleSyncReport {
    let mut entry = ModuleSyncReport {
        module: name.to_string(),
        ..Default::default()
    };
    let resolution = match result {
        Ok(r) => r,
        Err(e) => {
            status_warn("Failed", &format!("{name}: {e}"));
            entry.error = Some(e.to_string());
            return entry;
        }
    };

    for problem in &resolution.problems {
        status_warn("Problem", &format!("{name}: {problem}"));
    }
    entry.problems = resolution.problems;

    match ProjectModelWrapper::new(store, name).reconcile(&resolution.dependencies) {
        Ok(outcome) => {
            if verbose {
                for action in &outcome.actions {
                    status_info("Changed", &format!("{name}: {action}"));
                }
            }
            entry.changes = outcome.actions.len();
            entry.committed = outcome.committed;
            if outcome.committed {
                status("Updated", &format!("{name} ({} changes)", entry.changes));
            } else {
                status_info("Fresh", name);
            }
        }
        Err(e) => {
            status_warn("Failed", &format!("{name}: {e}"));
            entry.error = Some(e.to_string());
        }
    }
    entry
}
