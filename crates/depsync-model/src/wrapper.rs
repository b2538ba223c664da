//! Reconcile a module's project model with a resolution outcome.
//!
//! Reconciliation stages [`ModelAction`]s against a snapshot of the module
//! taken when its modifiable model is acquired, then applies them and
//! commits once. Running it again with the same dependencies stages nothing.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use depsync_core::artifact::ArtifactCategory;
use depsync_core::scope::DependencyScope;
use depsync_resolver::dependency::{ExternalDependency, InternalDependency, ResolvedDependency};
use depsync_util::errors::DepsyncError;

use crate::library_cache::{is_managed, library_name, LibraryLookup, LibraryModelCache};
use crate::store::{LibraryEntry, ModifiableRootModel, ModuleEntry, ProjectModelStore};
use crate::transaction::ModelTransaction;

/// One staged change to a module's model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelAction {
    CreateLibrary {
        name: String,
        scope: DependencyScope,
    },
    AddRoot {
        library: String,
        category: ArtifactCategory,
        path: PathBuf,
    },
    SetLibraryScope {
        library: String,
        scope: DependencyScope,
    },
    RemoveRoot {
        library: String,
        category: ArtifactCategory,
        path: PathBuf,
    },
    RemoveLibrary {
        name: String,
    },
    AddModuleEntry {
        module: String,
        scope: DependencyScope,
    },
    SetModuleScope {
        module: String,
        scope: DependencyScope,
    },
    RemoveModuleEntry {
        module: String,
    },
}

impl ModelAction {
    pub fn apply(&self, model: &mut dyn ModifiableRootModel) -> Result<(), DepsyncError> {
        match self {
            Self::CreateLibrary { name, scope } => model.create_library(name, *scope),
            Self::AddRoot {
                library,
                category,
                path,
            } => model.add_root(library, *category, path),
            Self::SetLibraryScope { library, scope } => model.set_library_scope(library, *scope),
            Self::RemoveRoot {
                library,
                category,
                path,
            } => model.remove_root(library, *category, path),
            Self::RemoveLibrary { name } => model.remove_library(name),
            Self::AddModuleEntry { module, scope } => model.add_module_entry(module, *scope),
            Self::SetModuleScope { module, scope } => model.set_module_scope(module, *scope),
            Self::RemoveModuleEntry { module } => model.remove_module_entry(module),
        }
    }
}

impl fmt::Display for ModelAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateLibrary { name, scope } => write!(f, "create library {name} ({scope})"),
            Self::AddRoot {
                library,
                category,
                path,
            } => write!(f, "add {category} root {} to {library}", path.display()),
            Self::SetLibraryScope { library, scope } => {
                write!(f, "set scope of {library} to {scope}")
            }
            Self::RemoveRoot {
                library,
                category,
                path,
            } => write!(f, "remove {category} root {} from {library}", path.display()),
            Self::RemoveLibrary { name } => write!(f, "remove library {name}"),
            Self::AddModuleEntry { module, scope } => {
                write!(f, "add dependency on module {module} ({scope})")
            }
            Self::SetModuleScope { module, scope } => {
                write!(f, "set scope of module dependency {module} to {scope}")
            }
            Self::RemoveModuleEntry { module } => {
                write!(f, "remove dependency on module {module}")
            }
        }
    }
}

/// Module state captured when the modifiable model was acquired.
#[derive(Debug, Clone, Default)]
pub struct ModelSnapshot {
    pub libraries: BTreeMap<String, LibraryEntry>,
    pub modules: BTreeMap<String, DependencyScope>,
}

impl ModelSnapshot {
    pub fn capture(model: &dyn ModifiableRootModel) -> Self {
        Self {
            libraries: model
                .libraries()
                .into_iter()
                .map(|l| (l.name.clone(), l))
                .collect(),
            modules: model
                .module_entries()
                .into_iter()
                .map(|ModuleEntry { module, scope }| (module, scope))
                .collect(),
        }
    }
}

/// Actions staged so far and what the module should end up containing.
pub struct Staging<'s> {
    snapshot: &'s ModelSnapshot,
    libraries: LibraryModelCache,
    actions: Vec<ModelAction>,
    desired_roots: BTreeMap<String, BTreeSet<(ArtifactCategory, PathBuf)>>,
    desired_modules: BTreeSet<String>,
}

impl<'s> Staging<'s> {
    pub fn new(snapshot: &'s ModelSnapshot) -> Self {
        Self {
            snapshot,
            libraries: LibraryModelCache::new(snapshot.libraries.values()),
            actions: Vec::new(),
            desired_roots: BTreeMap::new(),
            desired_modules: BTreeSet::new(),
        }
    }

    /// Ensure a managed library with the given root exists.
    pub fn stage_library_root(
        &mut self,
        name: &str,
        category: ArtifactCategory,
        path: PathBuf,
        scope: Option<DependencyScope>,
    ) {
        let initial = scope.unwrap_or_default();
        if self.libraries.get_or_create(name, initial) == LibraryLookup::Created {
            self.actions.push(ModelAction::CreateLibrary {
                name: name.to_string(),
                scope: initial,
            });
        }
        if let Some(scope) = scope {
            if self.libraries.update_scope(name, scope) {
                self.actions.push(ModelAction::SetLibraryScope {
                    library: name.to_string(),
                    scope,
                });
            }
        }

        let present = self
            .snapshot
            .libraries
            .get(name)
            .is_some_and(|l| l.has_root(category, &path));
        let roots = self.desired_roots.entry(name.to_string()).or_default();
        if roots.insert((category, path.clone())) && !present {
            self.actions.push(ModelAction::AddRoot {
                library: name.to_string(),
                category,
                path,
            });
        }
    }

    /// Ensure a dependency on another project module exists.
    pub fn stage_module(&mut self, module: &str, scope: DependencyScope) {
        if !self.desired_modules.insert(module.to_string()) {
            return;
        }
        match self.snapshot.modules.get(module) {
            None => self.actions.push(ModelAction::AddModuleEntry {
                module: module.to_string(),
                scope,
            }),
            Some(current) if *current != scope => self.actions.push(ModelAction::SetModuleScope {
                module: module.to_string(),
                scope,
            }),
            Some(_) => {}
        }
    }

    /// Stage removal of everything managed that was not staged as desired:
    /// managed libraries, stale roots of kept managed libraries and module
    /// entries.
    pub fn stage_removals(&mut self) {
        for (name, library) in &self.snapshot.libraries {
            if !is_managed(name) {
                continue;
            }
            let Some(desired) = self.desired_roots.get(name) else {
                self.actions
                    .push(ModelAction::RemoveLibrary { name: name.clone() });
                continue;
            };
            for (category, path) in library.all_roots() {
                if !desired.contains(&(category, path.to_path_buf())) {
                    self.actions.push(ModelAction::RemoveRoot {
                        library: name.clone(),
                        category,
                        path: path.to_path_buf(),
                    });
                }
            }
        }
        for module in self.snapshot.modules.keys() {
            if !self.desired_modules.contains(module) {
                self.actions.push(ModelAction::RemoveModuleEntry {
                    module: module.clone(),
                });
            }
        }
    }

    pub fn actions(&self) -> &[ModelAction] {
        &self.actions
    }

    pub fn into_actions(self) -> Vec<ModelAction> {
        self.actions
    }
}

/// A value that knows which model actions make it present.
pub trait Stage {
    fn stage(&self, staging: &mut Staging<'_>);
}

impl Stage for ExternalDependency {
    fn stage(&self, staging: &mut Staging<'_>) {
        staging.stage_library_root(
            &library_name(&self.canonical_name()),
            self.category(),
            self.local_file().to_path_buf(),
            self.scope(),
        );
    }
}

impl Stage for InternalDependency {
    fn stage(&self, staging: &mut Staging<'_>) {
        staging.stage_module(&self.module, self.scope);
    }
}

impl Stage for ResolvedDependency {
    fn stage(&self, staging: &mut Staging<'_>) {
        match self {
            Self::External(d) => d.stage(staging),
            Self::Internal(d) => d.stage(staging),
        }
    }
}

/// Outcome of one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub actions: Vec<ModelAction>,
    pub committed: bool,
}

/// Reconciles one module of a [`ProjectModelStore`].
pub struct ProjectModelWrapper<'a> {
    store: &'a dyn ProjectModelStore,
    module: String,
}

impl<'a> ProjectModelWrapper<'a> {
    pub fn new(store: &'a dyn ProjectModelStore, module: impl Into<String>) -> Self {
        Self {
            store,
            module: module.into(),
        }
    }

    /// Make the module's managed libraries and module entries equal to
    /// `dependencies`, committing only when something changes.
    ///
    /// On failure the modifiable model is disposed and the committed state
    /// stays as it was.
    pub fn reconcile(
        &self,
        dependencies: &[ResolvedDependency],
    ) -> Result<ReconcileOutcome, DepsyncError> {
        self.run(|staging| {
            for dependency in dependencies {
                dependency.stage(staging);
            }
            staging.stage_removals();
        })
    }

    /// Remove every managed library of the module. Unmanaged libraries and
    /// module entries are left alone.
    pub fn remove_managed_libraries(&self) -> Result<ReconcileOutcome, DepsyncError> {
        self.run(|staging| {
            let names: Vec<String> = staging
                .snapshot
                .libraries
                .keys()
                .filter(|n| is_managed(n))
                .cloned()
                .collect();
            staging
                .actions
                .extend(names.into_iter().map(|name| ModelAction::RemoveLibrary { name }));
        })
    }

    fn run<F>(&self, stage: F) -> Result<ReconcileOutcome, DepsyncError>
    where
        F: FnOnce(&mut Staging<'_>),
    {
        let mut tx = ModelTransaction::begin(self.store, &self.module)?;
        let snapshot = ModelSnapshot::capture(tx.model());
        let mut staging = Staging::new(&snapshot);
        stage(&mut staging);
        let actions = staging.into_actions();

        for action in &actions {
            tracing::debug!("{}: {action}", self.module);
            action.apply(tx.model_mut())?;
        }
        let committed = tx.finish()?;
        if committed {
            tracing::info!(
                "Updated project model of module {} ({} changes)",
                self.module,
                actions.len()
            );
        }
        Ok(ReconcileOutcome { actions, committed })
    }
}
