//! File-backed project model kept in `.depsync/model.json`.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use depsync_core::artifact::ArtifactCategory;
use depsync_core::scope::DependencyScope;
use depsync_util::errors::DepsyncError;

use crate::store::{LibraryEntry, ModifiableRootModel, ModuleEntry, ProjectModelStore};

/// Location of the model file relative to the project root.
pub const MODEL_FILE: &str = ".depsync/model.json";

/// Dependency entries of one module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleModel {
    #[serde(default)]
    pub libraries: BTreeMap<String, LibraryEntry>,
    #[serde(default)]
    pub modules: BTreeMap<String, DependencyScope>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct ModelState {
    #[serde(default)]
    modules: BTreeMap<String, ModuleModel>,
}

/// A [`ProjectModelStore`] holding every module in memory, optionally
/// persisted to a JSON file on each commit.
#[derive(Debug, Default)]
pub struct LocalProjectModel {
    path: Option<PathBuf>,
    state: Mutex<ModelState>,
    checked_out: Mutex<HashSet<String>>,
    commits: AtomicUsize,
}

impl LocalProjectModel {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the model file at `path`; a missing file is an empty model.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DepsyncError> {
        let path = path.into();
        let state = if path.is_file() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(|e| DepsyncError::Model {
                message: format!("Failed to parse {}: {e}", path.display()),
            })?
        } else {
            ModelState::default()
        };
        Ok(Self {
            path: Some(path),
            state: Mutex::new(state),
            ..Self::default()
        })
    }

    /// Open the model of the project rooted at `root`.
    pub fn for_project(root: &Path) -> Result<Self, DepsyncError> {
        Self::open(root.join(MODEL_FILE))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Committed entries of `module`.
    pub fn module(&self, module: &str) -> ModuleModel {
        self.state().modules.get(module).cloned().unwrap_or_default()
    }

    pub fn module_names(&self) -> Vec<String> {
        self.state().modules.keys().cloned().collect()
    }

    /// Number of commits since the store was opened.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    fn state(&self) -> MutexGuard<'_, ModelState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn checked_out(&self) -> MutexGuard<'_, HashSet<String>> {
        self.checked_out.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, module: &str, model: ModuleModel) -> Result<(), DepsyncError> {
        let mut state = self.state();
        let previous = state.modules.insert(module.to_string(), model);
        if let Some(path) = &self.path {
            let saved = serde_json::to_vec_pretty(&*state)
                .map_err(|e| DepsyncError::Model {
                    message: format!("Failed to serialize project model: {e}"),
                })
                .and_then(|json| {
                    depsync_util::fs::write_atomic(path, &json).map_err(DepsyncError::from)
                });
            if let Err(e) = saved {
                // keep memory and disk in step
                match previous {
                    Some(p) => state.modules.insert(module.to_string(), p),
                    None => state.modules.remove(module),
                };
                return Err(e);
            }
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("Committed project model of module {module}");
        Ok(())
    }
}

impl ProjectModelStore for LocalProjectModel {
    fn modifiable_model(
        &self,
        module: &str,
    ) -> Result<Box<dyn ModifiableRootModel + '_>, DepsyncError> {
        if !self.checked_out().insert(module.to_string()) {
            return Err(DepsyncError::ModelBusy {
                module: module.to_string(),
            });
        }
        let working = self.module(module);
        Ok(Box::new(LocalModifiableModel {
            store: self,
            module: module.to_string(),
            working,
            changed: false,
        }))
    }
}

/// Working copy of one module handed out by [`LocalProjectModel`].
struct LocalModifiableModel<'s> {
    store: &'s LocalProjectModel,
    module: String,
    working: ModuleModel,
    changed: bool,
}

impl LocalModifiableModel<'_> {
    fn library_mut(&mut self, name: &str) -> Result<&mut LibraryEntry, DepsyncError> {
        self.working
            .libraries
            .get_mut(name)
            .ok_or_else(|| DepsyncError::Model {
                message: format!("No library '{name}' in module '{}'", self.module),
            })
    }

    fn missing_module(&self, module: &str) -> DepsyncError {
        DepsyncError::Model {
            message: format!(
                "Module '{}' has no dependency on module '{module}'",
                self.module
            ),
        }
    }
}

impl ModifiableRootModel for LocalModifiableModel<'_> {
    fn module_name(&self) -> &str {
        &self.module
    }

    fn libraries(&self) -> Vec<LibraryEntry> {
        self.working.libraries.values().cloned().collect()
    }

    fn library(&self, name: &str) -> Option<LibraryEntry> {
        self.working.libraries.get(name).cloned()
    }

    fn module_entries(&self) -> Vec<ModuleEntry> {
        self.working
            .modules
            .iter()
            .map(|(module, scope)| ModuleEntry {
                module: module.clone(),
                scope: *scope,
            })
            .collect()
    }

    fn create_library(&mut self, name: &str, scope: DependencyScope) -> Result<(), DepsyncError> {
        if self.working.libraries.contains_key(name) {
            return Err(DepsyncError::Model {
                message: format!("Library '{name}' already exists in module '{}'", self.module),
            });
        }
        self.working
            .libraries
            .insert(name.to_string(), LibraryEntry::new(name, scope));
        self.changed = true;
        Ok(())
    }

    fn remove_library(&mut self, name: &str) -> Result<(), DepsyncError> {
        if self.working.libraries.remove(name).is_none() {
            return Err(DepsyncError::Model {
                message: format!("No library '{name}' in module '{}'", self.module),
            });
        }
        self.changed = true;
        Ok(())
    }

    fn set_library_scope(
        &mut self,
        name: &str,
        scope: DependencyScope,
    ) -> Result<(), DepsyncError> {
        let library = self.library_mut(name)?;
        let changed = library.scope != scope;
        library.scope = scope;
        self.changed |= changed;
        Ok(())
    }

    fn add_root(
        &mut self,
        library: &str,
        category: ArtifactCategory,
        path: &Path,
    ) -> Result<(), DepsyncError> {
        let added = self
            .library_mut(library)?
            .roots
            .entry(category)
            .or_default()
            .insert(path.to_path_buf());
        self.changed |= added;
        Ok(())
    }

    fn remove_root(
        &mut self,
        library: &str,
        category: ArtifactCategory,
        path: &Path,
    ) -> Result<(), DepsyncError> {
        let entry = self.library_mut(library)?;
        let removed = match entry.roots.get_mut(&category) {
            Some(paths) => {
                let removed = paths.remove(path);
                if paths.is_empty() {
                    entry.roots.remove(&category);
                }
                removed
            }
            None => false,
        };
        self.changed |= removed;
        Ok(())
    }

    fn add_module_entry(
        &mut self,
        module: &str,
        scope: DependencyScope,
    ) -> Result<(), DepsyncError> {
        if module == self.module {
            return Err(DepsyncError::Model {
                message: format!("Module '{module}' cannot depend on itself"),
            });
        }
        if self.working.modules.insert(module.to_string(), scope) != Some(scope) {
            self.changed = true;
        }
        Ok(())
    }

    fn remove_module_entry(&mut self, module: &str) -> Result<(), DepsyncError> {
        if self.working.modules.remove(module).is_none() {
            return Err(self.missing_module(module));
        }
        self.changed = true;
        Ok(())
    }

    fn set_module_scope(
        &mut self,
        module: &str,
        scope: DependencyScope,
    ) -> Result<(), DepsyncError> {
        let Some(current) = self.working.modules.get_mut(module) else {
            return Err(self.missing_module(module));
        };
        if *current != scope {
            *current = scope;
            self.changed = true;
        }
        Ok(())
    }

    fn is_changed(&self) -> bool {
        self.changed
    }

    fn commit(mut self: Box<Self>) -> Result<(), DepsyncError> {
        let working = std::mem::take(&mut self.working);
        self.store.publish(&self.module, working)
    }

    fn dispose(self: Box<Self>) {
        tracing::debug!("Disposed project model of module {}", self.module);
    }
}

impl Drop for LocalModifiableModel<'_> {
    fn drop(&mut self) {
        self.store.checked_out().remove(&self.module);
    }
}
