//! Seams to a project model store.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use depsync_core::artifact::ArtifactCategory;
use depsync_core::scope::DependencyScope;
use depsync_util::errors::DepsyncError;

/// A library attached to a module, with its roots grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub name: String,
    #[serde(default)]
    pub scope: DependencyScope,
    #[serde(default)]
    pub roots: BTreeMap<ArtifactCategory, BTreeSet<PathBuf>>,
}

impl LibraryEntry {
    pub fn new(name: impl Into<String>, scope: DependencyScope) -> Self {
        Self {
            name: name.into(),
            scope,
            roots: BTreeMap::new(),
        }
    }

    pub fn has_root(&self, category: ArtifactCategory, path: &Path) -> bool {
        self.roots
            .get(&category)
            .is_some_and(|paths| paths.contains(path))
    }

    /// Every `(category, path)` root of the library.
    pub fn all_roots(&self) -> impl Iterator<Item = (ArtifactCategory, &Path)> {
        self.roots
            .iter()
            .flat_map(|(c, paths)| paths.iter().map(move |p| (*c, p.as_path())))
    }
}

/// A dependency of a module on another module of the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub module: String,
    #[serde(default)]
    pub scope: DependencyScope,
}

/// Read and write access to one module's dependency entries.
///
/// Changes stay private to the model until [`commit`](Self::commit);
/// [`dispose`](Self::dispose) drops them.
pub trait ModifiableRootModel {
    fn module_name(&self) -> &str;

    fn libraries(&self) -> Vec<LibraryEntry>;

    fn library(&self, name: &str) -> Option<LibraryEntry>;

    fn module_entries(&self) -> Vec<ModuleEntry>;

    fn create_library(&mut self, name: &str, scope: DependencyScope) -> Result<(), DepsyncError>;

    fn remove_library(&mut self, name: &str) -> Result<(), DepsyncError>;

    fn set_library_scope(&mut self, name: &str, scope: DependencyScope)
        -> Result<(), DepsyncError>;

    fn add_root(
        &mut self,
        library: &str,
        category: ArtifactCategory,
        path: &Path,
    ) -> Result<(), DepsyncError>;

    fn remove_root(
        &mut self,
        library: &str,
        category: ArtifactCategory,
        path: &Path,
    ) -> Result<(), DepsyncError>;

    fn add_module_entry(&mut self, module: &str, scope: DependencyScope)
        -> Result<(), DepsyncError>;

    fn remove_module_entry(&mut self, module: &str) -> Result<(), DepsyncError>;

    fn set_module_scope(&mut self, module: &str, scope: DependencyScope)
        -> Result<(), DepsyncError>;

    /// Whether any mutation was made since the model was handed out.
    fn is_changed(&self) -> bool;

    /// Publish every change in one step.
    fn commit(self: Box<Self>) -> Result<(), DepsyncError>;

    fn dispose(self: Box<Self>);
}

/// Hands out modifiable models, at most one per module at a time.
pub trait ProjectModelStore: Send + Sync {
    fn modifiable_model(
        &self,
        module: &str,
    ) -> Result<Box<dyn ModifiableRootModel + '_>, DepsyncError>;
}
