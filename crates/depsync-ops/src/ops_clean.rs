//! Operation: remove every managed library from the project model.

use depsync_core::project::Project;
use depsync_model::store::ProjectModelStore;
use depsync_model::wrapper::ProjectModelWrapper;

/// Result of a clean operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanResult {
    /// Modules whose model changed, in project order.
    pub modules: Vec<String>,
    pub libraries_removed: usize,
}

impl CleanResult {
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Remove all managed libraries from every module of `project`.
///
/// Only modules that had managed libraries are committed. Unmanaged
/// libraries and module dependencies are kept.
pub fn clean(project: &Project, store: &dyn ProjectModelStore) -> miette::Result<CleanResult> {
    let mut result = CleanResult::default();
    for module in project.modules() {
        let outcome = ProjectModelWrapper::new(store, &module.name).remove_managed_libraries()?;
        if outcome.committed {
            tracing::debug!(
                "Removed {} libraries from module {}",
                outcome.actions.len(),
                module.name
            );
            result.libraries_removed += outcome.actions.len();
            result.modules.push(module.name);
        }
    }
    Ok(result)
}
