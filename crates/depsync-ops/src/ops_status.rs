//! Operation: report the committed dependency entries of each module.

use depsync_core::project::Project;
use depsync_model::library_cache::is_managed;
use depsync_model::store::{LibraryEntry, ModuleEntry, ProjectModelStore};
use depsync_model::transaction::ModelTransaction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleStatus {
    pub module: String,
    /// Managed libraries only.
    pub libraries: Vec<LibraryEntry>,
    pub modules: Vec<ModuleEntry>,
    pub unmanaged_libraries: usize,
}

/// Read the model of every module of `project` without changing it.
pub fn status(
    project: &Project,
    store: &dyn ProjectModelStore,
) -> miette::Result<Vec<ModuleStatus>> {
    let mut statuses = Vec::new();
    for module in project.modules() {
        let tx = ModelTransaction::begin(store, &module.name)?;
        let (managed, unmanaged): (Vec<_>, Vec<_>) = tx
            .model()
            .libraries()
            .into_iter()
            .partition(|l| is_managed(&l.name));
        let modules = tx.model().module_entries();
        tx.finish()?;
        statuses.push(ModuleStatus {
            module: module.name,
            libraries: managed,
            modules,
            unmanaged_libraries: unmanaged.len(),
        });
    }
    Ok(statuses)
}

/// Print statuses to stdout, one block per module.
pub fn print_status(statuses: &[ModuleStatus], verbose: bool) {
    for s in statuses {
        println!(
            "{}: {} libraries, {} module dependencies",
            s.module,
            s.libraries.len(),
            s.modules.len()
        );
        for library in &s.libraries {
            println!("  {} ({})", library.name, library.scope);
            if verbose {
                for (category, path) in library.all_roots() {
                    println!("    {category}: {}", path.display());
                }
            }
        }
        for entry in &s.modules {
            println!("  module {} ({})", entry.module, entry.scope);
        }
        if s.unmanaged_libraries > 0 {
            println!("  {} other libraries", s.unmanaged_libraries);
        }
    }
}
