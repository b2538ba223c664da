use miette::Result;

use depsync_model::local::LocalProjectModel;
use depsync_ops::ops_clean;

pub fn exec() -> Result<()> {
    let project = super::load_project()?;
    let store = LocalProjectModel::for_project(&project.root)?;

    let result = ops_clean::clean(&project, &store)?;
    if result.is_empty() {
        println!("Nothing to clean");
    } else {
        println!(
            "Removed {} libraries from {} modules",
            result.libraries_removed,
            result.modules.len()
        );
    }
    Ok(())
}
