//! Handler for `depsync status`.

use miette::Result;

use depsync_model::local::LocalProjectModel;
use depsync_ops::ops_status;

pub fn exec(verbose: bool) -> Result<()> {
    let project = super::load_project()?;
    let store = LocalProjectModel::for_project(&project.root)?;

    let statuses = ops_status::status(&project, &store)?;
    if statuses.is_empty() {
        println!("No modules configured.");
        return Ok(());
    }
    ops_status::print_status(&statuses, verbose);
    Ok(())
}
