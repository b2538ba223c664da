use miette::Result;

use depsync_ops::ops_init::{self, InitOutcome};
use depsync_util::progress::{status, status_warn};

pub fn exec(module: &str) -> Result<()> {
    let project = super::load_project()?;

    match ops_init::init_module(&project, module)? {
        InitOutcome::Created(manifest) => {
            status("Created", &manifest.display().to_string());
        }
        InitOutcome::NoTemplate => {
            status_warn(
                "Skipped",
                &format!("{module}: no ivy-template is configured"),
            );
        }
    }
    Ok(())
}
