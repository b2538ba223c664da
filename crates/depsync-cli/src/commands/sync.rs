//! Handler for `depsync sync`.

use miette::Result;

use depsync_ops::ops_sync::{self, SyncOptions};

pub fn exec(modules: &[String], verbose: bool) -> Result<()> {
    let (session, store) = super::open_session()?;
    let opts = SyncOptions {
        modules: modules.to_vec(),
        verbose,
    };
    let report = super::runtime()?.block_on(ops_sync::sync(session, &store, &opts))?;

    let failed: Vec<&str> = report.failed().map(|m| m.module.as_str()).collect();
    if !failed.is_empty() {
        return Err(miette::miette!(
            "Failed to sync {} of {} modules: {}",
            failed.len(),
            report.modules.len(),
            failed.join(", ")
        ));
    }
    Ok(())
}
