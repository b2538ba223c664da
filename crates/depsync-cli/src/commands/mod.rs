//! Command dispatch and handler modules.

mod clean;
mod init;
mod status;
mod sync;
mod watch;

use std::sync::Arc;

use miette::Result;

use depsync_core::project::Project;
use depsync_model::local::LocalProjectModel;
use depsync_ops::session::ResolveSession;
use depsync_util::errors::DepsyncError;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Sync { modules } => sync::exec(&modules, cli.verbose),
        Command::Init { module } => init::exec(&module),
        Command::Clean => clean::exec(),
        Command::Status => status::exec(cli.verbose),
        Command::Watch => watch::exec(cli.verbose),
    }
}

/// Load the project around the current directory.
fn load_project() -> Result<Project> {
    let cwd = std::env::current_dir().map_err(DepsyncError::Io)?;
    Ok(Project::discover(&cwd)?)
}

/// Session and model store for the project around the current directory.
fn open_session() -> Result<(Arc<ResolveSession>, LocalProjectModel)> {
    let project = load_project()?;
    let store = LocalProjectModel::for_project(&project.root)?;
    Ok((Arc::new(ResolveSession::with_report_engine(project)), store))
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    let rt = tokio::runtime::Runtime::new().map_err(|e| DepsyncError::Generic {
        message: format!("Failed to start async runtime: {e}"),
    })?;
    Ok(rt)
}
