//! Watch command: re-sync modules when their inputs change.
//!
//! The project root, every module directory and the directories holding
//! settings and properties files are watched with `notify`. A change to a
//! module's manifest, exported report, settings file or properties files
//! invalidates that module's cached engine and descriptor and re-syncs it.
//! A change to `depsync.toml` reloads the project and re-syncs everything.
//! Events are debounced so rapid saves trigger a single cycle.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use miette::Result;
use notify::{RecursiveMode, Watcher};

use depsync_core::project::{Project, PROJECT_FILE};
use depsync_model::local::LocalProjectModel;
use depsync_ops::ops_sync::{self, SyncOptions};
use depsync_ops::session::ResolveSession;
use depsync_util::errors::DepsyncError;
use depsync_util::progress::{status, status_warn};

const DEBOUNCE_MS: u64 = 300;

/// What a batch of file events asks for.
#[derive(Debug, PartialEq, Eq)]
enum Reaction {
    Reload,
    Modules(BTreeSet<String>),
    Nothing,
}

pub fn exec(verbose: bool) -> Result<()> {
    let (mut session, store) = super::open_session()?;
    let rt = super::runtime()?;

    let (tx, rx) = mpsc::channel::<PathBuf>();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            if is_relevant_event(&event) {
                for path in event.paths {
                    let _ = tx.send(path);
                }
            }
        }
    })
    .map_err(|e| DepsyncError::Generic {
        message: format!("Failed to create file watcher: {e}"),
    })?;

    let watch_paths = collect_watch_paths(session.project());
    for path in &watch_paths {
        watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|e| DepsyncError::Generic {
                message: format!("Failed to watch {}: {e}", path.display()),
            })?;
    }

    status("Watching", &format!("{} directories", watch_paths.len()));
    if verbose {
        for p in &watch_paths {
            eprintln!("  watching: {}", p.display());
        }
    }

    run_cycle(&rt, &session, &store, Vec::new(), verbose);

    while let Ok(first) = rx.recv() {
        // Debounce: collect everything that arrives within the window
        std::thread::sleep(Duration::from_millis(DEBOUNCE_MS));
        let mut changed = vec![first];
        changed.extend(rx.try_iter());
        tracing::debug!("Changed paths: {changed:?}");

        match react(&session, &changed) {
            Reaction::Nothing => continue,
            Reaction::Reload => {
                let _ = console::Term::stderr().clear_screen();
                status("Detected", &format!("change to {PROJECT_FILE}, reloading..."));
                match Project::discover(&session.project().root) {
                    Ok(project) => {
                        session = Arc::new(ResolveSession::with_report_engine(project));
                        run_cycle(&rt, &session, &store, Vec::new(), verbose);
                    }
                    Err(e) => status_warn("Error", &e.to_string()),
                }
            }
            Reaction::Modules(modules) => {
                let _ = console::Term::stderr().clear_screen();
                for module in &modules {
                    session.invalidate(module);
                }
                let modules: Vec<String> = modules.into_iter().collect();
                status("Detected", &format!("change in {}, syncing...", modules.join(", ")));
                run_cycle(&rt, &session, &store, modules, verbose);
            }
        }
        status("Watching", "for changes...");
    }

    Ok(())
}

fn run_cycle(
    rt: &tokio::runtime::Runtime,
    session: &Arc<ResolveSession>,
    store: &LocalProjectModel,
    modules: Vec<String>,
    verbose: bool,
) {
    let opts = SyncOptions { modules, verbose };
    if let Err(e) = rt.block_on(ops_sync::sync(session.clone(), store, &opts)) {
        status_warn("Error", &format!("{e}"));
    }
}

/// Decide what to do about a batch of changed paths.
fn react(session: &ResolveSession, changed: &[PathBuf]) -> Reaction {
    let config = session.project().root.join(PROJECT_FILE);
    let mut modules = BTreeSet::new();
    for path in changed {
        if path == &config {
            return Reaction::Reload;
        }
        modules.extend(session.modules_for_path(path));
    }
    if modules.is_empty() {
        Reaction::Nothing
    } else {
        Reaction::Modules(modules)
    }
}

/// The project root plus every existing directory holding a manifest or
/// an engine input.
fn collect_watch_paths(project: &Project) -> Vec<PathBuf> {
    let mut paths = vec![project.root.clone()];
    for module in project.modules() {
        let inputs = project.engine_inputs(&module.name);
        let files = module.manifest.iter().chain(inputs.iter());
        for dir in files.filter_map(|f| f.parent()) {
            if dir.is_dir() {
                paths.push(dir.to_path_buf());
            }
        }
    }
    paths.sort();
    paths.dedup();
    paths
}

fn is_relevant_event(event: &notify::Event) -> bool {
    use notify::EventKind;

    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
        _ => return false,
    }

    event.paths.iter().any(|p| {
        let name = p.file_name().and_then(|n| n.to_str()).unwrap_or("");
        !(name.starts_with('.') || name.ends_with('~') || name.ends_with(".swp"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use depsync_core::project::ProjectConfig;

    fn session(root: &Path) -> ResolveSession {
        let config = ProjectConfig::from_str(
            r#"
[[module]]
name = "app"
dir = "app"

[[module]]
name = "core"
dir = "libs/core"
manifest = "module.xml"
"#,
        )
        .unwrap();
        ResolveSession::with_report_engine(Project::new(root, config))
    }

    #[test]
    fn manifest_and_report_changes_map_to_modules() {
        let s = session(Path::new("/work"));
        let changed = vec![
            PathBuf::from("/work/app/ivy.xml"),
            PathBuf::from("/work/libs/core/module.xml.report.json"),
            PathBuf::from("/work/app/README.md"),
        ];
        let expected: BTreeSet<String> = ["app", "core"].iter().map(|s| s.to_string()).collect();
        assert_eq!(react(&s, &changed), Reaction::Modules(expected));
    }

    #[test]
    fn settings_and_properties_changes_map_to_modules() {
        let config = ProjectConfig::from_str(
            r#"
[settings]
properties-files = ["build.properties"]

[[module]]
name = "app"
dir = "app"
properties-files = ["app.properties"]

[[module]]
name = "core"
dir = "core"
include-project-properties = false

[[module]]
name = "tools"
dir = "tools"
use-project-settings = false
settings-file = "conf/ivysettings.xml"
include-project-properties = false
"#,
        )
        .unwrap();
        let s = ResolveSession::with_report_engine(Project::new(Path::new("/work"), config));

        let shared = react(&s, &[PathBuf::from("/work/build.properties")]);
        assert_eq!(shared, Reaction::Modules(["app".to_string()].into()));

        let changed = vec![
            PathBuf::from("/work/app/app.properties"),
            PathBuf::from("/work/tools/conf/ivysettings.xml"),
        ];
        let expected: BTreeSet<String> = ["app", "tools"].iter().map(|s| s.to_string()).collect();
        assert_eq!(react(&s, &changed), Reaction::Modules(expected));

        // a module's own settings file is not the project's
        assert_eq!(
            react(&s, &[PathBuf::from("/work/conf/ivysettings.xml")]),
            Reaction::Nothing
        );
    }

    #[test]
    fn project_file_change_reloads() {
        let s = session(Path::new("/work"));
        let changed = vec![
            PathBuf::from("/work/app/ivy.xml"),
            PathBuf::from("/work/depsync.toml"),
        ];
        assert_eq!(react(&s, &changed), Reaction::Reload);
    }

    #[test]
    fn unrelated_changes_are_ignored() {
        let s = session(Path::new("/work"));
        assert_eq!(
            react(&s, &[PathBuf::from("/work/.depsync/model.json")]),
            Reaction::Nothing
        );
    }
}
