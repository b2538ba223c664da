//! Operation: write a module's manifest from the configured template.

use std::collections::BTreeMap;
use std::path::PathBuf;

use depsync_core::project::Project;
use depsync_core::properties;
use depsync_util::errors::DepsyncError;

/// Template property holding the module name.
pub const MODULE_NAME: &str = "MODULE_NAME";

/// What `init_module` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// The manifest was written to this path.
    Created(PathBuf),
    /// No template is configured; nothing was written.
    NoTemplate,
}

/// Create the manifest of module `name` from the `ivy-template` file,
/// expanding `${MODULE_NAME}`.
///
/// Fails if the module is unknown, has no manifest path configured, or
/// already has a manifest on disk.
pub fn init_module(project: &Project, name: &str) -> miette::Result<InitOutcome> {
    let module = project.module(name)?;
    let manifest = module
        .manifest
        .ok_or_else(|| DepsyncError::ManifestUnavailable {
            module: name.to_string(),
            path: None,
        })?;
    if manifest.exists() {
        return Err(DepsyncError::Generic {
            message: format!("{} already exists", manifest.display()),
        }
        .into());
    }

    let Some(template) = project.ivy_template() else {
        tracing::debug!("No ivy template configured, skipping {name}");
        return Ok(InitOutcome::NoTemplate);
    };
    let content = std::fs::read_to_string(&template).map_err(|e| DepsyncError::Config {
        message: format!("Failed to read ivy template {}: {e}", template.display()),
    })?;

    let props = BTreeMap::from([(MODULE_NAME.to_string(), name.to_string())]);
    let rendered = properties::interpolate(&content, &props);

    if let Some(dir) = manifest.parent() {
        std::fs::create_dir_all(dir).map_err(DepsyncError::Io)?;
    }
    std::fs::write(&manifest, rendered).map_err(DepsyncError::Io)?;
    tracing::debug!("Wrote {} from {}", manifest.display(), template.display());
    Ok(InitOutcome::Created(manifest))
}
