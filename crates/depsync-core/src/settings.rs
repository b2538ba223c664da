use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use depsync_util::errors::{DepsyncError, SettingsLocation};

use crate::artifact::ArtifactTypeSettings;
use crate::report::ResolveOptions;
use crate::scope::DependencyScope;

/// Default manifest file name inside a module directory.
pub const DEFAULT_MANIFEST: &str = "ivy.xml";

/// General resolution settings, shared by every module of a project.
///
/// Read from `[settings]` in `depsync.toml` or in the global config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneralSettings {
    /// Engine settings file; `None` uses the engine defaults.
    pub settings_file: Option<String>,
    pub validate: bool,
    pub transitive: bool,
    pub cache_only: bool,
    pub always_attach_sources: bool,
    pub always_attach_javadocs: bool,
    pub detect_internal_modules: bool,
    pub detect_internal_modules_same_revision: bool,
    pub resolve_only_configs: BTreeSet<String>,
    pub scopes: BTreeMap<String, DependencyScope>,
    pub artifact_types: ArtifactTypeSettings,
    pub properties_files: Vec<String>,
    pub cache_dir: Option<String>,
    /// Template file for new module manifests.
    pub ivy_template: Option<String>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            settings_file: None,
            validate: false,
            transitive: true,
            cache_only: false,
            always_attach_sources: true,
            always_attach_javadocs: true,
            detect_internal_modules: true,
            detect_internal_modules_same_revision: false,
            resolve_only_configs: BTreeSet::new(),
            scopes: BTreeMap::new(),
            artifact_types: ArtifactTypeSettings::default(),
            properties_files: Vec::new(),
            cache_dir: None,
            ivy_template: None,
        }
    }
}

/// Per-module settings from a `[[module]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModuleSettings {
    pub name: String,
    #[serde(default = "default_dir")]
    pub dir: String,
    /// Manifest path relative to `dir`; blank means the module has none.
    #[serde(default = "default_manifest")]
    pub manifest: String,
    #[serde(default)]
    pub organisation: Option<String>,
    #[serde(default = "default_true")]
    pub use_project_settings: bool,
    #[serde(default)]
    pub settings_file: Option<String>,
    #[serde(default)]
    pub only_resolve_selected_configs: bool,
    #[serde(default)]
    pub configs_to_resolve: BTreeSet<String>,
    #[serde(default)]
    pub scopes: BTreeMap<String, DependencyScope>,
    #[serde(default)]
    pub properties_files: Vec<String>,
    #[serde(default = "default_true")]
    pub include_project_properties: bool,
}

fn default_dir() -> String {
    ".".to_string()
}

fn default_manifest() -> String {
    DEFAULT_MANIFEST.to_string()
}

fn default_true() -> bool {
    true
}

impl ModuleSettings {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            dir: name.clone(),
            name,
            manifest: default_manifest(),
            organisation: None,
            use_project_settings: true,
            settings_file: None,
            only_resolve_selected_configs: false,
            configs_to_resolve: BTreeSet::new(),
            scopes: BTreeMap::new(),
            properties_files: Vec::new(),
            include_project_properties: true,
        }
    }
}

/// Everything the resolver needs to know about one module's settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveSettings {
    pub options: ResolveOptions,
    pub scopes: BTreeMap<String, DependencyScope>,
    pub detect_internal_modules: bool,
    pub detect_internal_modules_same_revision: bool,
    pub always_attach_sources: bool,
    pub always_attach_javadocs: bool,
    pub artifact_types: ArtifactTypeSettings,
}

impl Default for ResolveSettings {
    fn default() -> Self {
        Self::derive(&GeneralSettings::default(), None)
    }
}

impl ResolveSettings {
    /// Merge project-level settings with an optional module entry.
    ///
    /// Module scopes overlay project scopes. The module's configuration
    /// selection replaces the project one only when
    /// `only-resolve-selected-configs` is set.
    pub fn derive(general: &GeneralSettings, module: Option<&ModuleSettings>) -> Self {
        let mut scopes = general.scopes.clone();
        let mut confs = general.resolve_only_configs.clone();
        if let Some(m) = module {
            scopes.extend(m.scopes.iter().map(|(k, v)| (k.clone(), *v)));
            if m.only_resolve_selected_configs {
                confs = m.configs_to_resolve.clone();
            }
        }
        Self {
            options: ResolveOptions {
                confs,
                transitive: general.transitive,
                validate: general.validate,
                use_cache_only: general.cache_only,
            },
            scopes,
            detect_internal_modules: general.detect_internal_modules,
            detect_internal_modules_same_revision: general.detect_internal_modules_same_revision,
            always_attach_sources: general.always_attach_sources,
            always_attach_javadocs: general.always_attach_javadocs,
            artifact_types: general.artifact_types.clone(),
        }
    }

    /// Default scope of a configuration; unmapped configurations are `Compile`.
    pub fn scope_for(&self, configuration: &str) -> DependencyScope {
        self.scopes.get(configuration).copied().unwrap_or_default()
    }
}

/// Settings used to configure a resolution engine for one module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineSettings {
    /// Validated settings file location (path or URL), `None` for defaults.
    pub settings_file: Option<String>,
    pub properties: BTreeMap<String, String>,
    /// Base directory for relative paths: the module directory.
    pub base_dir: PathBuf,
    pub cache_dir: Option<String>,
}

/// Check a configured settings file location.
///
/// URLs are accepted as-is. A plain path must exist and must not be a
/// directory; a blank entry is an error because it was configured explicitly.
pub fn validate_settings_file(
    location: &str,
    base_dir: &Path,
    origin: SettingsLocation,
    module: Option<&str>,
) -> Result<String, DepsyncError> {
    let trimmed = location.trim();
    let scope_label = match (origin, module) {
        (SettingsLocation::Module, Some(m)) => format!("module settings for module {m}"),
        _ => "project settings".to_string(),
    };
    if trimmed.is_empty() {
        return Err(DepsyncError::SettingsNotFound {
            message: format!("No settings file specified in the {scope_label}."),
            location: origin,
            module: module.map(str::to_string),
        });
    }
    if depsync_util::fs::is_url(trimmed) {
        return Ok(trimmed.to_string());
    }
    let path = base_dir.join(trimmed);
    if !path.exists() {
        return Err(DepsyncError::SettingsNotFound {
            message: format!(
                "The settings file given in the {scope_label} does not exist: {}",
                path.display()
            ),
            location: origin,
            module: module.map(str::to_string),
        });
    }
    if path.is_dir() {
        return Err(DepsyncError::SettingsNotFound {
            message: format!(
                "The settings file given in the {scope_label} is a directory: {}",
                path.display()
            ),
            location: origin,
            module: module.map(str::to_string),
        });
    }
    Ok(path.to_string_lossy().into_owned())
}
