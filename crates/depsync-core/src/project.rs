//! Project layout: `depsync.toml`, the optional global config and the
//! modules they declare.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use depsync_util::errors::{DepsyncError, SettingsLocation};

use crate::properties;
use crate::settings::{
    validate_settings_file, EngineSettings, GeneralSettings, ModuleSettings, ResolveSettings,
};

/// File name of the project configuration.
pub const PROJECT_FILE: &str = "depsync.toml";

/// Contents of `depsync.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectConfig {
    /// Use `[settings]` from the global config instead of this file.
    #[serde(default)]
    pub use_global_settings: bool,
    #[serde(default)]
    pub settings: GeneralSettings,
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleSettings>,
}

impl ProjectConfig {
    pub fn from_path(path: &Path) -> Result<Self, DepsyncError> {
        let content = std::fs::read_to_string(path).map_err(|e| DepsyncError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::from_str(&content)
    }

    pub fn from_str(content: &str) -> Result<Self, DepsyncError> {
        toml::from_str(content).map_err(|e| DepsyncError::Config {
            message: format!("Failed to parse {PROJECT_FILE}: {e}"),
        })
    }
}

/// Global user configuration loaded from `~/.depsync/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub settings: GeneralSettings,
}

impl GlobalConfig {
    /// Load the global configuration, or return defaults if the file doesn't exist.
    pub fn load() -> Result<Self, DepsyncError> {
        let path = Self::default_path();
        if path.is_file() {
            let content = std::fs::read_to_string(&path).map_err(|e| DepsyncError::Config {
                message: format!("Failed to read global config: {e}"),
            })?;
            toml::from_str(&content).map_err(|e| DepsyncError::Config {
                message: format!("Failed to parse global config: {e}"),
            })
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the depsync data directory (`~/.depsync/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".depsync")
}

/// A module of the project with paths made absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub name: String,
    pub dir: PathBuf,
    /// Configured manifest path; may not exist on disk.
    pub manifest: Option<PathBuf>,
    pub organisation: Option<String>,
}

impl ModuleInfo {
    /// The manifest, only if it is an existing file.
    pub fn manifest_file(&self) -> Option<&Path> {
        self.manifest.as_deref().filter(|p| p.is_file())
    }
}

/// A loaded project: its root directory and configuration.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config: ProjectConfig,
    pub global: GlobalConfig,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, config: ProjectConfig) -> Self {
        Self {
            root: root.into(),
            config,
            global: GlobalConfig::default(),
        }
    }

    /// Find `depsync.toml` in `start` or one of its parents and load it.
    pub fn discover(start: &Path) -> Result<Self, DepsyncError> {
        let root = depsync_util::fs::find_ancestor_with(start, PROJECT_FILE).ok_or_else(|| {
            DepsyncError::Config {
                message: format!("Could not find {PROJECT_FILE} in current or parent directories"),
            }
        })?;
        let config = ProjectConfig::from_path(&root.join(PROJECT_FILE))?;
        // loaded either way: the ivy template falls back to it
        let global = GlobalConfig::load()?;
        Ok(Self {
            root,
            config,
            global,
        })
    }

    /// The general settings in effect for this project.
    pub fn general(&self) -> &GeneralSettings {
        if self.config.use_global_settings {
            &self.global.settings
        } else {
            &self.config.settings
        }
    }

    pub fn module_settings(&self, name: &str) -> Option<&ModuleSettings> {
        self.config.modules.iter().find(|m| m.name == name)
    }

    pub fn modules(&self) -> Vec<ModuleInfo> {
        self.config
            .modules
            .iter()
            .map(|m| self.module_info(m))
            .collect()
    }

    pub fn module(&self, name: &str) -> Result<ModuleInfo, DepsyncError> {
        self.module_settings(name)
            .map(|m| self.module_info(m))
            .ok_or_else(|| DepsyncError::UnknownModule {
                module: name.to_string(),
            })
    }

    fn module_info(&self, m: &ModuleSettings) -> ModuleInfo {
        let dir = self.root.join(&m.dir);
        let manifest = (!m.manifest.trim().is_empty()).then(|| dir.join(m.manifest.trim()));
        ModuleInfo {
            name: m.name.clone(),
            dir,
            manifest,
            organisation: m.organisation.clone(),
        }
    }

    /// Manifest template for new modules.
    ///
    /// The project's `ivy-template` (relative to the root) wins; otherwise
    /// the global one (relative to `~/.depsync/`) is used. With
    /// `use-global-settings` only the global template counts.
    pub fn ivy_template(&self) -> Option<PathBuf> {
        let project = if self.config.use_global_settings {
            None
        } else {
            self.config
                .settings
                .ivy_template
                .as_deref()
                .map(|t| self.root.join(t))
        };
        project.or_else(|| {
            self.global
                .settings
                .ivy_template
                .as_deref()
                .map(|t| dirs_path().join(t))
        })
    }

    /// Local files the engine of `module` is configured from: its settings
    /// file and every properties file that feeds it. Remote settings files
    /// are left out; missing files are included.
    pub fn engine_inputs(&self, module: &str) -> Vec<PathBuf> {
        let Some(m) = self.module_settings(module) else {
            return Vec::new();
        };
        let general = self.general();
        let module_dir = self.root.join(&m.dir);

        let settings_file = if m.use_project_settings {
            general
                .settings_file
                .as_deref()
                .and_then(|loc| local_path(loc, &self.root))
        } else {
            m.settings_file
                .as_deref()
                .and_then(|loc| local_path(loc, &module_dir))
        };

        let mut inputs: Vec<PathBuf> = settings_file.into_iter().collect();
        inputs.extend(m.properties_files.iter().map(|f| module_dir.join(f)));
        if m.include_project_properties {
            inputs.extend(general.properties_files.iter().map(|f| self.root.join(f)));
        }
        inputs
    }

    pub fn resolve_settings(&self, module: &str) -> ResolveSettings {
        ResolveSettings::derive(self.general(), self.module_settings(module))
    }

    /// Engine settings for `module`: validated settings file and merged
    /// properties.
    ///
    /// Module properties files come first (and win); project properties
    /// files follow when `include-project-properties` is set.
    pub fn engine_settings(&self, module: &str) -> Result<EngineSettings, DepsyncError> {
        let m = self
            .module_settings(module)
            .ok_or_else(|| DepsyncError::UnknownModule {
                module: module.to_string(),
            })?;
        let general = self.general();
        let module_dir = self.root.join(&m.dir);

        let settings_file = if m.use_project_settings {
            general
                .settings_file
                .as_deref()
                .map(|loc| {
                    validate_settings_file(loc, &self.root, SettingsLocation::Project, None)
                })
                .transpose()?
        } else {
            m.settings_file
                .as_deref()
                .map(|loc| {
                    validate_settings_file(
                        loc,
                        &module_dir,
                        SettingsLocation::Module,
                        Some(module),
                    )
                })
                .transpose()?
        };

        let mut props = properties::load_properties(module, &module_dir, &m.properties_files)?;
        if m.include_project_properties {
            let project_props =
                properties::load_properties(module, &self.root, &general.properties_files)?;
            for (k, v) in project_props {
                props.entry(k).or_insert(v);
            }
        }

        let cache_dir = general
            .cache_dir
            .as_deref()
            .map(|dir| properties::interpolate(dir, &props));

        Ok(EngineSettings {
            settings_file,
            properties: props,
            base_dir: module_dir,
            cache_dir,
        })
    }
}

fn local_path(location: &str, base_dir: &Path) -> Option<PathBuf> {
    let location = location.trim();
    if location.is_empty() {
        return None;
    }
    match location.strip_prefix("file://") {
        Some(local) => Some(PathBuf::from(local)),
        None if depsync_util::fs::is_url(location) => None,
        None => Some(base_dir.join(location)),
    }
}
