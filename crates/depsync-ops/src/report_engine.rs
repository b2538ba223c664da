//! A resolution engine backed by reports exported from an external resolver.
//!
//! For a manifest `app/ivy.xml` the report is read from
//! `app/ivy.xml.report.json`. Artifacts are looked up in an Ivy-layout cache:
//! `[organisation]/[module]/[type]s/[artifact]-[revision](-[classifier]).[ext]`.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use depsync_core::artifact::Artifact;
use depsync_core::project::{dirs_path, ModuleInfo};
use depsync_core::report::{ArtifactDownload, ModuleDescriptor, ResolveOptions, ResolveReport};
use depsync_core::settings::EngineSettings;
use depsync_resolver::engine::{EngineError, EngineFactory, ResolutionEngine};
use depsync_util::errors::DepsyncError;

use crate::ivy_xml;

/// Suffix appended to a manifest path to find its exported report.
pub const REPORT_SUFFIX: &str = ".report.json";

pub fn report_path(manifest: &Path) -> PathBuf {
    let mut name = manifest.as_os_str().to_owned();
    name.push(REPORT_SUFFIX);
    PathBuf::from(name)
}

/// Location of `artifact` inside an Ivy-layout cache rooted at `cache_dir`.
pub fn cache_path(cache_dir: &Path, artifact: &Artifact) -> PathBuf {
    cache_dir
        .join(&artifact.module.organisation)
        .join(&artifact.module.name)
        .join(format!("{}s", artifact.artifact_type))
        .join(artifact.file_name())
}

/// Engine configured for one module.
#[derive(Debug, Clone)]
pub struct ReportFileEngine {
    cache_dir: PathBuf,
    properties: BTreeMap<String, String>,
}

impl ReportFileEngine {
    pub fn new(cache_dir: impl Into<PathBuf>, properties: BTreeMap<String, String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            properties,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn read(path: &Path) -> Result<String, EngineError> {
        std::fs::read_to_string(path).map_err(|e| {
            EngineError::Io(Box::new(io::Error::new(
                e.kind(),
                format!("{}: {e}", path.display()),
            )))
        })
    }

    /// Make every download point at an absolute file, filling in missing
    /// files from the cache when they are there.
    fn locate(&self, download: &mut ArtifactDownload) {
        match &download.local_file {
            Some(path) if path.is_relative() => {
                download.local_file = Some(self.cache_dir.join(path));
            }
            Some(_) => {}
            None => {
                let cached = cache_path(&self.cache_dir, &download.artifact);
                if cached.is_file() {
                    download.local_file = Some(cached);
                }
            }
        }
    }
}

impl ResolutionEngine for ReportFileEngine {
    fn parse_descriptor(&self, manifest: &Path) -> Result<ModuleDescriptor, EngineError> {
        let xml = Self::read(manifest)?;
        ivy_xml::parse_module_descriptor(&xml, &self.properties)
            .map_err(|e| EngineError::Parse(e.into()))
    }

    fn resolve(
        &self,
        manifest: &Path,
        options: &ResolveOptions,
    ) -> Result<ResolveReport, EngineError> {
        let path = report_path(manifest);
        let json = Self::read(&path)?;
        let mut report: ResolveReport = serde_json::from_str(&json).map_err(|e| {
            EngineError::Parse(format!("invalid report {}: {e}", path.display()).into())
        })?;

        if options.validate {
            let descriptor = self.parse_descriptor(manifest)?;
            for conf in report.configuration_names() {
                if !descriptor.configurations.iter().any(|c| c.name == conf) {
                    return Err(EngineError::Parse(
                        format!(
                            "report configuration '{conf}' is not declared in {}",
                            manifest.display()
                        )
                        .into(),
                    ));
                }
            }
        }
        if !options.confs.is_empty() {
            report
                .configurations
                .retain(|c| options.confs.contains(&c.configuration));
        }
        if !options.transitive {
            tracing::debug!(
                "Report {} is used as exported; transitive=false is not applied",
                path.display()
            );
        }

        for conf in &mut report.configurations {
            for dependency in &mut conf.dependencies {
                for download in &mut dependency.downloads {
                    self.locate(download);
                }
            }
        }
        Ok(report)
    }

    fn download(&self, artifact: &Artifact) -> Result<ArtifactDownload, EngineError> {
        let path = cache_path(&self.cache_dir, artifact);
        if !path.is_file() {
            return Err(EngineError::Io(Box::new(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not in the cache", artifact.file_name()),
            ))));
        }
        Ok(ArtifactDownload {
            artifact: artifact.clone(),
            local_file: Some(path),
        })
    }
}

/// Creates [`ReportFileEngine`]s from module engine settings.
///
/// The cache directory comes from the settings file's `<caches
/// defaultCacheDir>`, then the `cache-dir` setting, then `~/.depsync/cache`.
/// Relative directories are taken relative to the module directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReportFileEngineFactory;

impl ReportFileEngineFactory {
    fn settings_file(
        module: &ModuleInfo,
        settings: &EngineSettings,
    ) -> Result<Option<ivy_xml::SettingsFile>, DepsyncError> {
        let Some(location) = settings.settings_file.as_deref() else {
            return Ok(None);
        };
        let path = match location.strip_prefix("file://") {
            Some(local) => PathBuf::from(local),
            None if depsync_util::fs::is_url(location) => {
                tracing::warn!(
                    "Remote settings file {location} for module {} is not fetched",
                    module.name
                );
                return Ok(None);
            }
            None => PathBuf::from(location),
        };
        let xml = std::fs::read_to_string(&path).map_err(|e| DepsyncError::SettingsRead {
            path: path.clone(),
            module: module.name.clone(),
            message: e.to_string(),
        })?;
        ivy_xml::parse_settings(&xml, &settings.properties)
            .map(Some)
            .map_err(|message| DepsyncError::SettingsRead {
                path,
                module: module.name.clone(),
                message,
            })
    }
}

impl EngineFactory for ReportFileEngineFactory {
    fn create(
        &self,
        module: &ModuleInfo,
        settings: &EngineSettings,
    ) -> Result<Arc<dyn ResolutionEngine>, DepsyncError> {
        let file = Self::settings_file(module, settings)?;
        let mut properties = settings.properties.clone();
        let mut cache_dir = settings.cache_dir.clone();
        if let Some(file) = file {
            for (k, v) in file.properties {
                properties.entry(k).or_insert(v);
            }
            if file.default_cache_dir.is_some() {
                cache_dir = file.default_cache_dir;
            }
        }
        let cache_dir = match cache_dir {
            Some(dir) => settings.base_dir.join(dir),
            None => dirs_path().join("cache"),
        };
        tracing::debug!(
            "Module {} uses artifact cache {}",
            module.name,
            cache_dir.display()
        );
        Ok(Arc::new(ReportFileEngine::new(cache_dir, properties)))
    }
}
