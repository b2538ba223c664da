//! Seams to the external resolution engine and to the project's module
//! registry.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use depsync_core::artifact::Artifact;
use depsync_core::coordinate::ModuleId;
use depsync_core::project::ModuleInfo;
use depsync_core::report::{ArtifactDownload, ModuleDescriptor, ResolveOptions, ResolveReport};
use depsync_core::settings::EngineSettings;
use depsync_util::errors::{Cause, DepsyncError};

/// Failure reported by a resolution engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("parse error: {0}")]
    Parse(#[source] Cause),
    #[error("I/O error: {0}")]
    Io(#[source] Cause),
}

impl EngineError {
    /// Attach the module and manifest the failure happened for.
    pub fn for_manifest(self, module: &str, manifest: &Path) -> DepsyncError {
        match self {
            Self::Parse(source) => DepsyncError::ManifestParse {
                module: module.to_string(),
                path: manifest.to_path_buf(),
                source,
            },
            Self::Io(source) => DepsyncError::ManifestIo {
                module: module.to_string(),
                path: manifest.to_path_buf(),
                source,
            },
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(Box::new(e))
    }
}

/// A configured resolution engine for one module.
pub trait ResolutionEngine: Send + Sync {
    fn parse_descriptor(&self, manifest: &Path) -> Result<ModuleDescriptor, EngineError>;

    fn resolve(
        &self,
        manifest: &Path,
        options: &ResolveOptions,
    ) -> Result<ResolveReport, EngineError>;

    /// Fetch a single artifact that was not part of a resolve report.
    fn download(&self, artifact: &Artifact) -> Result<ArtifactDownload, EngineError>;
}

/// Builds engines from per-module settings.
pub trait EngineFactory: Send + Sync {
    fn create(
        &self,
        module: &ModuleInfo,
        settings: &EngineSettings,
    ) -> Result<Arc<dyn ResolutionEngine>, DepsyncError>;
}

/// Hands out the engine and the parsed manifest of a module.
pub trait EngineProvider: Send + Sync {
    fn engine(&self, module: &ModuleInfo) -> Result<Arc<dyn ResolutionEngine>, DepsyncError>;

    /// Parsed manifest of `module`; errors are already attributed to it.
    fn descriptor(
        &self,
        module: &ModuleInfo,
        manifest: &Path,
    ) -> Result<ModuleDescriptor, DepsyncError>;
}

/// A project module that matched an external module id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMatch {
    pub name: String,
    /// Revision declared by the module's own manifest, if it could be read.
    pub revision: Option<String>,
}

/// Lookup of project modules by the (organisation, name) they publish.
pub trait ModuleRegistry: Send + Sync {
    fn find_module(&self, id: &ModuleId) -> Option<ModuleMatch>;
}

/// A registry that knows no modules.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoModules;

impl ModuleRegistry for NoModules {
    fn find_module(&self, _id: &ModuleId) -> Option<ModuleMatch> {
        None
    }
}
