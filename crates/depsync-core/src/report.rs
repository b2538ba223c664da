//! Resolution report types produced by an external resolution engine.
//!
//! A report lists, per resolved configuration, the module revisions that
//! resolved (with the artifacts downloaded for each) and the dependencies
//! that could not be resolved.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::artifact::Artifact;
use crate::configuration::Configuration;
use crate::coordinate::ModuleRevisionId;

/// Options passed to the engine for a single resolve call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveOptions {
    /// Configurations to resolve; empty means all of them.
    pub confs: BTreeSet<String>,
    pub transitive: bool,
    pub validate: bool,
    pub use_cache_only: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            confs: BTreeSet::new(),
            transitive: true,
            validate: false,
            use_cache_only: false,
        }
    }
}

/// The parsed identity and configurations of a module manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub id: ModuleRevisionId,
    #[serde(default)]
    pub configurations: Vec<Configuration>,
}

/// Outcome of downloading a single artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDownload {
    pub artifact: Artifact,
    /// Local file the engine materialized, if any.
    #[serde(default)]
    pub local_file: Option<PathBuf>,
}

impl ArtifactDownload {
    pub fn local_file(&self) -> Option<&Path> {
        self.local_file.as_deref()
    }
}

/// A module revision that resolved within a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedModule {
    pub id: ModuleRevisionId,
    /// Artifacts downloaded for this configuration.
    #[serde(default)]
    pub downloads: Vec<ArtifactDownload>,
    /// Every artifact declared by the module's own descriptor, including
    /// those that were not selected by the configuration.
    #[serde(default)]
    pub declared_artifacts: Vec<Artifact>,
}

/// A dependency the engine could not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedDependency {
    pub id: ModuleRevisionId,
    pub message: String,
    #[serde(default)]
    pub cause: Option<String>,
}

/// Resolution results for one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationReport {
    pub configuration: String,
    #[serde(default)]
    pub dependencies: Vec<ResolvedModule>,
    #[serde(default)]
    pub unresolved: Vec<UnresolvedDependency>,
}

impl ConfigurationReport {
    pub fn new(configuration: impl Into<String>) -> Self {
        Self {
            configuration: configuration.into(),
            dependencies: Vec::new(),
            unresolved: Vec::new(),
        }
    }
}

/// The full report of one resolve call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveReport {
    #[serde(default)]
    pub configurations: Vec<ConfigurationReport>,
}

impl ResolveReport {
    /// Configuration names in report order.
    pub fn configuration_names(&self) -> Vec<String> {
        self.configurations
            .iter()
            .map(|c| c.configuration.clone())
            .collect()
    }

    pub fn configuration(&self, name: &str) -> Option<&ConfigurationReport> {
        self.configurations.iter().find(|c| c.configuration == name)
    }

    /// Every artifact that was downloaded in any configuration.
    pub fn all_artifacts(&self) -> BTreeSet<&Artifact> {
        self.configurations
            .iter()
            .flat_map(|c| c.dependencies.iter())
            .flat_map(|d| d.downloads.iter())
            .map(|dl| &dl.artifact)
            .collect()
    }
}
