//! Dependencies produced by resolution.
//!
//! An external dependency is a local artifact file that ends up as a library
//! root; an internal dependency is another module of the same project.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use depsync_core::artifact::{Artifact, ArtifactCategory};
use depsync_core::coordinate::ModuleRevisionId;
use depsync_core::scope::DependencyScope;

/// Identity of an external dependency: its module revision and category.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExternalKey {
    pub id: ModuleRevisionId,
    pub category: ArtifactCategory,
}

/// A resolved artifact file belonging to a third-party module revision.
///
/// Equality and hashing use [`ExternalKey`] only.
#[derive(Debug, Clone)]
pub struct ExternalDependency {
    artifact: Artifact,
    local_file: PathBuf,
    category: ArtifactCategory,
    /// `None` for auxiliary sources/javadoc roots, which take the scope of
    /// the library they are attached to.
    scope: Option<DependencyScope>,
}

impl ExternalDependency {
    pub fn new(
        artifact: Artifact,
        local_file: impl Into<PathBuf>,
        category: ArtifactCategory,
        scope: Option<DependencyScope>,
    ) -> Self {
        Self {
            artifact,
            local_file: local_file.into(),
            category,
            scope,
        }
    }

    pub fn id(&self) -> &ModuleRevisionId {
        &self.artifact.module
    }

    pub fn key(&self) -> ExternalKey {
        ExternalKey {
            id: self.artifact.module.clone(),
            category: self.category,
        }
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    pub fn local_file(&self) -> &Path {
        &self.local_file
    }

    pub fn category(&self) -> ArtifactCategory {
        self.category
    }

    pub fn scope(&self) -> Option<DependencyScope> {
        self.scope
    }

    /// Canonical `org:name:rev` name of the owning module revision.
    pub fn canonical_name(&self) -> String {
        self.artifact.module.to_string()
    }
}

impl PartialEq for ExternalDependency {
    fn eq(&self, other: &Self) -> bool {
        self.artifact.module == other.artifact.module && self.category == other.category
    }
}

impl Eq for ExternalDependency {}

impl Hash for ExternalDependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.artifact.module.hash(state);
        self.category.hash(state);
    }
}

impl PartialOrd for ExternalDependency {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExternalDependency {
    fn cmp(&self, other: &Self) -> Ordering {
        self.artifact
            .module
            .cmp(&other.artifact.module)
            .then(self.category.cmp(&other.category))
    }
}

/// A dependency on another module of the same project.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InternalDependency {
    pub module: String,
    pub scope: DependencyScope,
}

impl InternalDependency {
    pub fn new(module: impl Into<String>, scope: DependencyScope) -> Self {
        Self {
            module: module.into(),
            scope,
        }
    }
}

/// Either kind of resolved dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedDependency {
    External(ExternalDependency),
    Internal(InternalDependency),
}

impl ResolvedDependency {
    pub fn scope(&self) -> Option<DependencyScope> {
        match self {
            Self::External(d) => d.scope(),
            Self::Internal(d) => Some(d.scope),
        }
    }
}

impl From<ExternalDependency> for ResolvedDependency {
    fn from(d: ExternalDependency) -> Self {
        Self::External(d)
    }
}

impl From<InternalDependency> for ResolvedDependency {
    fn from(d: InternalDependency) -> Self {
        Self::Internal(d)
    }
}
