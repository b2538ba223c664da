use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coordinate::ModuleRevisionId;

/// A file published by a module revision (a jar, a sources archive, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Artifact {
    pub module: ModuleRevisionId,
    pub name: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub ext: String,
    #[serde(default)]
    pub classifier: Option<String>,
}

impl Artifact {
    pub fn new(
        module: ModuleRevisionId,
        name: impl Into<String>,
        artifact_type: impl Into<String>,
        ext: impl Into<String>,
    ) -> Self {
        Self {
            module,
            name: name.into(),
            artifact_type: artifact_type.into(),
            ext: ext.into(),
            classifier: None,
        }
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// `name-revision[-classifier].ext`
    pub fn file_name(&self) -> String {
        match &self.classifier {
            Some(c) => format!("{}-{}-{c}.{}", self.name, self.module.revision, self.ext),
            None => format!("{}-{}.{}", self.name, self.module.revision, self.ext),
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}.{}({})", self.module, self.name, self.ext, self.artifact_type)
    }
}

/// Which library root an artifact attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactCategory {
    Classes,
    Sources,
    Javadoc,
}

impl ArtifactCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classes => "classes",
            Self::Sources => "sources",
            Self::Javadoc => "javadoc",
        }
    }
}

impl fmt::Display for ArtifactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Artifact type names recognised for each category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactTypeSettings {
    pub classes: BTreeSet<String>,
    pub sources: BTreeSet<String>,
    pub javadoc: BTreeSet<String>,
}

impl Default for ArtifactTypeSettings {
    fn default() -> Self {
        fn set(items: &[&str]) -> BTreeSet<String> {
            items.iter().map(|s| s.to_string()).collect()
        }
        Self {
            classes: set(&["jar", "mar", "sar", "war", "ear", "ejb", "bundle", "test-jar"]),
            sources: set(&["source", "src", "sources"]),
            javadoc: set(&["javadoc", "doc", "docs", "apidoc"]),
        }
    }
}

impl ArtifactTypeSettings {
    /// Category for an artifact type, or `None` when the type is not listed.
    ///
    /// Sources and javadoc win over classes when a type is listed twice.
    pub fn category_of(&self, artifact_type: &str) -> Option<ArtifactCategory> {
        let t = artifact_type.trim().to_ascii_lowercase();
        if self.sources.contains(&t) {
            Some(ArtifactCategory::Sources)
        } else if self.javadoc.contains(&t) {
            Some(ArtifactCategory::Javadoc)
        } else if self.classes.contains(&t) {
            Some(ArtifactCategory::Classes)
        } else {
            None
        }
    }

    pub fn categorize(&self, artifact: &Artifact) -> Option<ArtifactCategory> {
        self.category_of(&artifact.artifact_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(kind: &str, ext: &str) -> Artifact {
        Artifact::new(ModuleRevisionId::new("org", "lib", "1.0"), "lib", kind, ext)
    }

    #[test]
    fn default_categories() {
        let settings = ArtifactTypeSettings::default();
        assert_eq!(
            settings.categorize(&artifact("jar", "jar")),
            Some(ArtifactCategory::Classes)
        );
        assert_eq!(
            settings.categorize(&artifact("source", "jar")),
            Some(ArtifactCategory::Sources)
        );
        assert_eq!(
            settings.categorize(&artifact("javadoc", "jar")),
            Some(ArtifactCategory::Javadoc)
        );
        assert_eq!(settings.categorize(&artifact("pom", "pom")), None);
    }

    #[test]
    fn file_name_with_classifier() {
        let mut a = artifact("source", "jar");
        assert_eq!(a.file_name(), "lib-1.0.jar");
        a.classifier = Some("sources".into());
        assert_eq!(a.file_name(), "lib-1.0-sources.jar");
    }
}
