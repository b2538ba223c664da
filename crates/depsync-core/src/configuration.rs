use serde::{Deserialize, Serialize};

/// A named, inheritable grouping of dependencies declared in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Replacement hint when the configuration is deprecated.
    #[serde(default)]
    pub deprecated: Option<String>,
    /// Names of the configurations this one includes.
    #[serde(default)]
    pub extends: Vec<String>,
}

impl Configuration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            deprecated: None,
            extends: Vec::new(),
        }
    }

    /// Builder-style helper used mostly by tests and report fixtures.
    pub fn extending<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extends.extend(parents.into_iter().map(Into::into));
        self
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated.is_some()
    }
}
