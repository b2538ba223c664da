use std::fmt;

use serde::{Deserialize, Serialize};

/// Organisation and name of a module, without revision.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModuleId {
    pub organisation: String,
    pub name: String,
}

impl ModuleId {
    pub fn new(organisation: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            organisation: organisation.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.organisation, self.name)
    }
}

/// A module at a specific revision: `organisation:name:revision`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModuleRevisionId {
    pub organisation: String,
    pub name: String,
    pub revision: String,
}

impl ModuleRevisionId {
    pub fn new(
        organisation: impl Into<String>,
        name: impl Into<String>,
        revision: impl Into<String>,
    ) -> Self {
        Self {
            organisation: organisation.into(),
            name: name.into(),
            revision: revision.into(),
        }
    }

    /// Parse `"organisation:name:revision"`.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [org, name, rev] if !org.is_empty() && !name.is_empty() => {
                Some(Self::new(*org, *name, *rev))
            }
            _ => None,
        }
    }

    pub fn module_id(&self) -> ModuleId {
        ModuleId::new(self.organisation.clone(), self.name.clone())
    }
}

impl fmt::Display for ModuleRevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.organisation, self.name, self.revision)
    }
}
