use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a dependency is visible to the consuming module.
///
/// Variants are ordered by increasing breadth, so `Compile < Runtime <
/// Provided < Test`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyScope {
    Compile,
    Runtime,
    Provided,
    Test,
}

impl Default for DependencyScope {
    fn default() -> Self {
        Self::Compile
    }
}

impl DependencyScope {
    pub const ALL: [DependencyScope; 4] = [
        DependencyScope::Compile,
        DependencyScope::Runtime,
        DependencyScope::Provided,
        DependencyScope::Test,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Runtime => "runtime",
            Self::Provided => "provided",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for DependencyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependencyScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compile" => Ok(Self::Compile),
            "runtime" => Ok(Self::Runtime),
            "provided" => Ok(Self::Provided),
            "test" => Ok(Self::Test),
            other => Err(format!("unknown dependency scope '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_by_breadth() {
        assert!(DependencyScope::Compile < DependencyScope::Runtime);
        assert!(DependencyScope::Runtime < DependencyScope::Provided);
        assert!(DependencyScope::Provided < DependencyScope::Test);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("TEST".parse::<DependencyScope>(), Ok(DependencyScope::Test));
        assert_eq!(
            " runtime ".parse::<DependencyScope>(),
            Ok(DependencyScope::Runtime)
        );
        assert!("system".parse::<DependencyScope>().is_err());
    }
}
