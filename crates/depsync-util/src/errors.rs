use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Boxed underlying failure reported by an external collaborator.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Where a missing settings file was configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsLocation {
    Project,
    Module,
}

impl fmt::Display for SettingsLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project => write!(f, "project"),
            Self::Module => write!(f, "module"),
        }
    }
}

/// Unified error type for all depsync operations.
#[derive(Debug, Error, Diagnostic)]
pub enum DepsyncError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The module has no readable manifest.
    #[error("No manifest available for module '{module}'")]
    #[diagnostic(help("Set `manifest` for this module in depsync.toml or create the file"))]
    ManifestUnavailable {
        module: String,
        path: Option<PathBuf>,
    },

    /// The resolution engine could not parse the module manifest.
    #[error("Failed to parse manifest {} of module '{module}'", .path.display())]
    ManifestParse {
        module: String,
        path: PathBuf,
        #[source]
        source: Cause,
    },

    /// The resolution engine hit an I/O failure while resolving.
    #[error("I/O failure while resolving manifest {} of module '{module}'", .path.display())]
    ManifestIo {
        module: String,
        path: PathBuf,
        #[source]
        source: Cause,
    },

    /// A configured settings or properties file does not exist.
    #[error("{message}")]
    #[diagnostic(help("Check the settings-file and properties-files entries in depsync.toml"))]
    SettingsNotFound {
        message: String,
        location: SettingsLocation,
        module: Option<String>,
    },

    /// A settings or properties file exists but could not be read.
    #[error("Failed to read settings file {} for module '{module}': {message}", .path.display())]
    SettingsRead {
        path: PathBuf,
        module: String,
        message: String,
    },

    /// Invalid or malformed depsync.toml or global config.
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check your depsync.toml for syntax errors"))]
    Config { message: String },

    /// Configurations extend each other in a cycle.
    #[error("Cyclic configuration inheritance: {}", .cycle.join(" -> "))]
    CyclicConfiguration { cycle: Vec<String> },

    /// The project model has no module with this name.
    #[error("Unknown module '{module}'")]
    UnknownModule { module: String },

    /// Another writer already holds the modifiable model of this module.
    #[error("The project model of module '{module}' is already being modified")]
    ModelBusy { module: String },

    /// Project model mutation or persistence failed.
    #[error("Project model error: {message}")]
    Model { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}
