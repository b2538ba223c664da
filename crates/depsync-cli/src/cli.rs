//! CLI argument definitions.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "depsync",
    version,
    about = "Sync Ivy-resolved dependencies into a project model",
    long_about = "depsync resolves the Ivy configurations of every module in a project and \
                  keeps each module's libraries and module dependencies in step with the result."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve modules and update their dependencies
    Sync {
        /// Modules to sync (default: every module with a manifest)
        modules: Vec<String>,
    },

    /// Create a module's manifest from the configured ivy template
    Init {
        /// Module to create the manifest for
        module: String,
    },

    /// Remove every managed library from the project model
    Clean,

    /// Show the dependencies currently recorded for each module
    Status,

    /// Re-sync modules whenever their manifest, report or settings change
    Watch,
}

pub fn parse() -> Cli {
    Cli::parse()
}
