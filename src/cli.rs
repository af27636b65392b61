use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// softshelf - a software catalog over the system package manager
#[derive(Parser)]
#[command(name = "softshelf")]
#[command(about = "List, install, remove, and update a curated catalog of software packages")]
#[command(version)]
pub struct Cli {
    /// Path to the catalog file.
    ///
    /// A missing or malformed catalog is not an error: the built-in
    /// default catalog is used instead.
    #[arg(long, global = true, default_value = "packages.json")]
    pub catalog: PathBuf,

    /// Number of worker threads for running package-manager commands
    #[arg(long, global = true, default_value_t = 4)]
    pub workers: usize,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show every catalog package with its install state
    List,
    /// Show catalog packages whose name or description matches a query
    Search {
        /// Case-insensitive substring to match
        query: String,
    },
    /// Probe one package's install state
    Status {
        /// Package name as listed in the catalog
        name: String,
    },
    /// Install a package
    Install {
        /// Package name as listed in the catalog
        name: String,
    },
    /// Remove an installed package
    Remove {
        /// Package name as listed in the catalog
        name: String,
    },
    /// Update an installed package
    Update {
        /// Package name as listed in the catalog
        name: String,
    },
    /// Strictly validate a catalog file (no fallback)
    Validate {
        /// Path to the catalog file to validate
        path: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
