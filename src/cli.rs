// src/cli.rs
//! CLI definitions for the specwright tool
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "specwright")]
#[command(author = "Specwright Contributors")]
#[command(version)]
#[command(about = "Parse, validate and reformat declarative package-build metadata", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a spec document and its embedded build options
    Check {
        /// Path to the spec document
        file: PathBuf,
    },

    /// Regenerate a spec document in canonical form
    Format {
        /// Path to the spec document
        file: PathBuf,

        /// Render %files sections inline after each package
        #[arg(long)]
        inline_files: bool,

        /// Sort tags by their fixed precedence
        #[arg(long)]
        sort_tags: bool,

        /// Group dependencies by kind and condition
        #[arg(long)]
        sort_deps: bool,

        /// Order scripts by build phase
        #[arg(long)]
        sort_scripts: bool,

        /// Rewrite the file instead of printing to stdout
        #[arg(short, long)]
        in_place: bool,
    },

    /// Extract and parse the build-option fragment of a document
    Options {
        /// Path to the spec document
        file: PathBuf,

        /// Print the parsed configuration as JSON instead of canonical text
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
