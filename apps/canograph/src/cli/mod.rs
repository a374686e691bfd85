//! # Canograph CLI Module
//!
//! This module implements the CLI interface for Canograph.
//!
//! ## Available Commands
//!
//! - `build` - Run a full canonicalization build from a TOML config
//! - `lookup` - Read a node or the edges between two nodes from a built store

mod commands;

use canograph_core::CanonError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Canograph - Canonical Graph Builder
///
/// Collapses a raw knowledge graph into its canonical, synonym-merged form
/// and emits it as JSON documents, an embedded store, and bulk-load TSVs.
#[derive(Parser, Debug)]
#[command(name = "canograph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress the configuration summary
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a full canonicalization build
    Build {
        /// Path to the build configuration file
        #[arg(short, long, default_value = "canograph.toml")]
        config: PathBuf,
    },

    /// Look up records in a built store
    Lookup {
        /// Path to the store artifact
        #[arg(short, long)]
        store: PathBuf,

        /// Canonical node id to fetch
        #[arg(short, long)]
        node: Option<String>,

        /// Two node ids, comma-separated, to list the edges between
        #[arg(short, long)]
        between: Option<String>,
    },
}

/// Execute the parsed CLI command.
pub fn execute(cli: Cli) -> Result<(), CanonError> {
    match cli.command {
        Commands::Build { config } => cmd_build(&config, cli.quiet, cli.json_mode),
        Commands::Lookup {
            store,
            node,
            between,
        } => cmd_lookup(&store, node.as_deref(), between.as_deref(), cli.json_mode),
    }
}
