//! # Build Configuration
//!
//! TOML configuration for one build run: graph/ontology versions, input
//! file pairs, output directory, and paths to the collaborator snapshots.

use canograph_core::{CanonError, IntegrityMode, pipeline::BuildPaths};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration of one canonicalization build.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    /// Version of the raw source graph being canonicalized.
    pub graph_version: String,
    /// Version of the ontology used for expansion and labels.
    pub ontology_version: String,

    /// Identity-oracle snapshot (JSON).
    pub synonymizer_file: PathBuf,
    /// Ontology-hierarchy snapshot (JSON).
    pub ontology_file: PathBuf,

    #[serde(default = "default_nodes_file")]
    pub nodes_file: PathBuf,
    #[serde(default = "default_nodes_header_file")]
    pub nodes_header_file: PathBuf,
    #[serde(default = "default_edges_file")]
    pub edges_file: PathBuf,
    #[serde(default = "default_edges_header_file")]
    pub edges_header_file: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Tolerate edge endpoints with no canonical mapping (test builds).
    #[serde(default)]
    pub permissive: bool,
}

fn default_nodes_file() -> PathBuf {
    PathBuf::from("nodes.tsv")
}

fn default_nodes_header_file() -> PathBuf {
    PathBuf::from("nodes_header.tsv")
}

fn default_edges_file() -> PathBuf {
    PathBuf::from("edges.tsv")
}

fn default_edges_header_file() -> PathBuf {
    PathBuf::from("edges_header.tsv")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

impl BuildConfig {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, CanonError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CanonError::Io(format!("cannot read config '{}': {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| CanonError::Serialization(e.to_string()))
    }

    /// Integrity mode implied by this configuration.
    #[must_use]
    pub fn integrity_mode(&self) -> IntegrityMode {
        if self.permissive {
            IntegrityMode::Permissive
        } else {
            IntegrityMode::Strict
        }
    }

    /// Input/output paths for the pipeline.
    #[must_use]
    pub fn build_paths(&self) -> BuildPaths {
        BuildPaths {
            nodes_file: self.nodes_file.clone(),
            nodes_header_file: self.nodes_header_file.clone(),
            edges_file: self.edges_file.clone(),
            edges_header_file: self.edges_header_file.clone(),
            output_dir: self.output_dir.clone(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
