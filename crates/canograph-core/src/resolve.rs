//! # Collaborator Boundaries
//!
//! Traits for the external services the engine consumes as black boxes:
//! the identity-resolution oracle, the ontology hierarchy service, and the
//! description-quality scorer.
//!
//! The engine never reimplements these services; it talks to them through
//! the traits below. Table-backed implementations loadable from local JSON
//! snapshots are provided so batch builds can run against a pinned snapshot
//! of the oracle's state.

use crate::types::CanonError;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

// =============================================================================
// IDENTITY-RESOLUTION ORACLE
// =============================================================================

/// The preferred identity the oracle reports for a raw id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentityBundle {
    pub preferred_id: String,
    pub preferred_name: Option<String>,
    pub preferred_category: String,
    pub all_categories: Vec<String>,
    pub expanded_categories: Vec<String>,
}

/// Maps raw ids to preferred identities and synonym sets.
///
/// Both operations are bulk calls: the node canonicalizer submits every raw
/// id in one `resolve_batch` and every preferred id in one
/// `equivalent_sets`, bounding round-trip cost. Ids unknown to the oracle
/// are simply absent from the returned maps — that is not an error.
pub trait IdentityOracle {
    /// Resolve raw ids to preferred-identity bundles.
    fn resolve_batch(
        &self,
        ids: &[String],
    ) -> Result<BTreeMap<String, IdentityBundle>, CanonError>;

    /// Full synonym set for each preferred id the oracle has a record of.
    fn equivalent_sets(
        &self,
        preferred_ids: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, BTreeSet<String>>, CanonError>;
}

// =============================================================================
// ONTOLOGY HIERARCHY SERVICE
// =============================================================================

/// Expands a category set to its ancestor closure, mixins excluded.
pub trait OntologyHierarchy {
    /// Ancestor closure of the given categories (the categories themselves
    /// included), with mixin ancestors filtered out.
    fn ancestors(&self, categories: &[String]) -> Result<Vec<String>, CanonError>;
}

// =============================================================================
// DESCRIPTION-QUALITY SCORER
// =============================================================================

/// Chooses the best description out of a candidate list.
///
/// This is an extension point for an external model-backed scorer; the crate
/// ships no implementation. Selection through a scorer is not guaranteed
/// deterministic across scorer versions.
pub trait DescriptionScorer: Sync {
    fn best(&self, candidates: &[String]) -> Option<String>;
}

// =============================================================================
// TABLE-BACKED IMPLEMENTATIONS
// =============================================================================

/// Identity oracle backed by in-memory tables, loadable from a JSON
/// snapshot: `{"identities": {raw id: bundle}, "equivalents": {preferred id:
/// [ids]}}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableOracle {
    #[serde(default)]
    identities: BTreeMap<String, IdentityBundle>,
    #[serde(default)]
    equivalents: BTreeMap<String, BTreeSet<String>>,
}

impl TableOracle {
    /// Build from explicit tables (used by tests and embedders).
    #[must_use]
    pub fn from_tables(
        identities: BTreeMap<String, IdentityBundle>,
        equivalents: BTreeMap<String, BTreeSet<String>>,
    ) -> Self {
        Self {
            identities,
            equivalents,
        }
    }

    /// Load a snapshot file produced by the synonymizer export.
    pub fn from_json_file(path: &Path) -> Result<Self, CanonError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CanonError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| CanonError::Serialization(e.to_string()))
    }
}

impl IdentityOracle for TableOracle {
    fn resolve_batch(
        &self,
        ids: &[String],
    ) -> Result<BTreeMap<String, IdentityBundle>, CanonError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.identities.get(id).map(|b| (id.clone(), b.clone())))
            .collect())
    }

    fn equivalent_sets(
        &self,
        preferred_ids: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, BTreeSet<String>>, CanonError> {
        Ok(preferred_ids
            .iter()
            .filter_map(|id| self.equivalents.get(id).map(|s| (id.clone(), s.clone())))
            .collect())
    }
}

/// Ontology hierarchy backed by in-memory tables, loadable from a JSON
/// snapshot: `{"ancestors": {category: [ancestors]}, "mixins": [categories]}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableHierarchy {
    #[serde(default)]
    ancestors: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    mixins: BTreeSet<String>,
}

impl TableHierarchy {
    /// Build from explicit tables (used by tests and embedders).
    #[must_use]
    pub fn from_tables(
        ancestors: BTreeMap<String, Vec<String>>,
        mixins: BTreeSet<String>,
    ) -> Self {
        Self { ancestors, mixins }
    }

    /// Load a snapshot file produced by the ontology export.
    pub fn from_json_file(path: &Path) -> Result<Self, CanonError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CanonError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| CanonError::Serialization(e.to_string()))
    }
}

impl OntologyHierarchy for TableHierarchy {
    fn ancestors(&self, categories: &[String]) -> Result<Vec<String>, CanonError> {
        let mut closure: Vec<String> = Vec::new();
        for category in categories {
            push_non_mixin(&mut closure, category, &self.mixins);
            if let Some(ancestors) = self.ancestors.get(category) {
                for ancestor in ancestors {
                    push_non_mixin(&mut closure, ancestor, &self.mixins);
                }
            }
        }
        Ok(closure)
    }
}

fn push_non_mixin(closure: &mut Vec<String>, category: &str, mixins: &BTreeSet<String>) {
    if !mixins.contains(category) && !closure.iter().any(|c| c == category) {
        closure.push(category.to_string());
    }
}

// =============================================================================
// TESTS
// =============================================================================
