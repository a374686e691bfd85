//! # Core Type Definitions
//!
//! This module contains all core types for the canonicalization engine:
//! - Raw records as loaded from delimited input (`RawNode`, `RawEdge`)
//! - Canonical records after identity resolution (`CanonicalNode`,
//!   `CanonicalEdge`)
//! - The tagged cell value produced by the loader (`PropertyValue`)
//! - Build metadata (`GraphMeta`)
//! - Error types (`CanonError`)
//!
//! ## Determinism Guarantees
//!
//! Canonical records live in `BTreeMap`s keyed by their identity, so every
//! pass over the graph iterates in the same order on every run. Mapping
//! fields use `serde_json`'s order-preserving map, so key order is insertion
//! order rather than hash order.

use crate::primitives::KEY_SEPARATOR;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Order-preserving JSON object, used for literature-info mappings.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

// =============================================================================
// COMPOSITE KEYS
// =============================================================================

/// Composite identity of a canonical edge: `subject--predicate--object`.
#[must_use]
pub fn composite_key(subject: &str, predicate: &str, object: &str) -> String {
    format!("{subject}{KEY_SEPARATOR}{predicate}{KEY_SEPARATOR}{object}")
}

/// Key for the unordered node-pair index: the two ids in lexicographic
/// order, joined with the key separator. `(a, b)` and `(b, a)` map to the
/// same key.
#[must_use]
pub fn node_pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}{KEY_SEPARATOR}{b}")
    } else {
        format!("{b}{KEY_SEPARATOR}{a}")
    }
}

// =============================================================================
// RAW RECORDS (loader output, canonicalizer input)
// =============================================================================

/// One node row of the raw input, loaded against the node schema.
///
/// Raw records are read-only after loading and are consumed (moved) by the
/// node canonicalizer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawNode {
    /// Source-level identifier, unique per input file.
    pub id: String,
    /// Human-readable name; absent names stay absent, never placeholdered.
    pub name: Option<String>,
    /// Primary category; carried through as absent when missing.
    pub category: Option<String>,
    pub iri: Option<String>,
    pub description: Option<String>,
    pub publications: Vec<String>,
}

/// One edge row of the raw input, loaded against the edge schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawEdge {
    pub id: String,
    pub subject: String,
    pub object: String,
    pub predicate: String,
    pub provided_by: Vec<String>,
    pub publications: Vec<String>,
    /// Literature-info mapping keyed by literature id, parsed defensively
    /// from a structured-text cell.
    pub publications_info: JsonMap,
}

// =============================================================================
// TAGGED CELL VALUE
// =============================================================================

/// A loaded cell value, tagged with the semantic type its schema field
/// declares. The discriminant always comes from the schema, never from
/// inspecting the content.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    TextList(Vec<String>),
    Mapping(JsonMap),
}

impl PropertyValue {
    /// Consume as text. Returns `None` for non-text values and for
    /// empty/whitespace-only text, so absent fields stay absent.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        }
    }

    /// Consume as a list. Non-list values yield an empty list.
    #[must_use]
    pub fn into_list(self) -> Vec<String> {
        match self {
            Self::TextList(items) => items,
            _ => Vec::new(),
        }
    }

    /// Consume as a mapping. Non-mapping values yield an empty mapping.
    #[must_use]
    pub fn into_mapping(self) -> JsonMap {
        match self {
            Self::Mapping(map) => map,
            _ => JsonMap::new(),
        }
    }
}

// =============================================================================
// CANONICAL RECORDS
// =============================================================================

/// The single deduplicated node standing in for a synonym group.
///
/// Created on first encounter of its preferred id; every further raw node
/// resolving to the same id is union-merged into it. Field order matches the
/// node schema so serialized documents and TSV columns line up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CanonicalNode {
    /// Preferred id — the unique key of the canonical node set.
    pub id: String,
    pub name: Option<String>,
    pub category: Option<String>,
    pub iri: Option<String>,
    /// Final description, chosen by the description selector.
    pub description: Option<String>,
    pub all_categories: Vec<String>,
    pub publications: Vec<String>,
    /// Every raw id collapsed into this node. Always contains `id` itself
    /// and every contributing raw id.
    pub equivalent_ids: Vec<String>,
    pub all_names: Vec<String>,
    pub expanded_categories: Vec<String>,
    /// Transient accumulator of candidate descriptions. Drained by the
    /// description selector and never serialized.
    #[serde(skip)]
    pub descriptions_list: Vec<String>,
}

/// The single merged edge standing in for all parallel raw edges with the
/// same remapped (subject, predicate, object).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CanonicalEdge {
    /// Dense numeric id, assigned once in a final pass over the edge set.
    pub id: u64,
    pub subject: String,
    pub object: String,
    pub predicate: String,
    pub provided_by: Vec<String>,
    pub publications: Vec<String>,
    /// Id of every raw edge merged into this one.
    pub source_ids: Vec<String>,
    pub publications_info: JsonMap,
}

impl CanonicalEdge {
    /// This edge's composite key.
    #[must_use]
    pub fn key(&self) -> String {
        composite_key(&self.subject, &self.predicate, &self.object)
    }

    /// This edge's unordered node-pair key.
    #[must_use]
    pub fn pair_key(&self) -> String {
        node_pair_key(&self.subject, &self.object)
    }
}

// =============================================================================
// BUILD METADATA
// =============================================================================

/// Metadata describing one build run, merged into the JSON documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GraphMeta {
    /// Version of the raw source graph this build canonicalized.
    pub graph_version: String,
    /// Version of the ontology used for category expansion and labels.
    pub ontology_version: String,
    /// Build date, rendered as `YYYY-MM-DD HH:MM`.
    pub build_date: String,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while building the canonical graph.
///
/// - Malformed input and integrity violations are fatal: the run aborts and
///   no artifact is written.
/// - Recoverable conditions (an unresolvable id, an unparsable mapping cell)
///   are not errors and never appear here.
#[derive(Debug, Error)]
pub enum CanonError {
    /// A column declared by the schema is absent from a header file.
    #[error("Column '{column}' declared by the schema is missing from {file}")]
    MissingColumn { column: String, file: String },

    /// A data row could not be read against the declared header.
    #[error("Malformed row {line} in {file}: {reason}")]
    MalformedRow {
        file: String,
        line: u64,
        reason: String,
    },

    /// An edge endpoint has no entry in the raw-to-canonical id map
    /// (strict mode only).
    #[error("Edge {edge_id} references endpoint {endpoint} with no canonical mapping")]
    UnmappedEndpoint { edge_id: String, endpoint: String },

    /// A finalized edge references a node that is not in the canonical set
    /// (strict mode only).
    #[error("Edge {key} references missing canonical node {node_id}")]
    DanglingEdge { key: String, node_id: String },

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

// =============================================================================
// TESTS
// =============================================================================
