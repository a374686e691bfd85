//! # canograph-core
//!
//! The canonicalization engine for Canograph - THE LOGIC.
//!
//! This crate collapses a raw, source-level biomedical knowledge graph into
//! a deduplicated, synonym-merged canonical graph, then emits that graph in
//! every supported artifact format: full JSON, lite JSON, an embedded
//! indexed store, and bulk-load TSV pairs.
//!
//! ## Stages
//!
//! 1. **Loader** — delimited files + header declarations -> typed records
//! 2. **Node canonicalizer** — identity resolution and attribute merging
//! 3. **Edge canonicalizer** — endpoint remapping, parallel-edge merging,
//!    self-loop pruning
//! 4. **Description selector** — data-parallel best-description reduction
//! 5. **Serializer** — all artifacts, written only after the graph is final
//!
//! ## Architectural Constraints
//!
//! - Pure Rust: no async, no network dependencies
//! - Deterministic: BTreeMap-keyed state, pinned list order, no floats
//! - Collaborators (identity oracle, ontology hierarchy, description
//!   scorer) enter only through the traits in [`resolve`]
//! - Output is all-or-nothing per run; there are no partial artifacts

// =============================================================================
// MODULES
// =============================================================================

pub mod canon;
pub mod descriptions;
pub mod export;
pub mod formats;
pub mod loader;
pub mod pipeline;
pub mod primitives;
pub mod resolve;
pub mod schema;
pub mod storage;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    CanonError, CanonicalEdge, CanonicalNode, GraphMeta, JsonMap, PropertyValue, RawEdge, RawNode,
    composite_key, node_pair_key,
};

// =============================================================================
// RE-EXPORTS: Engine Stages
// =============================================================================

pub use canon::{IntegrityMode, canonicalize_edges, canonicalize_nodes, merge_unique};
pub use descriptions::{SelectionStrategy, select_descriptions};
pub use loader::{ParseErrorLog, ParseFailure, load_edges, load_nodes, read_header};
pub use pipeline::{BuildPaths, BuildReport, run};
pub use schema::{FieldKind, FieldSpec, Schema};

// =============================================================================
// RE-EXPORTS: Collaborator Boundaries
// =============================================================================

pub use resolve::{
    DescriptionScorer, IdentityBundle, IdentityOracle, OntologyHierarchy, TableHierarchy,
    TableOracle,
};

// =============================================================================
// RE-EXPORTS: Serializers
// =============================================================================

pub use export::{full_document, lite_document, write_json};
pub use formats::write_bulk_files;
pub use storage::CanonStore;
