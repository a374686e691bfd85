//! # Innate Primitives
//!
//! Hardcoded runtime constants for the Canograph canonicalization engine.
//!
//! These values are compiled into the binary and are immutable at runtime.
//! They are shared between the loader, the canonicalizers, the description
//! selector, and every serializer so that all artifacts agree on delimiters
//! and caps.

/// Delimiter separating items inside list-valued cells of *raw* input files.
///
/// Raw exports encode list fields as `;`-joined strings. Empty or
/// whitespace-only entries produced by splitting are discarded.
pub const RAW_LIST_DELIMITER: char = ';';

/// Delimiter used for list-valued columns in the bulk-load TSV output.
///
/// Must be a character that never appears inside any list item. `ǂ` is
/// reserved for this purpose across every downstream consumer.
pub const ARRAY_DELIMITER: &str = "ǂ";

/// Separator joining the components of a composite edge key
/// (`subject--predicate--object`) and of an unordered node-pair key.
pub const KEY_SEPARATOR: &str = "--";

/// Opening text of a parseable literature-info mapping cell.
///
/// Only cells shaped like a literature-keyed JSON object are parsed; any
/// other content yields an empty mapping.
pub const LITERATURE_MAPPING_PREFIX: &str = "{\"PMID:";

// =============================================================================
// FINALIZATION CAPS
// =============================================================================

/// Descriptions at or above this many characters are unusable as a node's
/// final description and are filtered before selection.
pub const DESCRIPTION_LENGTH_CAP: usize = 10_000;

/// Maximum number of publications kept on a canonical node after merging.
pub const NODE_PUBLICATIONS_CAP: usize = 10;

/// Maximum number of publications kept on a canonical edge after merging.
pub const EDGE_PUBLICATIONS_CAP: usize = 20;

/// Maximum number of keys kept in a canonical edge's literature-info mapping.
/// Truncation keeps the first keys in insertion order.
pub const PUBLICATIONS_INFO_CAP: usize = 20;
