//! # Field Schema Table
//!
//! The declarative schema for node and edge properties.
//!
//! Every component that touches property names — the loader, the lite
//! export, the bulk-load TSV writer — is driven by this table rather than by
//! hardcoded name lists. The table is a static configuration structure passed
//! into components by reference; there is no mutable global state.

// =============================================================================
// FIELD SPECIFICATION
// =============================================================================

/// Semantic type of a field, declared per schema entry.
///
/// Cell values are parsed into a [`crate::types::PropertyValue`] tagged with
/// this discriminant; use sites never inspect content to guess the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A plain string cell.
    Text,
    /// A delimiter-split list cell; empty entries are discarded.
    TextList,
    /// A structured-text-encoded mapping cell, parsed defensively.
    Mapping,
}

/// Declaration of one node or edge property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Property name, as it appears in headers and serialized documents.
    pub name: &'static str,
    pub kind: FieldKind,
    /// Whether the field is present in raw input files.
    pub in_raw: bool,
    /// Whether the field belongs in the lite export.
    pub in_lite: bool,
    /// Whether this field is the source of bulk-load node labels.
    pub use_as_labels: bool,
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind, in_raw: bool, in_lite: bool) -> Self {
        Self {
            name,
            kind,
            in_raw,
            in_lite,
            use_as_labels: false,
        }
    }

    const fn labels(mut self) -> Self {
        self.use_as_labels = true;
        self
    }
}

// =============================================================================
// DEFAULT FIELD TABLES
// =============================================================================

/// Node properties of the canonical graph, in serialization/column order.
pub const NODE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", FieldKind::Text, true, true),
    FieldSpec::new("name", FieldKind::Text, true, true),
    FieldSpec::new("category", FieldKind::Text, true, true),
    FieldSpec::new("iri", FieldKind::Text, true, false),
    FieldSpec::new("description", FieldKind::Text, true, false),
    FieldSpec::new("all_categories", FieldKind::TextList, false, true).labels(),
    FieldSpec::new("publications", FieldKind::TextList, true, false),
    FieldSpec::new("equivalent_ids", FieldKind::TextList, false, false),
    FieldSpec::new("all_names", FieldKind::TextList, false, false),
    FieldSpec::new("expanded_categories", FieldKind::TextList, false, false),
];

/// Edge properties of the canonical graph, in serialization/column order.
pub const EDGE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", FieldKind::Text, true, true),
    FieldSpec::new("subject", FieldKind::Text, true, true),
    FieldSpec::new("object", FieldKind::Text, true, true),
    FieldSpec::new("predicate", FieldKind::Text, true, true),
    FieldSpec::new("provided_by", FieldKind::TextList, true, false),
    FieldSpec::new("publications", FieldKind::TextList, true, false),
    FieldSpec::new("source_ids", FieldKind::TextList, false, false),
    FieldSpec::new("publications_info", FieldKind::Mapping, true, false),
];

// =============================================================================
// SCHEMA
// =============================================================================

/// The full property schema: one field table for nodes, one for edges.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub nodes: &'static [FieldSpec],
    pub edges: &'static [FieldSpec],
}

impl Schema {
    /// The default biolink-model schema used by production builds.
    #[must_use]
    pub const fn biolink() -> Self {
        Self {
            nodes: NODE_FIELDS,
            edges: EDGE_FIELDS,
        }
    }

    /// Node fields present in raw input, in declaration order.
    pub fn node_raw(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.nodes.iter().filter(|f| f.in_raw)
    }

    /// Edge fields present in raw input, in declaration order.
    pub fn edge_raw(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.edges.iter().filter(|f| f.in_raw)
    }

    /// Names of node fields belonging in the lite export.
    #[must_use]
    pub fn node_lite(&self) -> Vec<&'static str> {
        self.nodes.iter().filter(|f| f.in_lite).map(|f| f.name).collect()
    }

    /// Names of edge fields belonging in the lite export.
    #[must_use]
    pub fn edge_lite(&self) -> Vec<&'static str> {
        self.edges.iter().filter(|f| f.in_lite).map(|f| f.name).collect()
    }

    /// Names of all list-typed fields, node and edge alike. Bulk-load
    /// headers mark these as array columns.
    #[must_use]
    pub fn array_names(&self) -> Vec<&'static str> {
        self.nodes
            .iter()
            .chain(self.edges.iter())
            .filter(|f| f.kind == FieldKind::TextList)
            .map(|f| f.name)
            .collect()
    }

    /// Name of the node field whose values become bulk-load labels.
    /// The default schema declares exactly one.
    #[must_use]
    pub fn labels_field(&self) -> Option<&'static str> {
        self.nodes.iter().find(|f| f.use_as_labels).map(|f| f.name)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::biolink()
    }
}

// =============================================================================
// TESTS
// =============================================================================
