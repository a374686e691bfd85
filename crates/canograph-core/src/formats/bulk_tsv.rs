//! # Bulk-Load TSV Pairs
//!
//! Writes the canonical graph as header/data TSV file pairs ready for
//! property-graph bulk import.
//!
//! List-valued columns are joined with the reserved array delimiter, which
//! never appears inside a value. Header files rewrite reserved columns into
//! bulk-loader tokens: the node id column becomes `id:ID`, the label column
//! `:LABEL`, the duplicated edge endpoint/predicate columns
//! `:START_ID`/`:END_ID`/`:TYPE`, and list columns gain a `:string[]` type
//! suffix.

use crate::primitives::ARRAY_DELIMITER;
use crate::resolve::OntologyHierarchy;
use crate::schema::Schema;
use crate::types::{CanonError, CanonicalEdge, CanonicalNode, JsonMap};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Bulk-load artifact file names.
pub const NODE_HEADER_FILE: &str = "nodes_c_header.tsv";
pub const NODE_DATA_FILE: &str = "nodes_c.tsv";
pub const EDGE_HEADER_FILE: &str = "edges_c_header.tsv";
pub const EDGE_DATA_FILE: &str = "edges_c.tsv";

/// Label column appended to node rows; holds the ontology ancestor closure
/// of the schema's label field.
const NODE_LABELS_COLUMN: &str = "node_labels";

/// Duplicated edge columns consumed by the bulk loader.
const START_COLUMN: &str = "subject_for_conversion";
const END_COLUMN: &str = "object_for_conversion";
const TYPE_COLUMN: &str = "predicate_for_conversion";

/// Write all four bulk-load files into `out_dir`.
///
/// Every node row is annotated with a `node_labels` column: the
/// mixin-excluded ancestor closure of its category set, computed through the
/// ontology hierarchy collaborator.
pub fn write_bulk_files(
    schema: &Schema,
    nodes: &BTreeMap<String, CanonicalNode>,
    edges: &BTreeMap<String, CanonicalEdge>,
    hierarchy: &dyn OntologyHierarchy,
    out_dir: &Path,
) -> Result<(), CanonError> {
    let arrays = schema.array_names();
    let labels_source = schema.labels_field();

    // Nodes: schema columns plus the label column.
    let mut node_columns: Vec<&str> = schema.nodes.iter().map(|f| f.name).collect();
    node_columns.push(NODE_LABELS_COLUMN);
    write_header(
        &out_dir.join(NODE_HEADER_FILE),
        &node_columns,
        &arrays,
        true,
    )?;

    tracing::info!("writing {} node rows to {}", nodes.len(), NODE_DATA_FILE);
    let mut node_writer = tsv_writer(&out_dir.join(NODE_DATA_FILE))?;
    for node in nodes.values() {
        let object = to_object(node)?;
        let mut row: Vec<String> = schema
            .nodes
            .iter()
            .map(|f| cell_text(object.get(f.name)))
            .collect();
        row.push(node_labels(&object, labels_source, hierarchy)?);
        node_writer
            .write_record(&row)
            .map_err(|e| CanonError::Io(e.to_string()))?;
    }
    node_writer.flush().map_err(|e| CanonError::Io(e.to_string()))?;

    // Edges: schema columns plus the duplicated conversion columns.
    let mut edge_columns: Vec<&str> = schema.edges.iter().map(|f| f.name).collect();
    edge_columns.extend([START_COLUMN, END_COLUMN, TYPE_COLUMN]);
    write_header(
        &out_dir.join(EDGE_HEADER_FILE),
        &edge_columns,
        &arrays,
        false,
    )?;

    tracing::info!("writing {} edge rows to {}", edges.len(), EDGE_DATA_FILE);
    let mut edge_writer = tsv_writer(&out_dir.join(EDGE_DATA_FILE))?;
    for edge in edges.values() {
        let object = to_object(edge)?;
        let mut row: Vec<String> = schema
            .edges
            .iter()
            .map(|f| cell_text(object.get(f.name)))
            .collect();
        row.push(edge.subject.clone());
        row.push(edge.object.clone());
        row.push(edge.predicate.clone());
        edge_writer
            .write_record(&row)
            .map_err(|e| CanonError::Io(e.to_string()))?;
    }
    edge_writer.flush().map_err(|e| CanonError::Io(e.to_string()))?;

    Ok(())
}

/// Write one header file with bulk-loader token rewriting applied.
fn write_header(
    path: &Path,
    columns: &[&str],
    arrays: &[&str],
    node_file: bool,
) -> Result<(), CanonError> {
    let modified: Vec<String> = columns
        .iter()
        .map(|&column| {
            if arrays.contains(&column) {
                format!("{column}:string[]")
            } else if column == "id" && node_file {
                format!("{column}:ID")
            } else if column == NODE_LABELS_COLUMN {
                ":LABEL".to_string()
            } else if column == START_COLUMN {
                ":START_ID".to_string()
            } else if column == END_COLUMN {
                ":END_ID".to_string()
            } else if column == TYPE_COLUMN {
                ":TYPE".to_string()
            } else {
                column.to_string()
            }
        })
        .collect();

    let mut writer = tsv_writer(path)?;
    writer
        .write_record(&modified)
        .map_err(|e| CanonError::Io(e.to_string()))?;
    writer.flush().map_err(|e| CanonError::Io(e.to_string()))?;
    Ok(())
}

/// Compute the label cell for one node row.
fn node_labels(
    object: &JsonMap,
    labels_source: Option<&'static str>,
    hierarchy: &dyn OntologyHierarchy,
) -> Result<String, CanonError> {
    let categories: Vec<String> = labels_source
        .and_then(|name| object.get(name))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let closure = hierarchy.ancestors(&categories)?;
    Ok(closure.join(ARRAY_DELIMITER))
}

/// Render one serialized attribute as a TSV cell. Lists become
/// delimiter-joined strings; mappings and numbers are rendered as JSON text.
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(ARRAY_DELIMITER),
        Some(other) => other.to_string(),
    }
}

fn to_object<T: serde::Serialize>(record: &T) -> Result<JsonMap, CanonError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CanonError::Serialization(
            "record did not serialize to an object".to_string(),
        )),
        Err(e) => Err(CanonError::Serialization(e.to_string())),
    }
}

fn tsv_writer(path: &Path) -> Result<csv::Writer<std::fs::File>, CanonError> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .map_err(|e| CanonError::Io(e.to_string()))
}

// =============================================================================
// TESTS
// =============================================================================
