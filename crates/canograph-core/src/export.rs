//! # JSON Document Export
//!
//! Builds the full and lite JSON documents of the finalized canonical graph.
//!
//! The full document carries every attribute of every node and edge plus the
//! build metadata. The lite document is restricted to the schema's
//! lightweight whitelist — exactly those property names, no others — for
//! consumers that only need graph shape.

use crate::schema::Schema;
use crate::types::{CanonError, CanonicalEdge, CanonicalNode, GraphMeta, JsonMap};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Build the full graph document: `{nodes, edges, <metadata fields>}`.
pub fn full_document(
    nodes: &BTreeMap<String, CanonicalNode>,
    edges: &BTreeMap<String, CanonicalEdge>,
    meta: &GraphMeta,
) -> Result<Value, CanonError> {
    let node_values = nodes.values().map(to_value).collect::<Result<Vec<_>, _>>()?;
    let edge_values = edges.values().map(to_value).collect::<Result<Vec<_>, _>>()?;
    Ok(document(node_values, edge_values, meta))
}

/// Build the lite graph document: same shape, whitelisted fields only.
pub fn lite_document(
    schema: &Schema,
    nodes: &BTreeMap<String, CanonicalNode>,
    edges: &BTreeMap<String, CanonicalEdge>,
    meta: &GraphMeta,
) -> Result<Value, CanonError> {
    let node_whitelist = schema.node_lite();
    let edge_whitelist = schema.edge_lite();

    let node_values = nodes
        .values()
        .map(|node| Ok(restrict(to_value(node)?, &node_whitelist)))
        .collect::<Result<Vec<_>, CanonError>>()?;
    let edge_values = edges
        .values()
        .map(|edge| Ok(restrict(to_value(edge)?, &edge_whitelist)))
        .collect::<Result<Vec<_>, CanonError>>()?;
    Ok(document(node_values, edge_values, meta))
}

/// Write a document to disk as compact JSON.
pub fn write_json(path: &Path, document: &Value) -> Result<(), CanonError> {
    let file = File::create(path).map_err(|e| CanonError::Io(e.to_string()))?;
    serde_json::to_writer(BufWriter::new(file), document)
        .map_err(|e| CanonError::Serialization(e.to_string()))?;
    Ok(())
}

fn document(nodes: Vec<Value>, edges: Vec<Value>, meta: &GraphMeta) -> Value {
    let mut doc = JsonMap::new();
    doc.insert("nodes".to_string(), Value::Array(nodes));
    doc.insert("edges".to_string(), Value::Array(edges));
    doc.insert(
        "graph_version".to_string(),
        Value::String(meta.graph_version.clone()),
    );
    doc.insert(
        "ontology_version".to_string(),
        Value::String(meta.ontology_version.clone()),
    );
    doc.insert("build_date".to_string(), Value::String(meta.build_date.clone()));
    Value::Object(doc)
}

/// Keep exactly the whitelisted keys, in whitelist order. Whitelisted fields
/// absent from the record serialize as null so every lite record has an
/// identical key set.
fn restrict(value: Value, whitelist: &[&str]) -> Value {
    let mut source = match value {
        Value::Object(map) => map,
        _ => JsonMap::new(),
    };
    let mut restricted = JsonMap::new();
    for &name in whitelist {
        restricted.insert(
            name.to_string(),
            source.remove(name).unwrap_or(Value::Null),
        );
    }
    Value::Object(restricted)
}

fn to_value<T: serde::Serialize>(record: &T) -> Result<Value, CanonError> {
    serde_json::to_value(record).map_err(|e| CanonError::Serialization(e.to_string()))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> (BTreeMap<String, CanonicalNode>, BTreeMap<String, CanonicalEdge>) {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "CHEBI:1".to_string(),
            CanonicalNode {
                id: "CHEBI:1".to_string(),
                name: Some("Aspirin".to_string()),
                category: Some("biolink:Drug".to_string()),
                iri: Some("http://example.org/1".to_string()),
                description: Some("a drug".to_string()),
                all_categories: vec!["biolink:Drug".to_string()],
                publications: vec!["PMID:1".to_string()],
                equivalent_ids: vec!["CHEBI:1".to_string()],
                all_names: vec!["Aspirin".to_string()],
                expanded_categories: vec!["biolink:Drug".to_string()],
                descriptions_list: Vec::new(),
            },
        );
        let mut edges = BTreeMap::new();
        let edge = CanonicalEdge {
            id: 1,
            subject: "CHEBI:1".to_string(),
            object: "MONDO:2".to_string(),
            predicate: "biolink:treats".to_string(),
            provided_by: vec!["infores:semmeddb".to_string()],
            publications: Vec::new(),
            source_ids: vec!["e1".to_string()],
            publications_info: JsonMap::new(),
        };
        edges.insert(edge.key(), edge);
        (nodes, edges)
    }

    fn meta() -> GraphMeta {
        GraphMeta {
            graph_version: "2.10.1".to_string(),
            ontology_version: "4.2.0".to_string(),
            build_date: "2025-11-03 14:12".to_string(),
        }
    }

    #[test]
    fn full_document_carries_metadata_and_all_fields() {
        let (nodes, edges) = sample_graph();
        let doc = full_document(&nodes, &edges, &meta()).expect("full document");

        assert_eq!(doc["graph_version"], "2.10.1");
        assert_eq!(doc["ontology_version"], "4.2.0");
        assert_eq!(doc["build_date"], "2025-11-03 14:12");
        assert_eq!(doc["nodes"][0]["equivalent_ids"][0], "CHEBI:1");
        assert_eq!(doc["edges"][0]["source_ids"][0], "e1");
    }

    #[test]
    fn lite_node_has_exactly_the_whitelisted_keys() {
        let (nodes, edges) = sample_graph();
        let doc =
            lite_document(&Schema::biolink(), &nodes, &edges, &meta()).expect("lite document");

        let node = doc["nodes"][0].as_object().expect("node object");
        let keys: Vec<&str> = node.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "name", "category", "all_categories"]);
    }

    #[test]
    fn lite_edge_has_exactly_the_whitelisted_keys() {
        let (nodes, edges) = sample_graph();
        let doc =
            lite_document(&Schema::biolink(), &nodes, &edges, &meta()).expect("lite document");

        let edge = doc["edges"][0].as_object().expect("edge object");
        let keys: Vec<&str> = edge.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "subject", "object", "predicate"]);
        assert_eq!(edge["id"], 1);
    }

    #[test]
    fn json_files_round_trip() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let (nodes, edges) = sample_graph();
        let doc = full_document(&nodes, &edges, &meta()).expect("full document");

        let path = dir.path().join("graph.json");
        write_json(&path, &doc).expect("write json");

        let content = std::fs::read_to_string(&path).expect("read back");
        let reloaded: Value = serde_json::from_str(&content).expect("parse");
        assert_eq!(reloaded, doc);
    }
}
