//! # Build Pipeline
//!
//! Drives the whole canonicalization run: load, canonicalize nodes, then
//! edges, select descriptions, finalize, and emit every artifact.
//!
//! The stages are strictly sequential — edge remapping cannot start before
//! the complete raw-to-canonical id map exists — and the run is
//! all-or-nothing: any error aborts before output generation, and artifacts
//! are written only once the full canonical graph is finalized in memory.

use crate::canon::{IntegrityMode, canonicalize_edges, canonicalize_nodes, merge_unique};
use crate::descriptions::{SelectionStrategy, select_descriptions};
use crate::export::{full_document, lite_document, write_json};
use crate::formats::write_bulk_files;
use crate::loader::{ParseErrorLog, load_edges, load_nodes};
use crate::primitives::{EDGE_PUBLICATIONS_CAP, NODE_PUBLICATIONS_CAP, PUBLICATIONS_INFO_CAP};
use crate::resolve::{IdentityOracle, OntologyHierarchy};
use crate::schema::Schema;
use crate::storage::CanonStore;
use crate::types::{CanonError, CanonicalEdge, CanonicalNode, GraphMeta};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// =============================================================================
// ARTIFACT FILE NAMES
// =============================================================================

/// Full JSON graph document.
pub const FULL_JSON_FILE: &str = "canograph.json";
/// Lite JSON graph document.
pub const LITE_JSON_FILE: &str = "canograph_lite.json";
/// Embedded indexed store.
pub const STORE_FILE: &str = "canograph.redb";
/// Side log of recovered literature-info parse failures.
pub const PROBLEM_LOG_FILE: &str = "problem_publications_info.tsv";

/// Canonical id of the node describing the build itself.
const BUILD_NODE_ID: &str = "CANO:build";
/// Category of the build-info node.
const BUILD_NODE_CATEGORY: &str = "biolink:InformationContentEntity";

// =============================================================================
// INPUTS & REPORT
// =============================================================================

/// Input file pairs and the output directory for one build run.
#[derive(Debug, Clone)]
pub struct BuildPaths {
    pub nodes_file: PathBuf,
    pub nodes_header_file: PathBuf,
    pub edges_file: PathBuf,
    pub edges_header_file: PathBuf,
    pub output_dir: PathBuf,
}

/// Summary of a completed build run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct BuildReport {
    pub raw_nodes: usize,
    pub canonical_nodes: usize,
    pub raw_edges: usize,
    pub canonical_edges: usize,
    pub self_loops_dropped: u64,
    pub parse_failures: usize,
}

// =============================================================================
// PIPELINE
// =============================================================================

/// Run the full build: raw files in, every artifact out.
pub fn run(
    schema: &Schema,
    paths: &BuildPaths,
    oracle: &dyn IdentityOracle,
    hierarchy: &dyn OntologyHierarchy,
    strategy: SelectionStrategy<'_>,
    mode: IntegrityMode,
    meta: &GraphMeta,
) -> Result<BuildReport, CanonError> {
    // Stage 1: load raw records.
    let mut parse_errors = ParseErrorLog::new();
    let raw_nodes = load_nodes(schema, &paths.nodes_header_file, &paths.nodes_file, &mut parse_errors)?;
    let raw_edges = load_edges(schema, &paths.edges_header_file, &paths.edges_file, &mut parse_errors)?;
    let raw_node_count = raw_nodes.len();
    let raw_edge_count = raw_edges.len();

    // Stage 2: collapse nodes into canonical entities.
    let (mut nodes, id_map) = canonicalize_nodes(raw_nodes, oracle)?;
    log_reduction("nodes", raw_node_count, nodes.len());

    // Stage 3: remap and merge edges.
    let (mut edges, self_loops_dropped) = canonicalize_edges(raw_edges, &id_map, mode)?;
    log_reduction("edges", raw_edge_count, edges.len());

    // Record the build itself as a node before descriptions are chosen, so
    // it goes through the same selection and finalization as every other.
    let build_node = build_info_node(meta)?;
    nodes.insert(build_node.id.clone(), build_node);

    // Stage 4: pick one description per node (data-parallel).
    select_descriptions(&mut nodes, strategy);

    // Final pass: caps and dense numeric edge ids.
    finalize_nodes(&mut nodes);
    finalize_edges(&mut edges);

    // Graph integrity must hold before anything is written.
    if mode == IntegrityMode::Strict {
        verify_integrity(&nodes, &edges)?;
    }

    // Stage 5: emit artifacts, in order, only now that the graph is final.
    std::fs::create_dir_all(&paths.output_dir).map_err(|e| CanonError::Io(e.to_string()))?;
    if !parse_errors.is_empty() {
        let log_path = paths.output_dir.join(PROBLEM_LOG_FILE);
        tracing::warn!(
            "{} literature-info cells failed to parse; writing {}",
            parse_errors.len(),
            log_path.display()
        );
        parse_errors.write_tsv(&log_path)?;
    }

    emit_artifacts(schema, &nodes, &edges, hierarchy, meta, &paths.output_dir)?;

    Ok(BuildReport {
        raw_nodes: raw_node_count,
        canonical_nodes: nodes.len(),
        raw_edges: raw_edge_count,
        canonical_edges: edges.len(),
        self_loops_dropped,
        parse_failures: parse_errors.len(),
    })
}

fn emit_artifacts(
    schema: &Schema,
    nodes: &BTreeMap<String, CanonicalNode>,
    edges: &BTreeMap<String, CanonicalEdge>,
    hierarchy: &dyn OntologyHierarchy,
    meta: &GraphMeta,
    out_dir: &Path,
) -> Result<(), CanonError> {
    tracing::info!("writing {}", FULL_JSON_FILE);
    write_json(&out_dir.join(FULL_JSON_FILE), &full_document(nodes, edges, meta)?)?;

    tracing::info!("writing {}", LITE_JSON_FILE);
    write_json(
        &out_dir.join(LITE_JSON_FILE),
        &lite_document(schema, nodes, edges, meta)?,
    )?;

    tracing::info!("writing {}", STORE_FILE);
    let mut store = CanonStore::create(&out_dir.join(STORE_FILE))?;
    store.write_nodes(nodes)?;
    store.write_edges(edges)?;
    tracing::info!(
        "store contains {} nodes and {} edges",
        store.node_count()?,
        store.edge_count()?
    );

    tracing::info!("writing bulk-load TSV pairs");
    write_bulk_files(schema, nodes, edges, hierarchy, out_dir)?;
    Ok(())
}

// =============================================================================
// FINALIZATION
// =============================================================================

/// The node describing this build, serialized into the graph alongside the
/// real entities.
fn build_info_node(meta: &GraphMeta) -> Result<CanonicalNode, CanonError> {
    let name = format!("Canograph {}c", meta.graph_version);
    let description =
        serde_json::to_string(meta).map_err(|e| CanonError::Serialization(e.to_string()))?;
    let mut node = CanonicalNode {
        id: BUILD_NODE_ID.to_string(),
        name: Some(name.clone()),
        category: Some(BUILD_NODE_CATEGORY.to_string()),
        iri: Some("https://canograph.github.io/identifiers#build".to_string()),
        description: None,
        all_categories: vec![BUILD_NODE_CATEGORY.to_string()],
        expanded_categories: vec![BUILD_NODE_CATEGORY.to_string()],
        equivalent_ids: vec![BUILD_NODE_ID.to_string()],
        all_names: Vec::new(),
        publications: Vec::new(),
        descriptions_list: vec![description],
    };
    merge_unique(&mut node.all_names, [name]);
    Ok(node)
}

/// Truncate node publication lists to their cap.
fn finalize_nodes(nodes: &mut BTreeMap<String, CanonicalNode>) {
    for node in nodes.values_mut() {
        node.publications.truncate(NODE_PUBLICATIONS_CAP);
    }
}

/// Assign dense numeric edge ids (in composite-key order, so the assignment
/// is reproducible) and truncate publication data to its caps.
fn finalize_edges(edges: &mut BTreeMap<String, CanonicalEdge>) {
    for (index, edge) in edges.values_mut().enumerate() {
        edge.id = index as u64 + 1;
        edge.publications.truncate(EDGE_PUBLICATIONS_CAP);
        if edge.publications_info.len() > PUBLICATIONS_INFO_CAP {
            // Keep the first keys in insertion order; everything removed is
            // strictly after the cap, so the kept keys are undisturbed.
            let excess: Vec<String> = edge
                .publications_info
                .keys()
                .skip(PUBLICATIONS_INFO_CAP)
                .cloned()
                .collect();
            for key in excess {
                edge.publications_info.remove(&key);
            }
        }
    }
}

/// Every finalized edge must reference existing canonical nodes.
fn verify_integrity(
    nodes: &BTreeMap<String, CanonicalNode>,
    edges: &BTreeMap<String, CanonicalEdge>,
) -> Result<(), CanonError> {
    for edge in edges.values() {
        for endpoint in [&edge.subject, &edge.object] {
            if !nodes.contains_key(endpoint) {
                return Err(CanonError::DanglingEdge {
                    key: edge.key(),
                    node_id: endpoint.clone(),
                });
            }
        }
    }
    Ok(())
}

fn log_reduction(kind: &str, raw: usize, canonical: usize) {
    if raw > 0 {
        tracing::info!(
            "{} raw {kind} reduced to {} canonical ({}%)",
            raw,
            canonical,
            canonical * 100 / raw
        );
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn edge(subject: &str, object: &str) -> CanonicalEdge {
        CanonicalEdge {
            subject: subject.to_string(),
            object: object.to_string(),
            predicate: "biolink:treats".to_string(),
            ..CanonicalEdge::default()
        }
    }

    #[test]
    fn node_publications_truncated_to_cap() {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "N:1".to_string(),
            CanonicalNode {
                id: "N:1".to_string(),
                publications: (0..25).map(|i| format!("PMID:{i}")).collect(),
                ..CanonicalNode::default()
            },
        );
        finalize_nodes(&mut nodes);
        assert_eq!(nodes["N:1"].publications.len(), NODE_PUBLICATIONS_CAP);
        assert_eq!(nodes["N:1"].publications[0], "PMID:0");
    }

    #[test]
    fn edge_ids_are_dense_and_key_ordered() {
        let mut edges = BTreeMap::new();
        for (subject, object) in [("C", "D"), ("A", "B"), ("B", "C")] {
            let e = edge(subject, object);
            edges.insert(e.key(), e);
        }
        finalize_edges(&mut edges);

        let ids: Vec<u64> = edges.values().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        // BTreeMap key order: A--...--B first.
        assert_eq!(edges["A--biolink:treats--B"].id, 1);
    }

    #[test]
    fn literature_info_keeps_first_keys_in_insertion_order() {
        let mut e = edge("A", "B");
        for i in 0..30 {
            e.publications_info
                .insert(format!("PMID:{i}"), json!({"n": i}));
        }
        let mut edges = BTreeMap::new();
        edges.insert(e.key(), e);
        finalize_edges(&mut edges);

        let info = &edges["A--biolink:treats--B"].publications_info;
        assert_eq!(info.len(), PUBLICATIONS_INFO_CAP);
        let kept: Vec<&str> = info.keys().map(String::as_str).collect();
        let expected: Vec<String> = (0..PUBLICATIONS_INFO_CAP).map(|i| format!("PMID:{i}")).collect();
        assert_eq!(kept, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn edge_publications_truncated_to_cap() {
        let mut e = edge("A", "B");
        e.publications = (0..50).map(|i| format!("PMID:{i}")).collect();
        let mut edges = BTreeMap::new();
        edges.insert(e.key(), e);
        finalize_edges(&mut edges);
        assert_eq!(
            edges["A--biolink:treats--B"].publications.len(),
            EDGE_PUBLICATIONS_CAP
        );
    }

    #[test]
    fn integrity_check_rejects_dangling_edges() {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "A".to_string(),
            CanonicalNode {
                id: "A".to_string(),
                ..CanonicalNode::default()
            },
        );
        let mut edges = BTreeMap::new();
        let e = edge("A", "GONE:1");
        edges.insert(e.key(), e);

        let result = verify_integrity(&nodes, &edges);
        assert!(matches!(
            result,
            Err(CanonError::DanglingEdge { node_id, .. }) if node_id == "GONE:1"
        ));
    }

    #[test]
    fn build_info_node_describes_the_run() {
        let meta = GraphMeta {
            graph_version: "2.10.1".to_string(),
            ontology_version: "4.2.0".to_string(),
            build_date: "2025-11-03 14:12".to_string(),
        };
        let node = build_info_node(&meta).expect("build node");

        assert_eq!(node.id, BUILD_NODE_ID);
        assert_eq!(node.name.as_deref(), Some("Canograph 2.10.1c"));
        assert_eq!(node.equivalent_ids, vec![BUILD_NODE_ID]);
        // The rendered metadata is its description candidate.
        assert_eq!(node.descriptions_list.len(), 1);
        assert!(node.descriptions_list[0].contains("2.10.1"));
    }
}
