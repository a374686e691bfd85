//! # Edge Canonicalizer
//!
//! Remaps raw edge endpoints onto canonical ids, merges parallel edges into
//! one canonical edge per (subject, predicate, object), and prunes
//! self-loops created by the remapping.

use super::merge_unique;
use crate::types::{CanonError, CanonicalEdge, RawEdge, composite_key};
use std::collections::BTreeMap;

/// How endpoint-mapping gaps are handled.
///
/// A raw endpoint with no entry in the id map means the edge references a
/// node that never went through canonicalization — an integrity violation in
/// a production build, but expected in reduced test runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrityMode {
    /// A missing mapping aborts the run.
    #[default]
    Strict,
    /// A missing mapping falls back to the original id.
    Permissive,
}

/// Merge raw edges into canonical edges keyed by their remapped composite
/// key. Returns the canonical edge map and the number of self-loops dropped.
///
/// Raw edges are consumed here — this is their last use.
pub fn canonicalize_edges(
    raw_edges: Vec<RawEdge>,
    id_map: &BTreeMap<String, String>,
    mode: IntegrityMode,
) -> Result<(BTreeMap<String, CanonicalEdge>, u64), CanonError> {
    let raw_count = raw_edges.len();
    let mut canonical_edges: BTreeMap<String, CanonicalEdge> = BTreeMap::new();
    let mut self_loops_dropped: u64 = 0;

    for edge in raw_edges {
        let subject = remap(&edge.subject, &edge.id, id_map, mode)?;
        let object = remap(&edge.object, &edge.id, id_map, mode)?;

        if subject == object {
            // Synonymous endpoints collapsed onto the same node; a
            // self-referential edge carries no information.
            self_loops_dropped += 1;
            continue;
        }

        let key = composite_key(&subject, &edge.predicate, &object);
        if let Some(existing) = canonical_edges.get_mut(&key) {
            merge_unique(&mut existing.provided_by, edge.provided_by);
            merge_unique(&mut existing.publications, edge.publications);
            // Key union; on collision the later edge's info wins.
            for (literature_id, info) in edge.publications_info {
                existing.publications_info.insert(literature_id, info);
            }
            existing.source_ids.push(edge.id);
        } else {
            let mut provided_by = Vec::new();
            merge_unique(&mut provided_by, edge.provided_by);
            let mut publications = Vec::new();
            merge_unique(&mut publications, edge.publications);
            canonical_edges.insert(
                key,
                CanonicalEdge {
                    id: 0,
                    subject,
                    object,
                    predicate: edge.predicate,
                    provided_by,
                    publications,
                    source_ids: vec![edge.id],
                    publications_info: edge.publications_info,
                },
            );
        }
    }

    tracing::info!(
        "merged {} raw edges into {} canonical edges ({} self-loops dropped)",
        raw_count,
        canonical_edges.len(),
        self_loops_dropped
    );
    Ok((canonical_edges, self_loops_dropped))
}

fn remap(
    endpoint: &str,
    edge_id: &str,
    id_map: &BTreeMap<String, String>,
    mode: IntegrityMode,
) -> Result<String, CanonError> {
    match id_map.get(endpoint) {
        Some(canonical) => Ok(canonical.clone()),
        None => match mode {
            IntegrityMode::Strict => Err(CanonError::UnmappedEndpoint {
                edge_id: edge_id.to_string(),
                endpoint: endpoint.to_string(),
            }),
            IntegrityMode::Permissive => Ok(endpoint.to_string()),
        },
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(id: &str, subject: &str, object: &str, predicate: &str) -> RawEdge {
        RawEdge {
            id: id.to_string(),
            subject: subject.to_string(),
            object: object.to_string(),
            predicate: predicate.to_string(),
            ..RawEdge::default()
        }
    }

    fn identity_map(ids: &[&str]) -> BTreeMap<String, String> {
        ids.iter().map(|id| (id.to_string(), id.to_string())).collect()
    }

    #[test]
    fn parallel_edges_merge_and_record_both_sources() {
        let mut id_map = identity_map(&["A", "C"]);
        id_map.insert("B".to_string(), "A".to_string());

        let edges = vec![raw("e1", "A", "C", "treats"), raw("e2", "B", "C", "treats")];
        let (canonical, _) =
            canonicalize_edges(edges, &id_map, IntegrityMode::Strict).expect("canonicalize");

        assert_eq!(canonical.len(), 1);
        let edge = &canonical["A--treats--C"];
        assert_eq!(edge.source_ids, vec!["e1", "e2"]);
    }

    #[test]
    fn self_loops_are_dropped_and_counted() {
        let mut id_map = BTreeMap::new();
        id_map.insert("X".to_string(), "Z".to_string());
        id_map.insert("Y".to_string(), "Z".to_string());

        let edges = vec![raw("e1", "X", "Y", "causes")];
        let (canonical, dropped) =
            canonicalize_edges(edges, &id_map, IntegrityMode::Strict).expect("canonicalize");

        assert!(canonical.is_empty());
        assert_eq!(dropped, 1);
    }

    #[test]
    fn strict_mode_rejects_unmapped_endpoints() {
        let id_map = identity_map(&["A"]);
        let result = canonicalize_edges(
            vec![raw("e1", "A", "MISSING:1", "treats")],
            &id_map,
            IntegrityMode::Strict,
        );
        assert!(matches!(
            result,
            Err(CanonError::UnmappedEndpoint { edge_id, endpoint })
                if edge_id == "e1" && endpoint == "MISSING:1"
        ));
    }

    #[test]
    fn permissive_mode_falls_back_to_original_id() {
        let id_map = identity_map(&["A"]);
        let (canonical, _) = canonicalize_edges(
            vec![raw("e1", "A", "MISSING:1", "treats")],
            &id_map,
            IntegrityMode::Permissive,
        )
        .expect("canonicalize");

        assert!(canonical.contains_key("A--treats--MISSING:1"));
    }

    #[test]
    fn merging_unions_provenance_and_publications() {
        let id_map = identity_map(&["A", "C"]);
        let mut first = raw("e1", "A", "C", "treats");
        first.provided_by = vec!["infores:semmeddb".to_string()];
        first.publications = vec!["PMID:1".to_string()];
        let mut second = raw("e2", "A", "C", "treats");
        second.provided_by = vec!["infores:drugbank".to_string(), "infores:semmeddb".to_string()];
        second.publications = vec!["PMID:2".to_string(), String::new()];

        let (canonical, _) = canonicalize_edges(
            vec![first, second],
            &id_map,
            IntegrityMode::Strict,
        )
        .expect("canonicalize");

        let edge = &canonical["A--treats--C"];
        assert_eq!(edge.provided_by, vec!["infores:semmeddb", "infores:drugbank"]);
        assert_eq!(edge.publications, vec!["PMID:1", "PMID:2"]);
    }

    #[test]
    fn later_literature_info_wins_on_key_collision() {
        let id_map = identity_map(&["A", "C"]);
        let mut first = raw("e1", "A", "C", "treats");
        first
            .publications_info
            .insert("PMID:1".to_string(), json!({"sentence": "old"}));
        let mut second = raw("e2", "A", "C", "treats");
        second
            .publications_info
            .insert("PMID:1".to_string(), json!({"sentence": "new"}));
        second
            .publications_info
            .insert("PMID:2".to_string(), json!({"sentence": "extra"}));

        let (canonical, _) = canonicalize_edges(
            vec![first, second],
            &id_map,
            IntegrityMode::Strict,
        )
        .expect("canonicalize");

        let info = &canonical["A--treats--C"].publications_info;
        assert_eq!(info.len(), 2);
        assert_eq!(info["PMID:1"]["sentence"], "new");
    }
}
