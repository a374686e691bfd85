//! # Node Canonicalizer
//!
//! Groups raw nodes into canonical entities using the identity-resolution
//! oracle and union-merges their attribute lists.

use super::merge_unique;
use crate::resolve::IdentityOracle;
use crate::types::{CanonError, CanonicalNode, RawNode};
use std::collections::{BTreeMap, BTreeSet};

/// Collapse raw nodes into canonical nodes.
///
/// Returns the canonical node map (keyed by preferred id) and the map from
/// every raw id to its canonical id, which the edge canonicalizer needs for
/// endpoint remapping.
///
/// All raw ids go to the oracle in one bulk call; a raw id the oracle has no
/// record of becomes its own canonical representative with its own
/// name/category as defaults. Raw nodes are consumed here — this is their
/// last use.
pub fn canonicalize_nodes(
    raw_nodes: Vec<RawNode>,
    oracle: &dyn IdentityOracle,
) -> Result<(BTreeMap<String, CanonicalNode>, BTreeMap<String, String>), CanonError> {
    let ids: Vec<String> = raw_nodes.iter().map(|node| node.id.clone()).collect();
    tracing::info!("resolving {} raw ids against the identity oracle", ids.len());
    let resolved = oracle.resolve_batch(&ids)?;

    let preferred: BTreeSet<String> = resolved
        .values()
        .map(|bundle| bundle.preferred_id.clone())
        .collect();
    tracing::info!("fetching synonym sets for {} preferred ids", preferred.len());
    let equivalents = oracle.equivalent_sets(&preferred)?;

    let mut canonical_nodes: BTreeMap<String, CanonicalNode> = BTreeMap::new();
    let mut id_map: BTreeMap<String, String> = BTreeMap::new();

    for node in raw_nodes {
        let bundle = resolved.get(&node.id);
        let canonical_id = bundle
            .map(|b| b.preferred_id.clone())
            .unwrap_or_else(|| node.id.clone());

        if let Some(existing) = canonical_nodes.get_mut(&canonical_id) {
            // Merge this node into its synonym group.
            merge_unique(&mut existing.publications, node.publications);
            merge_unique(&mut existing.all_names, node.name);
            merge_unique(&mut existing.descriptions_list, node.description);
            // Members the oracle's synonym set does not know about must
            // still appear in equivalent_ids.
            merge_unique(&mut existing.equivalent_ids, [node.id.clone()]);
            // Only the authoritative member's IRI is trusted.
            if node.id == canonical_id {
                existing.iri = node.iri;
            }
        } else {
            // First member of this synonym group.
            let (name, category, all_categories, expanded_categories) = match bundle {
                Some(b) => (
                    b.preferred_name.clone(),
                    Some(b.preferred_category.clone()),
                    b.all_categories.clone(),
                    b.expanded_categories.clone(),
                ),
                None => (
                    node.name.clone(),
                    node.category.clone(),
                    node.category.clone().into_iter().collect(),
                    node.category.clone().into_iter().collect(),
                ),
            };

            let mut equivalent_ids: Vec<String> = equivalents
                .get(&canonical_id)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_else(|| vec![canonical_id.clone()]);
            merge_unique(&mut equivalent_ids, [node.id.clone()]);

            let iri = if node.id == canonical_id { node.iri } else { None };

            let mut publications = Vec::new();
            merge_unique(&mut publications, node.publications);
            let mut all_names = Vec::new();
            merge_unique(&mut all_names, node.name);
            let mut descriptions_list = Vec::new();
            merge_unique(&mut descriptions_list, node.description);

            canonical_nodes.insert(
                canonical_id.clone(),
                CanonicalNode {
                    id: canonical_id.clone(),
                    name,
                    category,
                    iri,
                    description: None,
                    all_categories,
                    publications,
                    equivalent_ids,
                    all_names,
                    expanded_categories,
                    descriptions_list,
                },
            );
        }

        // Later duplicates of a raw id silently overwrite earlier state.
        id_map.insert(node.id, canonical_id);
    }

    tracing::info!(
        "collapsed {} raw ids into {} canonical nodes",
        id_map.len(),
        canonical_nodes.len()
    );
    Ok((canonical_nodes, id_map))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{IdentityBundle, TableOracle};

    fn raw(id: &str, name: &str, category: &str, description: &str) -> RawNode {
        RawNode {
            id: id.to_string(),
            name: (!name.is_empty()).then(|| name.to_string()),
            category: Some(category.to_string()),
            iri: Some(format!("http://example.org/{id}")),
            description: (!description.is_empty()).then(|| description.to_string()),
            publications: Vec::new(),
        }
    }

    fn aspirin_oracle() -> TableOracle {
        let mut identities = BTreeMap::new();
        let bundle = IdentityBundle {
            preferred_id: "CHEBI:A".to_string(),
            preferred_name: Some("Aspirin".to_string()),
            preferred_category: "biolink:Drug".to_string(),
            all_categories: vec!["biolink:Drug".to_string()],
            expanded_categories: vec![
                "biolink:Drug".to_string(),
                "biolink:ChemicalEntity".to_string(),
            ],
        };
        identities.insert("CHEBI:A".to_string(), bundle.clone());
        identities.insert("DRUGBANK:B".to_string(), bundle);
        let mut equivalents = BTreeMap::new();
        equivalents.insert(
            "CHEBI:A".to_string(),
            BTreeSet::from(["CHEBI:A".to_string(), "DRUGBANK:B".to_string()]),
        );
        TableOracle::from_tables(identities, equivalents)
    }

    #[test]
    fn synonym_group_merges_into_one_node() {
        let nodes = vec![
            raw("CHEBI:A", "Aspirin", "biolink:Drug", "short"),
            raw("DRUGBANK:B", "Aspirin synonym", "biolink:Drug", "a longer description"),
        ];
        let (canonical, id_map) =
            canonicalize_nodes(nodes, &aspirin_oracle()).expect("canonicalize");

        assert_eq!(canonical.len(), 1);
        let node = &canonical["CHEBI:A"];
        assert!(node.equivalent_ids.contains(&"CHEBI:A".to_string()));
        assert!(node.equivalent_ids.contains(&"DRUGBANK:B".to_string()));
        assert!(node.all_names.contains(&"Aspirin".to_string()));
        assert!(node.all_names.contains(&"Aspirin synonym".to_string()));
        assert_eq!(node.descriptions_list.len(), 2);
        assert_eq!(id_map["DRUGBANK:B"], "CHEBI:A");
    }

    #[test]
    fn unresolved_node_is_its_own_representative() {
        let nodes = vec![raw("ORPHAN:1", "Orphan", "biolink:Gene", "")];
        let (canonical, id_map) =
            canonicalize_nodes(nodes, &TableOracle::default()).expect("canonicalize");

        let node = &canonical["ORPHAN:1"];
        assert_eq!(node.name.as_deref(), Some("Orphan"));
        assert_eq!(node.category.as_deref(), Some("biolink:Gene"));
        assert_eq!(node.all_categories, vec!["biolink:Gene"]);
        assert_eq!(node.equivalent_ids, vec!["ORPHAN:1"]);
        assert_eq!(id_map["ORPHAN:1"], "ORPHAN:1");
    }

    #[test]
    fn iri_comes_only_from_the_authoritative_member() {
        // The non-authoritative member arrives first; its IRI must not win.
        let nodes = vec![
            raw("DRUGBANK:B", "Aspirin synonym", "biolink:Drug", ""),
            raw("CHEBI:A", "Aspirin", "biolink:Drug", ""),
        ];
        let (canonical, _) = canonicalize_nodes(nodes, &aspirin_oracle()).expect("canonicalize");

        assert_eq!(
            canonical["CHEBI:A"].iri.as_deref(),
            Some("http://example.org/CHEBI:A")
        );
    }

    #[test]
    fn equivalent_ids_superset_holds_without_oracle_synonyms() {
        // Oracle resolves the id but reports no synonym set for it.
        let mut identities = BTreeMap::new();
        identities.insert(
            "X:1".to_string(),
            IdentityBundle {
                preferred_id: "X:0".to_string(),
                preferred_name: None,
                preferred_category: "biolink:Gene".to_string(),
                all_categories: vec!["biolink:Gene".to_string()],
                expanded_categories: vec!["biolink:Gene".to_string()],
            },
        );
        let oracle = TableOracle::from_tables(identities, BTreeMap::new());
        let (canonical, _) =
            canonicalize_nodes(vec![raw("X:1", "x", "biolink:Gene", "")], &oracle)
                .expect("canonicalize");

        let node = &canonical["X:0"];
        assert!(node.equivalent_ids.contains(&"X:0".to_string()));
        assert!(node.equivalent_ids.contains(&"X:1".to_string()));
    }

    #[test]
    fn missing_name_and_category_stay_absent() {
        let nodes = vec![RawNode {
            id: "BARE:1".to_string(),
            ..RawNode::default()
        }];
        let (canonical, _) =
            canonicalize_nodes(nodes, &TableOracle::default()).expect("canonicalize");

        let node = &canonical["BARE:1"];
        assert_eq!(node.name, None);
        assert_eq!(node.category, None);
        assert!(node.all_categories.is_empty());
    }

    #[test]
    fn duplicate_raw_id_overwrites_mapping() {
        let nodes = vec![
            raw("CHEBI:A", "Aspirin", "biolink:Drug", "first"),
            raw("CHEBI:A", "Aspirin", "biolink:Drug", "second"),
        ];
        let (canonical, id_map) =
            canonicalize_nodes(nodes, &aspirin_oracle()).expect("canonicalize");

        assert_eq!(id_map.len(), 1);
        // Both descriptions were still accumulated for selection.
        assert_eq!(canonical["CHEBI:A"].descriptions_list.len(), 2);
    }
}
