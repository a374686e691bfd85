//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::config::BuildConfig;
use canograph_core::{
    CanonError, CanonStore, GraphMeta, Schema, SelectionStrategy, TableHierarchy, TableOracle,
    pipeline,
};
use std::path::Path;

// =============================================================================
// BUILD COMMAND
// =============================================================================

/// Run a full canonicalization build from a TOML config.
pub fn cmd_build(config_path: &Path, quiet: bool, json_mode: bool) -> Result<(), CanonError> {
    let config = BuildConfig::load(config_path)?;

    if !quiet {
        println!("Canograph Build");
        println!("===============");
        println!("Graph version:    {}", config.graph_version);
        println!("Ontology version: {}", config.ontology_version);
        println!("Nodes:            {}", config.nodes_file.display());
        println!("Edges:            {}", config.edges_file.display());
        println!("Output:           {}", config.output_dir.display());
        println!(
            "Integrity:        {}",
            if config.permissive { "permissive" } else { "strict" }
        );
        println!();
    }

    let oracle = TableOracle::from_json_file(&config.synonymizer_file)?;
    let hierarchy = TableHierarchy::from_json_file(&config.ontology_file)?;
    let meta = GraphMeta {
        graph_version: config.graph_version.clone(),
        ontology_version: config.ontology_version.clone(),
        build_date: chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
    };

    let report = pipeline::run(
        &Schema::biolink(),
        &config.build_paths(),
        &oracle,
        &hierarchy,
        SelectionStrategy::Longest,
        config.integrity_mode(),
        &meta,
    )?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Build complete");
    println!("  Raw nodes:        {}", report.raw_nodes);
    println!("  Canonical nodes:  {}", report.canonical_nodes);
    println!("  Raw edges:        {}", report.raw_edges);
    println!("  Canonical edges:  {}", report.canonical_edges);
    println!("  Self-loops dropped: {}", report.self_loops_dropped);
    println!("  Parse failures:   {}", report.parse_failures);

    Ok(())
}

// =============================================================================
// LOOKUP COMMAND
// =============================================================================

/// Read a node, or the edges between two nodes, from a built store.
pub fn cmd_lookup(
    store_path: &Path,
    node_id: Option<&str>,
    between: Option<&str>,
    json_mode: bool,
) -> Result<(), CanonError> {
    if node_id.is_none() && between.is_none() {
        return Err(CanonError::Io(
            "lookup needs --node or --between".to_string(),
        ));
    }

    let store = CanonStore::open(store_path)?;

    if let Some(id) = node_id {
        match store.node(id)? {
            Some(node) => {
                if json_mode {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&node).unwrap_or_default()
                    );
                } else {
                    println!("{}", id);
                    println!("  name:           {}", node.name.as_deref().unwrap_or("-"));
                    println!("  category:       {}", node.category.as_deref().unwrap_or("-"));
                    println!("  equivalent ids: {}", node.equivalent_ids.join(", "));
                }
            }
            None => println!("No node with id {id}"),
        }
    }

    if let Some(pair) = between {
        let Some((a, b)) = pair.split_once(',') else {
            return Err(CanonError::Io(
                "expected two node ids separated by a comma".to_string(),
            ));
        };
        let edges = store.edges_between(a.trim(), b.trim())?;
        if json_mode {
            println!(
                "{}",
                serde_json::to_string_pretty(&edges).unwrap_or_default()
            );
        } else if edges.is_empty() {
            println!("No edges between {} and {}", a.trim(), b.trim());
        } else {
            for edge in edges {
                println!(
                    "{} --{}--> {} (merged from {} source edges)",
                    edge.subject,
                    edge.predicate,
                    edge.object,
                    edge.source_ids.len()
                );
            }
        }
    }

    Ok(())
}
