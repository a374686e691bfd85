//! # redb-backed Canonical Graph Store
//!
//! The embedded indexed key-value artifact of a build, using the redb
//! embedded database:
//! - `nodes`: node id -> serialized node attributes (unique by id)
//! - `edges`: composite triple key -> serialized edge attributes (unique by
//!   triple)
//! - `node_pairs`: unordered node-pair key -> triple key (non-unique
//!   secondary index supporting neighbor lookups in either direction)
//!
//! Values are JSON blobs; reading a record back by its key yields an
//! attribute-for-attribute identical record. The store file is deleted and
//! rebuilt from scratch on every run — there is no incremental update path.

use crate::types::{CanonError, CanonicalEdge, CanonicalNode, node_pair_key};
use redb::{
    Database, MultimapTableDefinition, ReadableDatabase, ReadableMultimapTable, ReadableTable,
    ReadableTableMetadata, TableDefinition,
};
use std::collections::BTreeMap;
use std::path::Path;

/// Table for nodes: id -> serialized node attributes.
const NODES: TableDefinition<&str, &[u8]> = TableDefinition::new("nodes");

/// Table for edges: triple key -> serialized edge attributes.
const EDGES: TableDefinition<&str, &[u8]> = TableDefinition::new("edges");

/// Secondary index: unordered node-pair key -> triple keys between the pair.
const NODE_PAIRS: MultimapTableDefinition<&str, &str> = MultimapTableDefinition::new("node_pairs");

/// The embedded store artifact.
pub struct CanonStore {
    db: Database,
}

impl std::fmt::Debug for CanonStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanonStore").finish_non_exhaustive()
    }
}

impl CanonStore {
    /// Create a fresh store at the given path, replacing any previous one.
    pub fn create(path: &Path) -> Result<Self, CanonError> {
        match std::fs::remove_file(path) {
            Ok(()) => tracing::debug!("removed previous store at {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(CanonError::Io(e.to_string())),
        }

        let db = Database::create(path).map_err(|e| CanonError::Io(e.to_string()))?;

        // Initialize tables so an empty store is still readable.
        {
            let write_txn = db.begin_write().map_err(|e| CanonError::Io(e.to_string()))?;
            let _ = write_txn
                .open_table(NODES)
                .map_err(|e| CanonError::Io(e.to_string()))?;
            let _ = write_txn
                .open_table(EDGES)
                .map_err(|e| CanonError::Io(e.to_string()))?;
            let _ = write_txn
                .open_multimap_table(NODE_PAIRS)
                .map_err(|e| CanonError::Io(e.to_string()))?;
            write_txn
                .commit()
                .map_err(|e| CanonError::Io(e.to_string()))?;
        }

        Ok(Self { db })
    }

    /// Open an existing store for reading.
    pub fn open(path: &Path) -> Result<Self, CanonError> {
        let db = Database::open(path).map_err(|e| CanonError::Io(e.to_string()))?;
        Ok(Self { db })
    }

    /// Write every canonical node in one transaction.
    pub fn write_nodes(
        &mut self,
        nodes: &BTreeMap<String, CanonicalNode>,
    ) -> Result<(), CanonError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| CanonError::Io(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(NODES)
                .map_err(|e| CanonError::Io(e.to_string()))?;
            for node in nodes.values() {
                let blob = serde_json::to_vec(node)
                    .map_err(|e| CanonError::Serialization(e.to_string()))?;
                table
                    .insert(node.id.as_str(), blob.as_slice())
                    .map_err(|e| CanonError::Io(e.to_string()))?;
            }
        }
        write_txn
            .commit()
            .map_err(|e| CanonError::Io(e.to_string()))?;
        Ok(())
    }

    /// Write every canonical edge and its pair-index entry in one
    /// transaction.
    pub fn write_edges(
        &mut self,
        edges: &BTreeMap<String, CanonicalEdge>,
    ) -> Result<(), CanonError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| CanonError::Io(e.to_string()))?;
        {
            let mut edge_table = write_txn
                .open_table(EDGES)
                .map_err(|e| CanonError::Io(e.to_string()))?;
            let mut pair_table = write_txn
                .open_multimap_table(NODE_PAIRS)
                .map_err(|e| CanonError::Io(e.to_string()))?;
            for edge in edges.values() {
                let triple = edge.key();
                let blob = serde_json::to_vec(edge)
                    .map_err(|e| CanonError::Serialization(e.to_string()))?;
                edge_table
                    .insert(triple.as_str(), blob.as_slice())
                    .map_err(|e| CanonError::Io(e.to_string()))?;
                pair_table
                    .insert(edge.pair_key().as_str(), triple.as_str())
                    .map_err(|e| CanonError::Io(e.to_string()))?;
            }
        }
        write_txn
            .commit()
            .map_err(|e| CanonError::Io(e.to_string()))?;
        Ok(())
    }

    /// Look up a node by its canonical id.
    pub fn node(&self, id: &str) -> Result<Option<CanonicalNode>, CanonError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| CanonError::Io(e.to_string()))?;
        let table = read_txn
            .open_table(NODES)
            .map_err(|e| CanonError::Io(e.to_string()))?;
        let Some(blob) = table.get(id).map_err(|e| CanonError::Io(e.to_string()))? else {
            return Ok(None);
        };
        let node = serde_json::from_slice(blob.value())
            .map_err(|e| CanonError::Serialization(e.to_string()))?;
        Ok(Some(node))
    }

    /// Look up an edge by its composite triple key.
    pub fn edge(&self, triple_key: &str) -> Result<Option<CanonicalEdge>, CanonError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| CanonError::Io(e.to_string()))?;
        let table = read_txn
            .open_table(EDGES)
            .map_err(|e| CanonError::Io(e.to_string()))?;
        let Some(blob) = table
            .get(triple_key)
            .map_err(|e| CanonError::Io(e.to_string()))?
        else {
            return Ok(None);
        };
        let edge = serde_json::from_slice(blob.value())
            .map_err(|e| CanonError::Serialization(e.to_string()))?;
        Ok(Some(edge))
    }

    /// All edges between two nodes, in either direction, via the pair index.
    pub fn edges_between(&self, a: &str, b: &str) -> Result<Vec<CanonicalEdge>, CanonError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| CanonError::Io(e.to_string()))?;
        let pair_table = read_txn
            .open_multimap_table(NODE_PAIRS)
            .map_err(|e| CanonError::Io(e.to_string()))?;
        let edge_table = read_txn
            .open_table(EDGES)
            .map_err(|e| CanonError::Io(e.to_string()))?;

        let pair = node_pair_key(a, b);
        let mut edges = Vec::new();
        for entry in pair_table
            .get(pair.as_str())
            .map_err(|e| CanonError::Io(e.to_string()))?
        {
            let triple = entry.map_err(|e| CanonError::Io(e.to_string()))?;
            if let Some(blob) = edge_table
                .get(triple.value())
                .map_err(|e| CanonError::Io(e.to_string()))?
            {
                let edge = serde_json::from_slice(blob.value())
                    .map_err(|e| CanonError::Serialization(e.to_string()))?;
                edges.push(edge);
            }
        }
        Ok(edges)
    }

    /// Number of nodes in the store.
    pub fn node_count(&self) -> Result<u64, CanonError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| CanonError::Io(e.to_string()))?;
        let table = read_txn
            .open_table(NODES)
            .map_err(|e| CanonError::Io(e.to_string()))?;
        table.len().map_err(|e| CanonError::Io(e.to_string()))
    }

    /// Number of edges in the store.
    pub fn edge_count(&self) -> Result<u64, CanonError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| CanonError::Io(e.to_string()))?;
        let table = read_txn
            .open_table(EDGES)
            .map_err(|e| CanonError::Io(e.to_string()))?;
        table.len().map_err(|e| CanonError::Io(e.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
