//! # Embedded Store
//!
//! Disk-backed indexed storage for the finalized canonical graph.

mod redb_store;

pub use redb_store::CanonStore;
