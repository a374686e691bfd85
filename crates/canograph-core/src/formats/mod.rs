//! # Bulk-Load Formats
//!
//! File formats for loading the canonical graph into a property-graph store.

mod bulk_tsv;

pub use bulk_tsv::{
    EDGE_DATA_FILE, EDGE_HEADER_FILE, NODE_DATA_FILE, NODE_HEADER_FILE, write_bulk_files,
};
