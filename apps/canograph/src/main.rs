//! # Canograph - Canonical Graph Builder
//!
//! The main binary for building canonical knowledge graphs.
//!
//! This application reads raw node/edge file pairs, collapses them into a
//! canonical graph through canograph-core, and writes every artifact format
//! (full JSON, lite JSON, embedded store, bulk-load TSVs) in one run.
//!
//! ## Usage
//!
//! ```bash
//! # Run a full build from a TOML config
//! canograph build --config canograph.toml
//!
//! # Inspect a built store
//! canograph lookup --store out/canograph.redb --node CHEBI:15365
//! canograph lookup --store out/canograph.redb --between CHEBI:15365,MONDO:0005079
//! ```

mod cli;
mod config;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Initialize tracing — CANOGRAPH_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("CANOGRAPH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "canograph=info,canograph_core=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments and execute
    let cli = cli::Cli::parse();
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
