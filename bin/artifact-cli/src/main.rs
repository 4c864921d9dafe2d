// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # artifact
//!
//! Command-line interface for the artifact-codec storage layout.
//!
//! ## Usage
//! ```bash
//! # Inspect artifacts stored under ./store/mobilenet
//! artifact inspect --root ./store --path mobilenet
//!
//! # Import a converter output directory (model.json + raw .bin shards)
//! artifact import --manifest ./web_model/model.json --root ./store --path mobilenet
//!
//! # Export back to a plain manifest + raw weights directory
//! artifact export --root ./store --path mobilenet --out ./exported
//! ```

mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "artifact",
    about = "Store and restore model artifacts as a JSON manifest plus base64 weights",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file (overrides --root / --path).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Location of stored artifacts.
#[derive(Args, Debug, Clone)]
struct Location {
    /// Directory the store is rooted at.
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Base path inside the store holding model.json and weights.bin.
    #[arg(short, long, default_value = "model")]
    path: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Load stored artifacts and print the manifest and weight table.
    Inspect {
        #[command(flatten)]
        location: Location,
    },

    /// Save a converter output directory (manifest + raw shards) into the store.
    Import {
        /// Path to the source model.json; shard paths are relative to it.
        #[arg(short, long)]
        manifest: PathBuf,

        #[command(flatten)]
        location: Location,
    },

    /// Load stored artifacts and write them out as manifest + raw weights.
    Export {
        #[command(flatten)]
        location: Location,

        /// Output directory.
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Inspect { location } => {
            let config = commands::resolve_config(cli.config.as_deref(), location.root, location.path)?;
            commands::inspect::execute(config).await
        }
        Commands::Import { manifest, location } => {
            let config = commands::resolve_config(cli.config.as_deref(), location.root, location.path)?;
            commands::import::execute(manifest, config).await
        }
        Commands::Export { location, out } => {
            let config = commands::resolve_config(cli.config.as_deref(), location.root, location.path)?;
            commands::export::execute(config, out).await
        }
    }
}
