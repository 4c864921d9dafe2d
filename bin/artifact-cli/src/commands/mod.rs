// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared CLI setup.

pub mod export;
pub mod import;
pub mod inspect;

use artifact_codec::HandlerConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise each `-v` raises the level one step
/// from `warn`.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Builds the handler config from `--config`, or from the location flags.
pub fn resolve_config(
    config: Option<&Path>,
    root: PathBuf,
    base_path: String,
) -> anyhow::Result<HandlerConfig> {
    let config = match config {
        Some(path) => HandlerConfig::from_file(path)?,
        None => {
            let config = HandlerConfig {
                root,
                base_path,
                ..Default::default()
            };
            config.validate()?;
            config
        }
    };
    tracing::debug!(
        "store root '{}', base path '{}', policy {}",
        config.root.display(),
        config.base_path,
        config.failure_policy,
    );
    Ok(config)
}

/// Formats a byte count for tables.
pub fn human_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.2} MB", b / (KB * KB))
    }
}
