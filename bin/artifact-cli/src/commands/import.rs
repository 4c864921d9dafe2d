// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `artifact import` command: bring converter output into the store.
//!
//! Converter output is a `model.json` whose weight groups name raw binary
//! shards next to it (`group1-shard1of2.bin`, ...). The shards are read in
//! manifest order, concatenated into one buffer, and saved through the
//! codec, which collapses them into a single `weights.bin`.

use artifact_codec::{ArtifactBundle, HandlerConfig, IoHandler, ManifestDocument};
use std::path::{Path, PathBuf};

pub async fn execute(manifest_path: PathBuf, config: HandlerConfig) -> anyhow::Result<()> {
    let artifacts = read_converter_output(&manifest_path).await?;
    if let Some(expected) = artifacts.expected_weight_bytes() {
        if expected != artifacts.weight_data_len() {
            tracing::warn!(
                "weight specs imply {expected} bytes but shards hold {}",
                artifacts.weight_data_len(),
            );
        }
    }

    let handler = config.build_fs_handler();
    let result = handler.save(&artifacts).await?;
    if !result.is_clean() {
        anyhow::bail!("import incomplete: {}", result.errors.join("; "));
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Reads a converter manifest and its shards into one bundle.
pub async fn read_converter_output(manifest_path: &Path) -> anyhow::Result<ArtifactBundle> {
    let manifest = ManifestDocument::from_file(manifest_path)?;
    let weight_data = read_shards(manifest_path, &manifest).await?;
    Ok(manifest.into_artifacts(Some(weight_data)))
}

/// Concatenates every shard the manifest names, group by group, resolved
/// relative to the manifest's directory.
pub async fn read_shards(
    manifest_path: &Path,
    manifest: &ManifestDocument,
) -> anyhow::Result<Vec<u8>> {
    let source_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));

    let mut weight_data = Vec::new();
    for shard in manifest.weight_paths() {
        let shard_path = source_dir.join(shard);
        let bytes = tokio::fs::read(&shard_path).await.map_err(|e| {
            anyhow::anyhow!("cannot read weight shard '{}': {e}", shard_path.display())
        })?;
        tracing::info!("read shard {} ({} bytes)", shard_path.display(), bytes.len());
        weight_data.extend_from_slice(&bytes);
    }
    Ok(weight_data)
}
