// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `artifact export` command: write stored artifacts back out as a plain
//! manifest plus one raw weight shard.

use artifact_codec::{ArtifactBundle, HandlerConfig, IoHandler, ManifestDocument};
use std::path::{Path, PathBuf};

/// Name of the single raw shard written next to the exported manifest.
const EXPORT_SHARD: &str = "group1-shard1of1.bin";

pub async fn execute(config: HandlerConfig, out: PathBuf) -> anyhow::Result<()> {
    let handler = config.build_fs_handler();
    let artifacts = handler.load().await?;

    let (manifest_path, shard_path) = write_converter_layout(&artifacts, &out).await?;
    println!("  Manifest: {}", manifest_path.display());
    println!(
        "  Weights:  {} ({} bytes)",
        shard_path.display(),
        artifacts.weight_data_len()
    );
    Ok(())
}

/// Writes `model.json` and one raw shard into `out`, returning both paths.
pub async fn write_converter_layout(
    artifacts: &ArtifactBundle,
    out: &Path,
) -> anyhow::Result<(PathBuf, PathBuf)> {
    let manifest = ManifestDocument::from_artifacts(artifacts, EXPORT_SHARD);
    let weights = artifacts.weight_data.as_deref().unwrap_or_default();

    tokio::fs::create_dir_all(out).await?;
    let manifest_path = out.join("model.json");
    let shard_path = out.join(EXPORT_SHARD);

    tokio::fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?).await?;
    tokio::fs::write(&shard_path, weights).await?;

    tracing::info!(
        "exported {} weight bytes to {}",
        weights.len(),
        out.display()
    );
    Ok((manifest_path, shard_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::import;
    use artifact_codec::WeightSpec;
    use serde_json::json;

    fn bundle() -> ArtifactBundle {
        ArtifactBundle {
            model_topology: Some(json!({ "class_name": "Sequential" })),
            weight_specs: Some(vec![
                WeightSpec::new("dense/kernel", vec![2, 3], "float32"),
                WeightSpec::new("dense/bias", vec![3], "float32"),
            ]),
            weight_data: Some((0..36u8).map(|i| i.wrapping_mul(29)).collect()),
            format: Some("layers-model".into()),
            generated_by: Some("keras v2.12.0".into()),
            ..ArtifactBundle::default()
        }
    }

    #[tokio::test]
    async fn test_single_shard_layout() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("export");
        let artifacts = bundle();

        let (manifest_path, shard_path) =
            write_converter_layout(&artifacts, &out).await.unwrap();

        assert_eq!(std::fs::read(&shard_path).unwrap(), artifacts.weight_data.unwrap());
        let doc = ManifestDocument::from_file(&manifest_path).unwrap();
        assert_eq!(doc.weight_paths(), [EXPORT_SHARD]);
    }

    #[tokio::test]
    async fn test_export_then_import_reproduces_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = bundle();

        let (manifest_path, _) = write_converter_layout(&artifacts, &dir.path().join("out"))
            .await
            .unwrap();
        let back = import::read_converter_output(&manifest_path).await.unwrap();

        assert_eq!(back.weight_data, artifacts.weight_data);
        assert_eq!(back.weight_specs, artifacts.weight_specs);
        assert_eq!(back.model_topology, artifacts.model_topology);
    }

    #[tokio::test]
    async fn test_store_export_import_store() {
        let dir = tempfile::tempdir().unwrap();
        let source = HandlerConfig {
            root: dir.path().join("store"),
            base_path: "original".into(),
            ..HandlerConfig::default()
        };
        let artifacts = bundle();
        source.build_fs_handler().save(&artifacts).await.unwrap();

        let out = dir.path().join("out");
        execute(source.clone(), out.clone()).await.unwrap();

        let target = HandlerConfig {
            base_path: "reimported".into(),
            ..source
        };
        import::execute(out.join("model.json"), target.clone())
            .await
            .unwrap();

        let before = std::fs::read(dir.path().join("store/original/weights.bin")).unwrap();
        let after = std::fs::read(dir.path().join("store/reimported/weights.bin")).unwrap();
        assert_eq!(before, after);
        let reloaded = target.build_fs_handler().load().await.unwrap();
        assert_eq!(reloaded.weight_data, artifacts.weight_data);
    }
}
