// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The `save` / `load` handler over a [`BlobStore`].
//!
//! [`BlobStoreHandler`] writes two blobs under its base path:
//! 1. `model.json` — the [`ManifestDocument`], written first.
//! 2. `weights.bin` — the weight buffer as base64 text, written second.
//!
//! Loading reads them back in the same order. The manifest's group `paths`
//! are not resolved: the weights always come from the one fixed file.
//!
//! There is no locking and no two-file commit. A failure between the two
//! writes, or two writers on one base path, can leave a manifest that does
//! not match the weights next to it.

use crate::{
    encoding, ArtifactBundle, ArtifactsInfo, BlobStore, CodecError, ManifestDocument, SaveResult,
};
use async_trait::async_trait;

/// Manifest filename under the base path.
pub const MODEL_JSON_FILENAME: &str = "model.json";

/// Weights filename under the base path. The content is base64 text.
pub const WEIGHTS_BINARY_FILENAME: &str = "weights.bin";

/// A pluggable storage backend for model artifacts.
#[async_trait]
pub trait IoHandler: Send + Sync {
    /// Persists the bundle and returns a receipt.
    async fn save(&self, artifacts: &ArtifactBundle) -> Result<SaveResult, CodecError>;

    /// Restores a previously saved bundle.
    async fn load(&self) -> Result<ArtifactBundle, CodecError>;
}

/// What the handler does when a store operation fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Log the failure and return it as `Err`.
    #[default]
    Propagate,
    /// Log the failure and carry on: `save` still returns a receipt (with
    /// the failure listed in [`SaveResult::errors`]) and `load` returns an
    /// empty bundle.
    LogAndContinue,
}

impl FailurePolicy {
    /// Returns a human-readable label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Propagate => "propagate",
            Self::LogAndContinue => "log-and-continue",
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Saves and loads artifacts under one base path of a [`BlobStore`].
#[derive(Debug)]
pub struct BlobStoreHandler<S> {
    store: S,
    base_path: String,
    policy: FailurePolicy,
}

impl<S: BlobStore> BlobStoreHandler<S> {
    /// Creates a handler with [`FailurePolicy::Propagate`].
    pub fn new(store: S, base_path: impl Into<String>) -> Self {
        Self {
            store,
            base_path: base_path.into(),
            policy: FailurePolicy::default(),
        }
    }

    /// Sets the failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Store path of the manifest.
    pub fn model_json_path(&self) -> String {
        join_path(&self.base_path, MODEL_JSON_FILENAME)
    }

    /// Store path of the weights text.
    pub fn weights_path(&self) -> String {
        join_path(&self.base_path, WEIGHTS_BINARY_FILENAME)
    }

    // ── Private helpers ────────────────────────────────────────

    /// Writes manifest then weights. Stops at the first failure.
    async fn write_artifacts(&self, artifacts: &ArtifactBundle) -> Result<(), CodecError> {
        let manifest = ManifestDocument::from_artifacts(artifacts, WEIGHTS_BINARY_FILENAME);
        let manifest_json = manifest.to_json()?;
        self.store
            .write_text(&self.model_json_path(), &manifest_json, true)
            .await?;

        let weights = artifacts.weight_data.as_deref().unwrap_or_default();
        let weights_text = encoding::encode(weights);
        self.store
            .write_text(&self.weights_path(), &weights_text, true)
            .await?;

        Ok(())
    }

    /// Reads manifest, then (if it lists weights) the weights text.
    async fn read_artifacts(&self) -> Result<ArtifactBundle, CodecError> {
        let manifest_json = self.store.read_text(&self.model_json_path()).await?;
        let manifest = ManifestDocument::from_json(&manifest_json)?;

        let weight_data = if manifest.weights_manifest.is_some() {
            self.warn_on_foreign_paths(&manifest);
            let weights_text = self.store.read_text(&self.weights_path()).await?;
            Some(encoding::decode(&weights_text)?)
        } else {
            None
        };

        Ok(manifest.into_artifacts(weight_data))
    }

    fn warn_on_foreign_paths(&self, manifest: &ManifestDocument) {
        let foreign: Vec<&str> = manifest
            .weight_paths()
            .into_iter()
            .filter(|p| *p != WEIGHTS_BINARY_FILENAME)
            .collect();
        if !foreign.is_empty() {
            tracing::warn!(
                "manifest at '{}' names weight paths {:?}; reading '{}' instead",
                self.model_json_path(),
                foreign,
                self.weights_path(),
            );
        }
    }
}

#[async_trait]
impl<S: BlobStore> IoHandler for BlobStoreHandler<S> {
    async fn save(&self, artifacts: &ArtifactBundle) -> Result<SaveResult, CodecError> {
        let info = ArtifactsInfo::for_json(artifacts)?;
        tracing::debug!(
            "saving artifacts to '{}' ({} weight bytes)",
            self.base_path,
            info.weight_data_bytes,
        );

        match self.write_artifacts(artifacts).await {
            Ok(()) => {
                tracing::info!(
                    "saved artifacts to '{}': topology {} B, specs {} B, weights {} B",
                    self.base_path,
                    info.model_topology_bytes,
                    info.weight_specs_bytes,
                    info.weight_data_bytes,
                );
                Ok(SaveResult {
                    model_artifacts_info: info,
                    errors: Vec::new(),
                })
            }
            Err(e) => {
                tracing::error!("failed to save artifacts to '{}': {e}", self.base_path);
                match self.policy {
                    FailurePolicy::Propagate => Err(e),
                    FailurePolicy::LogAndContinue => Ok(SaveResult {
                        model_artifacts_info: info,
                        errors: vec![e.to_string()],
                    }),
                }
            }
        }
    }

    async fn load(&self) -> Result<ArtifactBundle, CodecError> {
        match self.read_artifacts().await {
            Ok(artifacts) => {
                tracing::info!(
                    "loaded artifacts from '{}': {} weight specs, {} weight bytes",
                    self.base_path,
                    artifacts.weight_specs.as_ref().map_or(0, Vec::len),
                    artifacts.weight_data_len(),
                );
                Ok(artifacts)
            }
            Err(e) => {
                tracing::error!("failed to load artifacts from '{}': {e}", self.base_path);
                match self.policy {
                    FailurePolicy::Propagate => Err(e),
                    FailurePolicy::LogAndContinue => Ok(ArtifactBundle::default()),
                }
            }
        }
    }
}

/// Joins a base path and a filename with exactly one `/`.
fn join_path(base: &str, name: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryBlobStore, WeightSpec};
    use serde_json::json;
    use std::sync::Arc;

    fn sample_bundle() -> ArtifactBundle {
        ArtifactBundle {
            model_topology: Some(json!({ "class_name": "Sequential" })),
            weight_specs: Some(vec![WeightSpec::new("w", vec![2, 2], "float32")]),
            weight_data: Some((0u8..16).collect()),
            format: Some("layers-model".into()),
            generated_by: Some("test".into()),
            converted_by: None,
            training_config: None,
            user_defined_metadata: None,
        }
    }

    fn memory_handler() -> (Arc<MemoryBlobStore>, BlobStoreHandler<Arc<MemoryBlobStore>>) {
        let store = Arc::new(MemoryBlobStore::new());
        let handler = BlobStoreHandler::new(Arc::clone(&store), "models/tiny");
        (store, handler)
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("a/b", "model.json"), "a/b/model.json");
        assert_eq!(join_path("a/b/", "model.json"), "a/b/model.json");
        assert_eq!(join_path("", "model.json"), "model.json");
        assert_eq!(join_path("/", "model.json"), "model.json");
    }

    #[test]
    fn test_policy_labels() {
        assert_eq!(FailurePolicy::Propagate.to_string(), "propagate");
        assert_eq!(FailurePolicy::LogAndContinue.to_string(), "log-and-continue");
    }

    #[tokio::test]
    async fn test_save_writes_both_files() {
        let (store, handler) = memory_handler();
        let result = handler.save(&sample_bundle()).await.unwrap();
        assert!(result.is_clean());
        assert_eq!(result.model_artifacts_info.weight_data_bytes, 16);

        assert_eq!(
            store.paths(),
            vec![
                "models/tiny/model.json".to_string(),
                "models/tiny/weights.bin".to_string()
            ]
        );
        let weights = store.get("models/tiny/weights.bin").unwrap();
        assert_eq!(weights, encoding::encode(&(0u8..16).collect::<Vec<_>>()));
    }

    #[tokio::test]
    async fn test_roundtrip() {
        let (_, handler) = memory_handler();
        let bundle = sample_bundle();
        handler.save(&bundle).await.unwrap();
        let back = handler.load().await.unwrap();
        assert_eq!(back, bundle);
    }

    #[tokio::test]
    async fn test_save_without_weight_data_writes_empty_text() {
        let (store, handler) = memory_handler();
        let bundle = ArtifactBundle {
            weight_data: None,
            ..sample_bundle()
        };
        let result = handler.save(&bundle).await.unwrap();
        assert_eq!(result.model_artifacts_info.weight_data_bytes, 0);
        assert_eq!(store.get("models/tiny/weights.bin").as_deref(), Some(""));

        let back = handler.load().await.unwrap();
        assert_eq!(back.weight_data, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_manifest_without_weights_skips_weight_read() {
        let (store, handler) = memory_handler();
        store.insert("models/tiny/model.json", r#"{"format":"graph-model"}"#);
        let back = handler.load().await.unwrap();
        assert_eq!(back.format.as_deref(), Some("graph-model"));
        assert!(back.weight_specs.is_none());
        assert!(back.weight_data.is_none());
    }

    #[tokio::test]
    async fn test_save_failure_propagates() {
        let (store, handler) = memory_handler();
        store.fail_writes_to("weights.bin");
        let err = handler.save(&sample_bundle()).await.unwrap_err();
        assert!(matches!(err, CodecError::Rejected { .. }));
        // Manifest went out before the weights write failed.
        assert!(store.get("models/tiny/model.json").is_some());
    }

    #[tokio::test]
    async fn test_save_failure_logged_and_swallowed() {
        let (store, handler) = memory_handler();
        let handler = handler.with_failure_policy(FailurePolicy::LogAndContinue);
        store.fail_writes_to("");
        let result = handler.save(&sample_bundle()).await.unwrap();
        assert!(!result.is_clean());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.model_artifacts_info.weight_data_bytes, 16);
        assert!(store.paths().is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_propagates_not_found() {
        let (_, handler) = memory_handler();
        let err = handler.load().await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_load_failure_yields_empty_bundle() {
        let (store, handler) = memory_handler();
        let handler = handler.with_failure_policy(FailurePolicy::LogAndContinue);
        store.insert("models/tiny/model.json", "{ broken");
        let back = handler.load().await.unwrap();
        assert_eq!(back, ArtifactBundle::default());
    }

    #[tokio::test]
    async fn test_load_bad_weights_text() {
        let (store, handler) = memory_handler();
        handler.save(&sample_bundle()).await.unwrap();
        store.insert("models/tiny/weights.bin", "not*base64");
        let err = handler.load().await.unwrap_err();
        assert!(matches!(err, CodecError::InvalidEncoding { .. }));
    }
}
