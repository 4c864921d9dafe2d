// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON model manifest (`model.json`).
//!
//! # Format
//! ```json
//! {
//!   "modelTopology": { "class_name": "Sequential", "config": { ... } },
//!   "weightsManifest": [
//!     {
//!       "paths": ["weights.bin"],
//!       "weights": [
//!         { "name": "dense/kernel", "shape": [784, 10], "dtype": "float32" },
//!         { "name": "dense/bias", "shape": [10], "dtype": "float32" }
//!       ]
//!     }
//!   ],
//!   "format": "layers-model",
//!   "generatedBy": "keras v2.4.0",
//!   "convertedBy": "converter 3.0.0"
//! }
//! ```
//!
//! Absent optional fields are left out of the text entirely; a JSON `null`
//! on input is treated the same as a missing key.

use crate::{ArtifactBundle, CodecError, WeightSpec};
use serde_json::Value;
use std::path::Path;

/// Top-level manifest, serialised as `model.json`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_topology: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights_manifest: Option<Vec<WeightGroup>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converted_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_defined_metadata: Option<Value>,
}

/// Associates weight file paths with the specs stored in them.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WeightGroup {
    pub paths: Vec<String>,
    #[serde(default)]
    pub weights: Vec<WeightSpec>,
}

impl ManifestDocument {
    /// Builds the manifest for a bundle, with a single weight group
    /// pointing at `weights_path`.
    pub fn from_artifacts(artifacts: &ArtifactBundle, weights_path: &str) -> Self {
        let group = WeightGroup {
            paths: vec![weights_path.to_string()],
            weights: artifacts.weight_specs.clone().unwrap_or_default(),
        };

        Self {
            model_topology: artifacts.model_topology.clone(),
            weights_manifest: Some(vec![group]),
            format: artifacts.format.clone(),
            generated_by: artifacts.generated_by.clone(),
            converted_by: artifacts.converted_by.clone(),
            training_config: artifacts.training_config.clone(),
            user_defined_metadata: artifacts.user_defined_metadata.clone(),
        }
    }

    /// Loads a manifest from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, CodecError> {
        let content = std::fs::read_to_string(path).map_err(|source| CodecError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        let manifest: Self = serde_json::from_str(json)?;
        Ok(manifest)
    }

    /// Serialises to compact JSON.
    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    /// All weight specs across groups, concatenated in document order.
    ///
    /// `None` when the manifest has no `weightsManifest`.
    pub fn weight_specs(&self) -> Option<Vec<WeightSpec>> {
        self.weights_manifest.as_ref().map(|groups| {
            groups
                .iter()
                .flat_map(|g| g.weights.iter().cloned())
                .collect()
        })
    }

    /// Every path named by any group, in document order.
    pub fn weight_paths(&self) -> Vec<&str> {
        self.weights_manifest
            .iter()
            .flatten()
            .flat_map(|g| g.paths.iter().map(String::as_str))
            .collect()
    }

    /// Converts into a bundle. Weight specs are flattened; `weight_data`
    /// is attached as given.
    pub fn into_artifacts(self, weight_data: Option<Vec<u8>>) -> ArtifactBundle {
        let weight_specs = self.weight_specs();
        ArtifactBundle {
            model_topology: self.model_topology,
            weight_specs,
            weight_data,
            format: self.format,
            generated_by: self.generated_by,
            converted_by: self.converted_by,
            training_config: self.training_config,
            user_defined_metadata: self.user_defined_metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_bundle() -> ArtifactBundle {
        ArtifactBundle {
            model_topology: Some(json!({ "class_name": "Sequential", "config": { "layers": [] } })),
            weight_specs: Some(vec![
                WeightSpec::new("dense/kernel", vec![3, 2], "float32"),
                WeightSpec::new("dense/bias", vec![2], "float32"),
            ]),
            weight_data: Some(vec![1u8; 32]),
            format: Some("layers-model".into()),
            generated_by: Some("keras v2.4.0".into()),
            converted_by: Some("converter 3.0.0".into()),
            training_config: None,
            user_defined_metadata: None,
        }
    }

    #[test]
    fn test_single_group() {
        let m = ManifestDocument::from_artifacts(&sample_bundle(), "weights.bin");
        let groups = m.weights_manifest.as_ref().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].paths, vec!["weights.bin".to_string()]);
        assert_eq!(groups[0].weights.len(), 2);
    }

    #[test]
    fn test_absent_optionals_are_omitted() {
        let json = ManifestDocument::from_artifacts(&sample_bundle(), "weights.bin")
            .to_json()
            .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("trainingConfig"));
        assert!(!obj.contains_key("userDefinedMetadata"));
        assert_eq!(obj["format"], "layers-model");
        assert_eq!(obj["generatedBy"], "keras v2.4.0");
        assert_eq!(obj["convertedBy"], "converter 3.0.0");
    }

    #[test]
    fn test_present_optionals_are_written() {
        let mut bundle = sample_bundle();
        bundle.training_config = Some(json!({ "loss": "mse", "optimizer_config": {} }));
        bundle.user_defined_metadata = Some(json!({ "owner": "edge-team" }));
        let json = ManifestDocument::from_artifacts(&bundle, "weights.bin")
            .to_json()
            .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["trainingConfig"]["loss"], "mse");
        assert_eq!(value["userDefinedMetadata"]["owner"], "edge-team");
    }

    #[test]
    fn test_missing_specs_write_empty_group() {
        let bundle = ArtifactBundle::default();
        let m = ManifestDocument::from_artifacts(&bundle, "weights.bin");
        assert_eq!(m.weight_specs(), Some(vec![]));
        let value: Value = serde_json::from_str(&m.to_json().unwrap()).unwrap();
        assert!(value.get("modelTopology").is_none());
        assert_eq!(value["weightsManifest"][0]["weights"], json!([]));
    }

    #[test]
    fn test_flatten_groups_in_order() {
        let json = r#"{
            "modelTopology": {},
            "weightsManifest": [
                { "paths": ["group1-shard1of1.bin"], "weights": [
                    { "name": "a", "shape": [2], "dtype": "float32" },
                    { "name": "b", "shape": [1], "dtype": "int32" }
                ]},
                { "paths": ["group2-shard1of2.bin", "group2-shard2of2.bin"], "weights": [
                    { "name": "c", "shape": [4, 4], "dtype": "float32" }
                ]}
            ]
        }"#;
        let m = ManifestDocument::from_json(json).unwrap();
        let names: Vec<String> = m.weight_specs().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(
            m.weight_paths(),
            vec!["group1-shard1of1.bin", "group2-shard1of2.bin", "group2-shard2of2.bin"]
        );
    }

    #[test]
    fn test_null_optionals_read_as_absent() {
        let json = r#"{ "modelTopology": null, "trainingConfig": null, "format": "graph-model" }"#;
        let m = ManifestDocument::from_json(json).unwrap();
        assert!(m.model_topology.is_none());
        assert!(m.training_config.is_none());
        assert!(m.weights_manifest.is_none());
        assert_eq!(m.weight_specs(), None);
    }

    #[test]
    fn test_malformed_json() {
        let err = ManifestDocument::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CodecError::Json(_)));
    }

    #[test]
    fn test_into_artifacts() {
        let bundle = sample_bundle();
        let m = ManifestDocument::from_artifacts(&bundle, "weights.bin");
        let back = m.into_artifacts(bundle.weight_data.clone());
        assert_eq!(back, bundle);
    }
}
