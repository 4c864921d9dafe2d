// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! In-memory model artifacts and the save receipt.
//!
//! An [`ArtifactBundle`] is what callers hand to `save` and get back from
//! `load`. The weight buffer is opaque here: [`WeightSpec`]s describe how a
//! consumer slices it, but the codec never checks that the two agree.

use crate::CodecError;
use chrono::{DateTime, Utc};
use serde_json::{Map, Number, Value};

/// A trained model's persisted state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactBundle {
    /// Architecture description (arbitrary JSON).
    pub model_topology: Option<Value>,
    /// Tensor descriptions, in buffer order.
    pub weight_specs: Option<Vec<WeightSpec>>,
    /// All weight tensors concatenated in `weight_specs` order.
    pub weight_data: Option<Vec<u8>>,
    pub format: Option<String>,
    pub generated_by: Option<String>,
    pub converted_by: Option<String>,
    /// Opaque training configuration, passed through untouched.
    pub training_config: Option<Value>,
    /// Opaque user metadata, passed through untouched.
    pub user_defined_metadata: Option<Value>,
}

impl ArtifactBundle {
    /// Sum of the byte sizes implied by `weight_specs`.
    ///
    /// Returns `None` if `weight_specs` is absent or any spec has a dtype
    /// without a fixed element size.
    pub fn expected_weight_bytes(&self) -> Option<usize> {
        self.weight_specs
            .as_ref()?
            .iter()
            .map(WeightSpec::byte_size)
            .sum()
    }

    /// Length of the weight buffer, 0 when absent.
    pub fn weight_data_len(&self) -> usize {
        self.weight_data.as_ref().map_or(0, Vec::len)
    }
}

/// Describes one tensor inside the weight buffer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WeightSpec {
    /// Tensor name (e.g., `"dense/kernel"`).
    pub name: String,
    /// Tensor shape; an empty shape is a scalar.
    pub shape: Vec<usize>,
    /// Logical dtype (`"float32"`, `"int32"`, `"bool"`, ...).
    pub dtype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantization: Option<Quantization>,
    /// Any other keys, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WeightSpec {
    /// Creates a spec with no quantization or extra metadata.
    pub fn new(name: impl Into<String>, shape: Vec<usize>, dtype: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape,
            dtype: dtype.into(),
            group: None,
            quantization: None,
            extra: Map::new(),
        }
    }

    /// Number of elements (product of the shape).
    pub fn num_elements(&self) -> usize {
        self.shape.iter().product()
    }

    /// The dtype the bytes are actually stored as.
    pub fn stored_dtype(&self) -> &str {
        self.quantization
            .as_ref()
            .map_or(self.dtype.as_str(), |q| q.dtype.as_str())
    }

    /// Bytes this tensor occupies in the buffer, if the dtype has a fixed size.
    pub fn byte_size(&self) -> Option<usize> {
        dtype_size_bytes(self.stored_dtype()).map(|s| s * self.num_elements())
    }
}

/// Quantization metadata attached to a weight.
///
/// `scale` and `min` keep the JSON number as written, so an integer `0`
/// is saved back as `0`, not `0.0`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Quantization {
    /// Stored dtype (`"uint8"`, `"uint16"`, `"float16"`).
    pub dtype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Number>,
    /// Any other keys (`originalDtype`, converter-specific tags), kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Quantization {
    /// Creates quantization metadata with only a stored dtype.
    pub fn new(dtype: impl Into<String>) -> Self {
        Self {
            dtype: dtype.into(),
            scale: None,
            min: None,
            extra: Map::new(),
        }
    }

    /// Sets the affine `scale` / `min` pair. Non-finite values are dropped.
    pub fn with_affine(mut self, scale: f64, min: f64) -> Self {
        self.scale = Number::from_f64(scale);
        self.min = Number::from_f64(min);
        self
    }
}

/// Element size for a dtype name, or `None` for variable-size types.
pub(crate) fn dtype_size_bytes(dtype: &str) -> Option<usize> {
    match dtype.to_lowercase().as_str() {
        "float32" | "f32" | "int32" | "i32" => Some(4),
        "float16" | "f16" | "uint16" | "u16" => Some(2),
        "uint8" | "u8" | "int8" | "i8" | "bool" => Some(1),
        "complex64" => Some(8),
        _ => None,
    }
}

/// Topology encoding reported in [`ArtifactsInfo`]. Only JSON exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ModelTopologyType {
    #[serde(rename = "JSON")]
    Json,
}

/// Receipt returned by `save`, describing what was written.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactsInfo {
    pub date_saved: DateTime<Utc>,
    pub model_topology_type: ModelTopologyType,
    /// UTF-8 length of the serialised topology, 0 if absent.
    pub model_topology_bytes: usize,
    /// UTF-8 length of the serialised weight specs, 0 if absent.
    pub weight_specs_bytes: usize,
    /// Raw weight buffer length, 0 if absent.
    pub weight_data_bytes: usize,
}

impl ArtifactsInfo {
    /// Computes the receipt for a bundle persisted as JSON, stamped now.
    pub fn for_json(artifacts: &ArtifactBundle) -> Result<Self, CodecError> {
        let model_topology_bytes = match &artifacts.model_topology {
            Some(topology) => serde_json::to_string(topology)?.len(),
            None => 0,
        };
        let weight_specs_bytes = match &artifacts.weight_specs {
            Some(specs) => serde_json::to_string(specs)?.len(),
            None => 0,
        };

        Ok(Self {
            date_saved: Utc::now(),
            model_topology_type: ModelTopologyType::Json,
            model_topology_bytes,
            weight_specs_bytes,
            weight_data_bytes: artifacts.weight_data_len(),
        })
    }
}

/// Outcome of a `save` call.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResult {
    pub model_artifacts_info: ArtifactsInfo,
    /// Failures absorbed under [`crate::FailurePolicy::LogAndContinue`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl SaveResult {
    /// `true` when no write failure was recorded.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
