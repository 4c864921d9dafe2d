// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # artifact-codec
//!
//! Persists a trained model's artifacts through a text-oriented blob store
//! and restores them again.
//!
//! - [`ArtifactBundle`] — topology, weight specs, raw weight bytes and
//!   provenance strings, as held in memory.
//! - [`ManifestDocument`] — the `model.json` document written next to the
//!   weights.
//! - [`encoding`] — the base64 bridge that turns the weight buffer into text.
//! - [`BlobStore`] — the two-operation storage seam (`write_text`,
//!   `read_text`), with [`FsBlobStore`] and [`MemoryBlobStore`].
//! - [`IoHandler`] / [`BlobStoreHandler`] — the pluggable `save` / `load`
//!   pair.
//!
//! # Persisted Layout
//! Under a base path:
//! - `model.json` — manifest with a single weight group.
//! - `weights.bin` — base64 text of the weight buffer (text despite the
//!   extension).
//!
//! The two files are written one after the other with no locking or
//! atomic commit; concurrent writers on one base path can leave a
//! mismatched pair.
//!
//! # Example
//! ```no_run
//! use artifact_codec::{ArtifactBundle, BlobStoreHandler, FsBlobStore, IoHandler};
//!
//! # async fn demo() -> Result<(), artifact_codec::CodecError> {
//! let handler = BlobStoreHandler::new(FsBlobStore::new("./models"), "mobilenet");
//! let bundle = ArtifactBundle {
//!     weight_data: Some(vec![0u8; 16]),
//!     ..Default::default()
//! };
//! let result = handler.save(&bundle).await?;
//! println!("saved {} weight bytes", result.model_artifacts_info.weight_data_bytes);
//!
//! let restored = handler.load().await?;
//! assert_eq!(restored.weight_data, bundle.weight_data);
//! # Ok(())
//! # }
//! ```

mod artifacts;
mod config;
pub mod encoding;
mod error;
mod handler;
mod manifest;
mod store;

pub use artifacts::{
    ArtifactBundle, ArtifactsInfo, ModelTopologyType, Quantization, SaveResult, WeightSpec,
};
pub use config::HandlerConfig;
pub use error::CodecError;
pub use handler::{
    BlobStoreHandler, FailurePolicy, IoHandler, MODEL_JSON_FILENAME, WEIGHTS_BINARY_FILENAME,
};
pub use manifest::{ManifestDocument, WeightGroup};
pub use store::{BlobStore, FsBlobStore, MemoryBlobStore};
