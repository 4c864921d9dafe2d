// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Handler configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! root = "./models"
//! base_path = "mobilenet-v2"
//! failure_policy = "propagate"   # or "log-and-continue"
//! ```

use crate::{BlobStoreHandler, CodecError, FailurePolicy, FsBlobStore};
use std::path::{Path, PathBuf};

/// Where and how a filesystem-backed handler stores artifacts.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HandlerConfig {
    /// Directory the blob store is rooted at.
    pub root: PathBuf,
    /// Store path (relative to `root`) holding `model.json` and `weights.bin`.
    pub base_path: String,
    /// Behaviour on store failures.
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl HandlerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, CodecError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CodecError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, CodecError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| CodecError::Config(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, CodecError> {
        toml::to_string_pretty(self)
            .map_err(|e| CodecError::Config(format!("TOML serialise error: {e}")))
    }

    /// Checks that the base path is usable as a store path.
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.base_path.trim_matches('/').is_empty() {
            return Err(CodecError::Config("base_path must not be empty".into()));
        }
        FsBlobStore::new(&self.root)
            .resolve(&self.base_path)
            .map_err(|e| CodecError::Config(format!("invalid base_path: {e}")))?;
        Ok(())
    }

    /// Builds a filesystem-backed handler from this config.
    pub fn build_fs_handler(&self) -> BlobStoreHandler<FsBlobStore> {
        BlobStoreHandler::new(FsBlobStore::new(&self.root), self.base_path.clone())
            .with_failure_policy(self.failure_policy)
    }
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./models"),
            base_path: "model".to_string(),
            failure_policy: FailurePolicy::Propagate,
        }
    }
}
