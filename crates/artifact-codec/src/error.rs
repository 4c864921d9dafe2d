// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for artifact persistence.

/// Errors that can occur while saving or loading model artifacts.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The store has no entry at the requested path.
    #[error("no such entry: '{path}'")]
    NotFound { path: String },

    /// A filesystem operation failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The store refused the operation (invalid path, injected fault, ...).
    #[error("store rejected '{path}': {reason}")]
    Rejected { path: String, reason: String },

    /// The manifest could not be serialised or parsed.
    #[error("manifest JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The weights text is not valid base64.
    #[error("invalid weight encoding at offset {offset}: {detail}")]
    InvalidEncoding { offset: usize, detail: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl CodecError {
    /// Returns `true` if the error means the artifacts simply are not there.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
