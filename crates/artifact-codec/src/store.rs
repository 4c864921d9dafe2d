// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Text blob stores addressed by string paths.
//!
//! [`BlobStore`] is the only storage capability the codec needs: write a
//! text blob (optionally creating parent directories) and read one back.
//!
//! - [`FsBlobStore`] — maps paths onto a root directory with `tokio::fs`.
//! - [`MemoryBlobStore`] — a map behind a mutex, with injectable write
//!   failures for fault testing.

use crate::CodecError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Minimal text storage used by the codec.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes `content` at `path`, replacing any previous content.
    async fn write_text(
        &self,
        path: &str,
        content: &str,
        create_parents: bool,
    ) -> Result<(), CodecError>;

    /// Reads the text at `path`. Fails with [`CodecError::NotFound`] if absent.
    async fn read_text(&self, path: &str) -> Result<String, CodecError>;
}

#[async_trait]
impl<T: BlobStore + ?Sized> BlobStore for Arc<T> {
    async fn write_text(
        &self,
        path: &str,
        content: &str,
        create_parents: bool,
    ) -> Result<(), CodecError> {
        (**self).write_text(path, content, create_parents).await
    }

    async fn read_text(&self, path: &str) -> Result<String, CodecError> {
        (**self).read_text(path).await
    }
}

// ── Filesystem ─────────────────────────────────────────────────

/// Stores blobs as files below a root directory.
///
/// Store paths are relative to the root; a leading `/` is ignored and `..`
/// components are rejected.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Creates a store rooted at `root`. The directory need not exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a store path onto the filesystem.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, CodecError> {
        let relative = Path::new(path.trim_start_matches('/'));
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(CodecError::Rejected {
                        path: path.to_string(),
                        reason: "path escapes the store root".into(),
                    })
                }
            }
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn write_text(
        &self,
        path: &str,
        content: &str,
        create_parents: bool,
    ) -> Result<(), CodecError> {
        let target = self.resolve(path)?;

        if create_parents {
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| CodecError::Io {
                        path: parent.display().to_string(),
                        source,
                    })?;
            }
        }

        tokio::fs::write(&target, content)
            .await
            .map_err(|source| CodecError::Io {
                path: target.display().to_string(),
                source,
            })?;

        tracing::debug!("wrote {} bytes to {}", content.len(), target.display());
        Ok(())
    }

    async fn read_text(&self, path: &str) -> Result<String, CodecError> {
        let target = self.resolve(path)?;
        match tokio::fs::read_to_string(&target).await {
            Ok(content) => {
                tracing::debug!("read {} bytes from {}", content.len(), target.display());
                Ok(content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CodecError::NotFound {
                path: path.to_string(),
            }),
            Err(source) => Err(CodecError::Io {
                path: target.display().to_string(),
                source,
            }),
        }
    }
}

// ── In-memory ──────────────────────────────────────────────────

/// Keeps blobs in memory. Useful for tests and for handing artifacts
/// between components without touching disk.
///
/// Directories are implicit: a write without `create_parents` only
/// succeeds if some existing entry already lives under the same parent.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    files: Mutex<BTreeMap<String, String>>,
    /// Writes to any path containing one of these substrings fail.
    failing: Mutex<Vec<String>>,
}

impl MemoryBlobStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later write to a path containing `needle` fail with
    /// [`CodecError::Rejected`]. An empty needle fails all writes.
    pub fn fail_writes_to(&self, needle: impl Into<String>) {
        lock(&self.failing).push(needle.into());
    }

    /// Clears all injected write failures.
    pub fn heal(&self) {
        lock(&self.failing).clear();
    }

    /// Returns the content at `path`, if any.
    pub fn get(&self, path: &str) -> Option<String> {
        lock(&self.files).get(path).cloned()
    }

    /// Stores `content` at `path` directly, bypassing fault injection.
    pub fn insert(&self, path: impl Into<String>, content: impl Into<String>) {
        lock(&self.files).insert(path.into(), content.into());
    }

    /// All stored paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        lock(&self.files).keys().cloned().collect()
    }

    fn parent_exists(files: &BTreeMap<String, String>, path: &str) -> bool {
        match path.rsplit_once('/') {
            None => true,
            Some(("", _)) => true,
            Some((parent, _)) => {
                let prefix = format!("{parent}/");
                files.keys().any(|k| k.starts_with(&prefix))
            }
        }
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn write_text(
        &self,
        path: &str,
        content: &str,
        create_parents: bool,
    ) -> Result<(), CodecError> {
        if let Some(needle) = lock(&self.failing)
            .iter()
            .find(|n| path.contains(n.as_str()))
        {
            return Err(CodecError::Rejected {
                path: path.to_string(),
                reason: format!("injected write failure (matched '{needle}')"),
            });
        }

        let mut files = lock(&self.files);
        if !create_parents && !Self::parent_exists(&files, path) {
            return Err(CodecError::NotFound {
                path: path.to_string(),
            });
        }
        files.insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn read_text(&self, path: &str) -> Result<String, CodecError> {
        self.get(path).ok_or_else(|| CodecError::NotFound {
            path: path.to_string(),
        })
    }
}

/// Locks a mutex, recovering the data if a previous holder panicked.
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
