// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory versioned blob store for deterministic testing.
//!
//! `MemoryBlobStore` implements `BlobStore` with the same contract as the
//! GitHub store: content-derived version tokens, conflict on a stale or
//! missing token, and no inline content above the large threshold.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use arkive_core::{ArkiveError, BlobEntry, BlobStore, LARGE_CONTENT_THRESHOLD, VersionToken};

#[derive(Default)]
struct State {
    /// Current version of each path.
    heads: HashMap<String, VersionToken>,
    /// Every blob ever written, keyed by version. Blobs are immutable.
    blobs: HashMap<String, String>,
    /// Writes applied by a "concurrent writer" right before the next write
    /// to the same path.
    interposed: HashMap<String, String>,
}

impl State {
    fn commit(&mut self, path: &str, content: &str) -> VersionToken {
        let version = blob_version(content);
        self.blobs.insert(version.0.clone(), content.to_string());
        self.heads.insert(path.to_string(), version.clone());
        version
    }
}

/// A mock versioned blob store.
pub struct MemoryBlobStore {
    state: Mutex<State>,
    large_threshold: u64,
    reads: AtomicUsize,
    large_reads: AtomicUsize,
    writes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryBlobStore {
    /// Create an empty store using the production large-content threshold.
    pub fn new() -> Self {
        Self::with_large_threshold(LARGE_CONTENT_THRESHOLD)
    }

    /// Create an empty store that withholds inline content above `threshold` bytes.
    pub fn with_large_threshold(threshold: u64) -> Self {
        Self {
            state: Mutex::new(State::default()),
            large_threshold: threshold,
            reads: AtomicUsize::new(0),
            large_reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Seed a path with content, bypassing version checks.
    pub async fn put(&self, path: &str, content: &str) -> VersionToken {
        self.state.lock().await.commit(path, content)
    }

    /// Current content of a path, if any.
    pub async fn content(&self, path: &str) -> Option<String> {
        let state = self.state.lock().await;
        let version = state.heads.get(path)?;
        state.blobs.get(&version.0).cloned()
    }

    /// Simulate another writer: `content` lands on `path` just before the
    /// next `write` to that path is applied.
    pub async fn interpose_write(&self, path: &str, content: &str) {
        self.state
            .lock()
            .await
            .interposed
            .insert(path.to_string(), content.to_string());
    }

    /// Make every subsequent `read`/`read_large` fail with a transport error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `write` fail with a transport error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of `read` calls.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `read_large` calls.
    pub fn large_read_count(&self) -> usize {
        self.large_reads.load(Ordering::SeqCst)
    }

    /// Number of successful `write` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Git-style blob id: sha256 over a length-prefixed header and the content.
fn blob_version(content: &str) -> VersionToken {
    let mut hasher = Sha256::new();
    hasher.update(format!("blob {}\0", content.len()).as_bytes());
    hasher.update(content.as_bytes());
    VersionToken(hex::encode(hasher.finalize()))
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn read(&self, path: &str) -> Result<Option<BlobEntry>, ArkiveError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ArkiveError::transport("injected read failure"));
        }

        let state = self.state.lock().await;
        let Some(version) = state.heads.get(path) else {
            return Ok(None);
        };
        let content = state.blobs.get(&version.0).cloned().unwrap_or_default();
        let size = content.len() as u64;
        Ok(Some(BlobEntry {
            version: version.clone(),
            size,
            content: (size <= self.large_threshold).then_some(content),
        }))
    }

    async fn read_large(&self, version: &VersionToken) -> Result<String, ArkiveError> {
        self.large_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ArkiveError::transport("injected read failure"));
        }

        self.state
            .lock()
            .await
            .blobs
            .get(&version.0)
            .cloned()
            .ok_or_else(|| ArkiveError::transport(format!("blob {version} not found")))
    }

    async fn write(
        &self,
        path: &str,
        content: &str,
        expected: Option<&VersionToken>,
        _message: &str,
    ) -> Result<VersionToken, ArkiveError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ArkiveError::transport("injected write failure"));
        }

        let mut state = self.state.lock().await;
        if let Some(other) = state.interposed.remove(path) {
            state.commit(path, &other);
        }

        if state.heads.get(path) != expected {
            return Err(ArkiveError::Conflict {
                path: path.to_string(),
            });
        }

        let version = state.commit(path, content);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(version)
    }
}
