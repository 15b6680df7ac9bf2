// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blob store trait for versioned remote content backends (GitHub, etc.).

use async_trait::async_trait;

use crate::error::ArkiveError;
use crate::types::{BlobEntry, VersionToken};

/// A path-addressed, versioned content store with optimistic concurrency.
///
/// Every successful write creates a new immutable revision; nothing in this
/// trait deletes revisions.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Reads a path. Returns `Ok(None)` when the path does not exist.
    ///
    /// Content above [`LARGE_CONTENT_THRESHOLD`](crate::types::LARGE_CONTENT_THRESHOLD)
    /// is not inlined; use [`read_large`](Self::read_large) with the entry's version.
    async fn read(&self, path: &str) -> Result<Option<BlobEntry>, ArkiveError>;

    /// Reads content through the immutable, content-addressed endpoint.
    async fn read_large(&self, version: &VersionToken) -> Result<String, ArkiveError>;

    /// Creates (`expected = None`) or replaces (`expected = Some(token)`) a path.
    ///
    /// Fails with [`ArkiveError::Conflict`] when the token does not match the
    /// current revision, when a token was given for a missing path, or when no
    /// token was given for an existing path.
    async fn write(
        &self,
        path: &str,
        content: &str,
        expected: Option<&VersionToken>,
        message: &str,
    ) -> Result<VersionToken, ArkiveError>;
}
