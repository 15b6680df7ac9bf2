// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence layer for the Arkive archive bot.
//!
//! Two single-file stores live behind a [`BlobStore`]: the append-only
//! [`RecordStore`] index of archived files and the [`DeletionQueue`] of
//! pending message removals. Both rely on the store's version tokens for
//! optimistic concurrency and never hold state between calls.

pub mod codec;
pub mod queue;
pub mod records;

pub use queue::{DeletionQueue, LoadedQueue, SweepReport};
pub use records::{RecordStore, StoreProbe, generate_logical_id};

use arkive_core::{ArkiveError, BlobEntry, BlobStore};

/// Content of `entry`, fetched through the large-content path when the
/// store did not inline it.
pub(crate) async fn fetch_content(
    store: &dyn BlobStore,
    entry: BlobEntry,
) -> Result<String, ArkiveError> {
    if entry.is_large() {
        return store.read_large(&entry.version).await;
    }
    match entry.content {
        Some(content) => Ok(content),
        None => store.read_large(&entry.version).await,
    }
}
