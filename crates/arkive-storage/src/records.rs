// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only record store backed by a single delimited-text blob.
//!
//! Nothing is cached: every operation starts from a fresh read of the
//! backing path. Read operations degrade to `None`/zero on store failures;
//! `append` propagates them, including [`ArkiveError::Conflict`] when another
//! writer replaced the file between this call's read and its write.

use std::sync::Arc;

use arkive_core::{ArchiveRecord, ArkiveError, BlobStore, VersionToken};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::codec;
use crate::fetch_content;

/// Metadata of the backing file, without its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreProbe {
    pub version: VersionToken,
    pub size: u64,
    pub is_large: bool,
}

/// The archive index.
#[derive(Clone)]
pub struct RecordStore {
    store: Arc<dyn BlobStore>,
    path: String,
}

impl RecordStore {
    pub fn new(store: Arc<dyn BlobStore>, path: impl Into<String>) -> Self {
        Self {
            store,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Metadata-only existence check. `Ok(None)` when the file does not exist.
    pub async fn probe_exists(&self) -> Result<Option<StoreProbe>, ArkiveError> {
        Ok(self.store.read(&self.path).await?.map(|entry| StoreProbe {
            is_large: entry.is_large() || entry.content.is_none(),
            version: entry.version,
            size: entry.size,
        }))
    }

    /// Full file content, or `None` when absent or unreadable.
    pub async fn read_all(&self) -> Option<String> {
        let entry = match self.store.read(&self.path).await {
            Ok(entry) => entry?,
            Err(e) => {
                warn!(path = %self.path, error = %e, "record store read failed");
                return None;
            }
        };

        match fetch_content(self.store.as_ref(), entry).await {
            Ok(content) => Some(content),
            Err(e) => {
                warn!(path = %self.path, error = %e, "record store content fetch failed");
                None
            }
        }
    }

    /// First record whose name equals `display_name` or whose file ref
    /// equals `external_file_ref`, in append order.
    pub async fn find_duplicate(
        &self,
        display_name: &str,
        external_file_ref: &str,
    ) -> Option<ArchiveRecord> {
        let content = self.read_all().await?;
        data_lines(&content)
            .filter_map(codec::parse_row)
            .find(|row| {
                (!display_name.is_empty() && row.display_name == display_name)
                    || (!external_file_ref.is_empty()
                        && row.external_file_ref == external_file_ref)
            })
    }

    /// Appends one record and returns it.
    ///
    /// Creates the file (header plus row) when it does not exist; otherwise
    /// rewrites it with the row added, guarded by the version token of the
    /// same read that supplied the current content.
    pub async fn append(&self, record: ArchiveRecord) -> Result<ArchiveRecord, ArkiveError> {
        let row = codec::encode_row(&record)?;
        let message = format!("archive: add {}", record.logical_id);

        match self.store.read(&self.path).await? {
            None => {
                let content = format!("{}\n{row}\n", codec::HEADER);
                self.store.write(&self.path, &content, None, &message).await?;
                info!(path = %self.path, logical_id = %record.logical_id, "created record store");
            }
            Some(entry) => {
                let version = entry.version.clone();
                let current = fetch_content(self.store.as_ref(), entry).await?;
                let content = format!("{}\n{row}\n", current.trim_end());
                self.store
                    .write(&self.path, &content, Some(&version), &message)
                    .await?;
                info!(path = %self.path, logical_id = %record.logical_id, "appended record");
            }
        }

        Ok(record)
    }

    /// Record with the given logical id, scanning rows lazily.
    pub async fn find_by_id(&self, logical_id: &str) -> Option<ArchiveRecord> {
        let content = self.read_all().await?;
        let found = data_lines(&content)
            .filter_map(codec::parse_row)
            .find(|row| row.logical_id == logical_id);
        debug!(logical_id, found = found.is_some(), "record lookup");
        found
    }

    /// Number of records; zero when the file is absent or unreadable.
    pub async fn count(&self) -> usize {
        match self.read_all().await {
            Some(content) => data_lines(&content).count(),
            None => 0,
        }
    }
}

/// Non-blank lines after skipping a single leading header.
fn data_lines(content: &str) -> impl Iterator<Item = &str> {
    let mut lines = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .peekable();
    if lines.peek().is_some_and(|first| codec::is_header(first)) {
        lines.next();
    }
    lines
}

/// Random fixed-length decimal id. Uniqueness is not checked.
pub fn generate_logical_id(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
