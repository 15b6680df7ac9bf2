// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status report shown by `/debug` and `arkive status`.

use std::fmt;

use arkive_storage::{DeletionQueue, RecordStore, StoreProbe};
use chrono::{DateTime, Utc};
use tracing::warn;

/// Point-in-time view of both backing files. Read failures are recorded as
/// text instead of failing the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub records: usize,
    pub store: Result<Option<StoreProbe>, String>,
    pub pending_jobs: Result<usize, String>,
    /// Earliest `due_at` in the queue (Unix epoch ms).
    pub next_due: Option<i64>,
}

impl StatusReport {
    /// Gathers the report from the record store and the deletion queue.
    pub async fn collect(records: &RecordStore, queue: &DeletionQueue) -> Self {
        let store = records.probe_exists().await.map_err(|e| {
            warn!(error = %e, "status: record store probe failed");
            e.to_string()
        });

        let (pending_jobs, next_due) = match queue.load().await {
            Ok(loaded) => (
                Ok(loaded.jobs.len()),
                loaded.jobs.iter().map(|job| job.due_at).min(),
            ),
            Err(e) => {
                warn!(error = %e, "status: deletion queue load failed");
                (Err(e.to_string()), None)
            }
        };

        Self {
            records: records.count().await,
            store,
            pending_jobs,
            next_due,
        }
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Records: {}", self.records)?;
        match &self.store {
            Ok(Some(probe)) => writeln!(
                f,
                "Store size: {} bytes (large: {})",
                probe.size,
                if probe.is_large { "yes" } else { "no" }
            )?,
            Ok(None) => writeln!(f, "Store: not created yet")?,
            Err(e) => writeln!(f, "Store: unavailable ({e})")?,
        }
        match &self.pending_jobs {
            Ok(n) => writeln!(f, "Pending deletions: {n}")?,
            Err(e) => writeln!(f, "Pending deletions: unavailable ({e})")?,
        }
        match self.next_due.and_then(DateTime::<Utc>::from_timestamp_millis) {
            Some(at) => write!(f, "Next deletion due: {}", at.to_rfc3339()),
            None => write!(f, "Next deletion due: none"),
        }
    }
}
