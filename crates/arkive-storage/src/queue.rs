// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable deletion queue stored as a JSON list in the blob store.
//!
//! A failed deletion keeps its job in the queue with an incremented attempt
//! counter until `max_attempts` is reached, then the job is dropped.

use std::sync::Arc;

use arkive_core::{ArkiveError, BlobStore, DeletionJob, Notifier, VersionToken};
use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::fetch_content;

/// Jobs together with the version token of the read that produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedQueue {
    pub jobs: Vec<DeletionJob>,
    /// `None` when the queue file does not exist yet.
    pub version: Option<VersionToken>,
}

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Jobs that were due at the sweep's reference time.
    pub due: usize,
    /// Due jobs whose message was deleted.
    pub deleted: usize,
    /// Due jobs that failed and were kept for another attempt.
    pub retried: usize,
    /// Due jobs that failed for the last time and were dropped.
    pub dropped: usize,
    /// Jobs left in the queue after the sweep.
    pub remaining: usize,
    /// Whether the queue file was rewritten.
    pub written: bool,
}

/// Deferred deletions of sent messages.
#[derive(Clone)]
pub struct DeletionQueue {
    store: Arc<dyn BlobStore>,
    path: String,
    max_attempts: u32,
}

impl DeletionQueue {
    pub fn new(store: Arc<dyn BlobStore>, path: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            store,
            path: path.into(),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Reads the queue. An absent or empty file is an empty queue.
    pub async fn load(&self) -> Result<LoadedQueue, ArkiveError> {
        let Some(entry) = self.store.read(&self.path).await? else {
            return Ok(LoadedQueue::default());
        };
        let version = entry.version.clone();
        let content = fetch_content(self.store.as_ref(), entry).await?;
        let jobs = if content.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&content)?
        };
        Ok(LoadedQueue {
            jobs,
            version: Some(version),
        })
    }

    /// Adds a job and returns the queue length after the write.
    pub async fn schedule(&self, job: DeletionJob) -> Result<usize, ArkiveError> {
        let LoadedQueue { mut jobs, version } = self.load().await?;
        let message = format!(
            "deletions: schedule {}/{} at {}",
            job.chat_handle, job.message_handle, job.due_at
        );
        debug!(
            chat_handle = %job.chat_handle,
            message_handle = %job.message_handle,
            due_at = job.due_at,
            "scheduling deletion"
        );
        jobs.push(job);

        let body = serde_json::to_string_pretty(&jobs)?;
        self.store
            .write(&self.path, &body, version.as_ref(), &message)
            .await?;
        Ok(jobs.len())
    }

    /// Deletes every job due at `now` (Unix epoch ms) and rewrites the rest.
    ///
    /// Deletions run concurrently and each failure is isolated. The write is
    /// skipped when nothing is due. A failed write is returned as an error;
    /// deletions already performed are not undone.
    pub async fn sweep(
        &self,
        now: i64,
        notifier: &dyn Notifier,
    ) -> Result<SweepReport, ArkiveError> {
        let LoadedQueue { jobs, version } = self.load().await?;
        let (due, mut remaining): (Vec<_>, Vec<_>) =
            jobs.into_iter().partition(|job| job.is_due(now));

        let mut report = SweepReport {
            due: due.len(),
            ..SweepReport::default()
        };
        if due.is_empty() {
            debug!(pending = remaining.len(), "no deletions due");
            report.remaining = remaining.len();
            return Ok(report);
        }

        let outcomes = join_all(due.into_iter().map(|job| async move {
            let outcome = notifier
                .delete_message(job.chat_handle, job.message_handle)
                .await;
            (job, outcome)
        }))
        .await;

        for (job, outcome) in outcomes {
            let Err(e) = outcome else {
                report.deleted += 1;
                continue;
            };
            let attempts = job.attempts + 1;
            if attempts < self.max_attempts {
                warn!(
                    chat_handle = %job.chat_handle,
                    message_handle = %job.message_handle,
                    attempts,
                    error = %e,
                    "deletion failed, keeping job for retry"
                );
                report.retried += 1;
                remaining.push(DeletionJob { attempts, ..job });
            } else {
                warn!(
                    chat_handle = %job.chat_handle,
                    message_handle = %job.message_handle,
                    attempts,
                    error = %e,
                    "deletion failed on final attempt, dropping job"
                );
                report.dropped += 1;
            }
        }

        report.remaining = remaining.len();
        let message = format!(
            "deletions: sweep {} deleted, {} remaining",
            report.deleted, report.remaining
        );
        let body = serde_json::to_string_pretty(&remaining)?;
        if let Err(e) = self
            .store
            .write(&self.path, &body, version.as_ref(), &message)
            .await
        {
            error!(
                path = %self.path,
                error = %e,
                deleted = report.deleted,
                "deletion queue writeback failed"
            );
            return Err(e);
        }
        report.written = true;

        info!(
            deleted = report.deleted,
            retried = report.retried,
            dropped = report.dropped,
            remaining = report.remaining,
            "deletion sweep complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arkive_core::{ChatHandle, MessageHandle};
    use arkive_test_utils::{MemoryBlobStore, MockNotifier};

    const PATH: &str = "deletions.json";

    fn job(msg: i32, due_at: i64) -> DeletionJob {
        DeletionJob::new(ChatHandle(7), MessageHandle(msg), due_at)
    }

    fn setup(max_attempts: u32) -> (Arc<MemoryBlobStore>, DeletionQueue, MockNotifier) {
        let backing = Arc::new(MemoryBlobStore::new());
        let queue = DeletionQueue::new(backing.clone(), PATH, max_attempts);
        (backing, queue, MockNotifier::new())
    }

    #[tokio::test]
    async fn absent_file_loads_as_empty() {
        let (_, queue, _) = setup(3);
        let loaded = queue.load().await.unwrap();
        assert!(loaded.jobs.is_empty());
        assert!(loaded.version.is_none());
    }

    #[tokio::test]
    async fn schedule_appends_in_order() {
        let (backing, queue, _) = setup(3);
        assert_eq!(queue.schedule(job(1, 100)).await.unwrap(), 1);
        assert_eq!(queue.schedule(job(2, 50)).await.unwrap(), 2);

        let loaded = queue.load().await.unwrap();
        assert_eq!(loaded.jobs, vec![job(1, 100), job(2, 50)]);
        assert!(loaded.version.is_some());

        let raw: serde_json::Value =
            serde_json::from_str(&backing.content(PATH).await.unwrap()).unwrap();
        assert_eq!(
            raw[0],
            serde_json::json!({"chat_handle": 7, "message_handle": 1, "due_at": 100})
        );
    }

    #[tokio::test]
    async fn legacy_file_without_attempts_parses() {
        let (backing, queue, _) = setup(3);
        backing
            .put(
                PATH,
                r#"[{"chat_handle": -100123, "message_handle": 55, "due_at": 1700000000000}]"#,
            )
            .await;
        let loaded = queue.load().await.unwrap();
        assert_eq!(loaded.jobs[0].chat_handle, ChatHandle(-100123));
        assert_eq!(loaded.jobs[0].attempts, 0);
    }

    #[tokio::test]
    async fn sweep_removes_exactly_due_jobs() {
        let (_, queue, notifier) = setup(3);
        queue.schedule(job(1, 100)).await.unwrap();
        queue.schedule(job(2, 200)).await.unwrap();
        queue.schedule(job(3, 300)).await.unwrap();

        let report = queue.sweep(200, &notifier).await.unwrap();
        assert_eq!(report.due, 2);
        assert_eq!(report.deleted, 2);
        assert!(report.written);

        assert_eq!(queue.load().await.unwrap().jobs, vec![job(3, 300)]);
        let mut deleted = notifier.deleted().await;
        deleted.sort_by_key(|(_, m)| m.0);
        assert_eq!(
            deleted,
            vec![
                (ChatHandle(7), MessageHandle(1)),
                (ChatHandle(7), MessageHandle(2))
            ]
        );
    }

    #[tokio::test]
    async fn repeated_sweep_is_a_no_op() {
        let (backing, queue, notifier) = setup(3);
        queue.schedule(job(1, 100)).await.unwrap();
        queue.schedule(job(2, 500)).await.unwrap();

        queue.sweep(100, &notifier).await.unwrap();
        let writes = backing.write_count();

        let report = queue.sweep(100, &notifier).await.unwrap();
        assert_eq!(report.due, 0);
        assert!(!report.written);
        assert_eq!(backing.write_count(), writes);
        assert_eq!(notifier.deleted().await.len(), 1);
    }

    #[tokio::test]
    async fn failed_deletion_is_retried_then_dropped() {
        let (_, queue, notifier) = setup(2);
        queue.schedule(job(1, 100)).await.unwrap();
        queue.schedule(job(2, 100)).await.unwrap();
        notifier
            .fail_delete_of(ChatHandle(7), MessageHandle(1))
            .await;

        let first = queue.sweep(100, &notifier).await.unwrap();
        assert_eq!((first.deleted, first.retried, first.dropped), (1, 1, 0));
        let jobs = queue.load().await.unwrap().jobs;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].message_handle, MessageHandle(1));
        assert_eq!(jobs[0].attempts, 1);

        let second = queue.sweep(100, &notifier).await.unwrap();
        assert_eq!((second.deleted, second.retried, second.dropped), (0, 0, 1));
        assert!(queue.load().await.unwrap().jobs.is_empty());
    }

    #[tokio::test]
    async fn conflicting_writeback_is_reported_after_deleting() {
        let (backing, queue, notifier) = setup(3);
        queue.schedule(job(1, 100)).await.unwrap();
        backing
            .interpose_write(
                PATH,
                r#"[{"chat_handle": 7, "message_handle": 1, "due_at": 100},
                    {"chat_handle": 7, "message_handle": 9, "due_at": 900}]"#,
            )
            .await;

        let err = queue.sweep(100, &notifier).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(notifier.deleted().await.len(), 1);
        assert_eq!(queue.load().await.unwrap().jobs.len(), 2);
    }

    #[tokio::test]
    async fn overlapping_schedules_conflict() {
        let (backing, queue, _) = setup(3);
        queue.schedule(job(1, 100)).await.unwrap();
        backing
            .interpose_write(
                PATH,
                r#"[{"chat_handle": 7, "message_handle": 1, "due_at": 100},
                    {"chat_handle": 7, "message_handle": 2, "due_at": 100}]"#,
            )
            .await;

        let err = queue.schedule(job(3, 100)).await.unwrap_err();
        assert!(err.is_conflict());
        let handles: Vec<_> = queue
            .load()
            .await
            .unwrap()
            .jobs
            .iter()
            .map(|j| j.message_handle.0)
            .collect();
        assert_eq!(handles, vec![1, 2]);
    }

    #[tokio::test]
    async fn corrupt_queue_is_a_serialization_error() {
        let (backing, queue, notifier) = setup(3);
        backing.put(PATH, "{not a list").await;
        assert!(matches!(
            queue.load().await.unwrap_err(),
            ArkiveError::Serialization { .. }
        ));
        assert!(queue.sweep(0, &notifier).await.is_err());
    }
}
