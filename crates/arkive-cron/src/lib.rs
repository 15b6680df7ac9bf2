// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic trigger for the deletion queue sweep.
//!
//! [`SweepScheduler`] sleeps until the next occurrence of a cron expression,
//! sweeps the queue against the wall clock, and repeats until cancelled.
//! Sweep failures are logged and never stop the loop.

use std::sync::Arc;
use std::time::Duration;

use arkive_core::{ArkiveError, Notifier};
use arkive_storage::{DeletionQueue, SweepReport};
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Runs [`DeletionQueue::sweep`] on a cron schedule.
pub struct SweepScheduler {
    queue: DeletionQueue,
    notifier: Arc<dyn Notifier>,
    cron: croner::Cron,
}

impl SweepScheduler {
    /// Creates a scheduler for a five-field cron expression.
    pub fn new(
        queue: DeletionQueue,
        notifier: Arc<dyn Notifier>,
        schedule: &str,
    ) -> Result<Self, ArkiveError> {
        let cron = croner::Cron::new(schedule).parse().map_err(|e| {
            ArkiveError::Config(format!("invalid sweep schedule `{schedule}`: {e}"))
        })?;
        Ok(Self {
            queue,
            notifier,
            cron,
        })
    }

    /// Next occurrence strictly after `after`.
    pub fn next_run(&self, after: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.cron.find_next_occurrence(after, false).ok()
    }

    /// Sweeps once using the current time.
    pub async fn run_once(&self) -> Result<SweepReport, ArkiveError> {
        let now = Utc::now().timestamp_millis();
        self.queue.sweep(now, self.notifier.as_ref()).await
    }

    /// Runs until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        info!(queue = %self.queue.path(), "sweep scheduler started");
        loop {
            let now = Utc::now();
            let Some(next) = self.next_run(&now) else {
                warn!("sweep schedule has no future occurrences, scheduler stopping");
                return;
            };
            let delay = (next - now).to_std().unwrap_or(Duration::ZERO);
            debug!(next = %next, "next deletion sweep scheduled");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    match self.run_once().await {
                        Ok(report) if report.due > 0 => info!(
                            deleted = report.deleted,
                            retried = report.retried,
                            dropped = report.dropped,
                            remaining = report.remaining,
                            "scheduled sweep finished"
                        ),
                        Ok(_) => debug!("scheduled sweep found nothing due"),
                        Err(e) if e.is_conflict() => {
                            warn!(
                                error = %e,
                                "scheduled sweep lost a write race, retrying next tick"
                            );
                        }
                        Err(e) => error!(error = %e, "scheduled sweep failed"),
                    }
                }
                _ = cancel.cancelled() => {
                    info!("sweep scheduler shutting down");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arkive_core::{ChatHandle, DeletionJob, MessageHandle};
    use arkive_test_utils::{MemoryBlobStore, MockNotifier};
    use chrono::{TimeZone, Timelike};

    fn scheduler(
        schedule: &str,
    ) -> (
        Arc<MockNotifier>,
        DeletionQueue,
        Result<SweepScheduler, ArkiveError>,
    ) {
        let queue = DeletionQueue::new(Arc::new(MemoryBlobStore::new()), "deletions.json", 3);
        let notifier = Arc::new(MockNotifier::new());
        let built = SweepScheduler::new(queue.clone(), notifier.clone(), schedule);
        (notifier, queue, built)
    }

    #[test]
    fn invalid_schedule_is_a_config_error() {
        let (_, _, built) = scheduler("every minute");
        assert!(matches!(built, Err(ArkiveError::Config(_))));
    }

    #[test]
    fn every_minute_fires_on_the_next_minute_boundary() {
        let (_, _, built) = scheduler("* * * * *");
        let scheduler = built.unwrap();
        let after = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 15).unwrap();
        let next = scheduler.next_run(&after).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 1, 12, 31, 0).unwrap());
        assert_eq!(next.second(), 0);
    }

    #[tokio::test]
    async fn run_once_sweeps_due_jobs() {
        let (notifier, queue, built) = scheduler("*/5 * * * *");
        let scheduler = built.unwrap();
        queue
            .schedule(DeletionJob::new(ChatHandle(1), MessageHandle(2), 0))
            .await
            .unwrap();

        let report = scheduler.run_once().await.unwrap();
        assert_eq!(report.deleted, 1);
        assert_eq!(
            notifier.deleted().await,
            vec![(ChatHandle(1), MessageHandle(2))]
        );
    }

    #[tokio::test]
    async fn run_stops_when_cancelled() {
        let (_, _, built) = scheduler("0 0 1 1 *");
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(built.unwrap().run(cancel.clone()));
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("scheduler should stop promptly")
            .unwrap();
    }
}
