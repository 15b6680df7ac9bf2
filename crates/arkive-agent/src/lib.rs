// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request handling for the Arkive archive bot.
//!
//! The [`Archiver`] turns a classified [`Inbound`] update into store
//! operations and user replies:
//! - uploads are checked for duplicates, then appended under a new logical id
//! - retrievals re-send the archived file and schedule its deletion
//! - `/debug` replies with a [`StatusReport`]
//!
//! Store failures become user-facing replies. Only a failure to reach the
//! user at all is returned as an error.

pub mod report;
pub mod shutdown;

use std::sync::Arc;
use std::time::Duration;

use arkive_config::model::BotConfig;
use arkive_core::{
    ArchiveRecord, ArkiveError, ChatHandle, DeletionJob, Inbound, Notifier, UploadRequest,
};
use arkive_storage::{DeletionQueue, RecordStore, generate_logical_id};
use tracing::{debug, info, warn};

pub use report::StatusReport;

/// Handles classified inbound updates.
#[derive(Clone)]
pub struct Archiver {
    records: RecordStore,
    queue: DeletionQueue,
    notifier: Arc<dyn Notifier>,
    username: Option<String>,
    deletion_delay: Duration,
    id_length: usize,
}

impl Archiver {
    pub fn new(
        records: RecordStore,
        queue: DeletionQueue,
        notifier: Arc<dyn Notifier>,
        bot: &BotConfig,
    ) -> Self {
        Self {
            records,
            queue,
            notifier,
            username: bot.username.clone(),
            deletion_delay: bot.deletion_delay(),
            id_length: bot.id_length,
        }
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn queue(&self) -> &DeletionQueue {
        &self.queue
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Handles one update.
    pub async fn handle(&self, inbound: Inbound) -> Result<(), ArkiveError> {
        match inbound {
            Inbound::Upload(request) => self.upload(request).await,
            Inbound::Retrieve { chat, logical_id } => {
                self.retrieve(chat, logical_id.as_deref()).await
            }
            Inbound::Debug { chat } => self.debug(chat).await,
            Inbound::Ignored => Ok(()),
        }
    }

    async fn upload(&self, request: UploadRequest) -> Result<(), ArkiveError> {
        let chat = request.chat;

        if let Some(existing) = self
            .records
            .find_duplicate(&request.display_name, &request.external_file_ref)
            .await
        {
            debug!(logical_id = %existing.logical_id, "upload is a duplicate");
            let reply = format!(
                "This file is already archived.\n{}",
                self.describe(&existing.logical_id)
            );
            self.notifier.send_text(chat, &reply).await?;
            return Ok(());
        }

        let record = ArchiveRecord {
            logical_id: generate_logical_id(self.id_length),
            external_file_ref: request.external_file_ref,
            display_name: request.display_name,
            media_kind: request.media_kind,
        };

        let reply = match self.records.append(record).await {
            Ok(saved) => {
                info!(logical_id = %saved.logical_id, kind = %saved.media_kind, "archived upload");
                format!(
                    "Archived {}.\n{}",
                    saved.display_name,
                    self.describe(&saved.logical_id)
                )
            }
            Err(e) => {
                warn!(error = %e, "upload append failed");
                format!("Upload failed: {e}")
            }
        };
        self.notifier.send_text(chat, &reply).await?;
        Ok(())
    }

    async fn retrieve(
        &self,
        chat: ChatHandle,
        logical_id: Option<&str>,
    ) -> Result<(), ArkiveError> {
        let Some(logical_id) = logical_id else {
            self.notifier
                .send_text(chat, "Send /get <id> to retrieve an archived file.")
                .await?;
            return Ok(());
        };

        let Some(record) = self.records.find_by_id(logical_id).await else {
            self.notifier
                .send_text(chat, &format!("No archived file found for ID {logical_id}."))
                .await?;
            return Ok(());
        };

        let sent = self
            .notifier
            .send_media(
                chat,
                record.media_kind,
                &record.external_file_ref,
                Some(&record.display_name),
            )
            .await?;

        let due_at = self.due_at(chrono::Utc::now().timestamp_millis());
        let notice = match self
            .queue
            .schedule(DeletionJob::new(chat, sent, due_at))
            .await
        {
            Ok(pending) => {
                debug!(logical_id, msg_id = %sent, pending, "scheduled deletion of re-sent file");
                format!(
                    "This message will be deleted in {}. \
                     Save the file elsewhere if you need to keep it.",
                    format_delay(self.deletion_delay)
                )
            }
            Err(e) => {
                warn!(logical_id, error = %e, "failed to schedule deletion");
                format!("Could not schedule deletion of this message: {e}")
            }
        };
        self.notifier.send_text(chat, &notice).await?;
        Ok(())
    }

    async fn debug(&self, chat: ChatHandle) -> Result<(), ArkiveError> {
        let report = StatusReport::collect(&self.records, &self.queue).await;
        self.notifier.send_text(chat, &report.to_string()).await?;
        Ok(())
    }

    /// Deletion time for a message sent at `now` (Unix epoch ms), clamped to
    /// `i64::MAX` for delays that do not fit.
    fn due_at(&self, now: i64) -> i64 {
        let delay = i64::try_from(self.deletion_delay.as_millis()).unwrap_or(i64::MAX);
        now.saturating_add(delay)
    }

    /// `ID: <id>` plus a deep link when the bot username is known.
    fn describe(&self, logical_id: &str) -> String {
        match &self.username {
            Some(username) => {
                format!("ID: {logical_id}\nLink: https://t.me/{username}?start={logical_id}")
            }
            None => format!("ID: {logical_id}"),
        }
    }
}

/// Human-readable delay such as `10 minutes` or `1 hour`.
pub fn format_delay(delay: Duration) -> String {
    let secs = delay.as_secs();
    let (n, unit) = if secs >= 3600 && secs % 3600 == 0 {
        (secs / 3600, "hour")
    } else if secs >= 60 && secs % 60 == 0 {
        (secs / 60, "minute")
    } else {
        (secs, "second")
    };
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}
