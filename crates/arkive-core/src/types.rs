// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the stores, the channel adapter, and the archiver.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Content strictly larger than this many bytes cannot be fetched through the
/// path endpoint and must be read through the content-addressed blob endpoint.
pub const LARGE_CONTENT_THRESHOLD: u64 = 1024 * 1024;

/// Opaque revision identifier returned by the remote store.
///
/// Required to replace a path; a stale token makes the write fail with
/// [`ArkiveError::Conflict`](crate::ArkiveError::Conflict).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(pub String);

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of reading a path from the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobEntry {
    /// Revision of the path at read time. Doubles as the content hash used by
    /// the large-content read path.
    pub version: VersionToken,
    /// Size of the stored content in bytes.
    pub size: u64,
    /// Inline content. `None` when the store refused to inline it because it
    /// exceeds [`LARGE_CONTENT_THRESHOLD`].
    pub content: Option<String>,
}

impl BlobEntry {
    /// Whether this entry must be fetched through the large-content path.
    pub fn is_large(&self) -> bool {
        self.size > LARGE_CONTENT_THRESHOLD
    }
}

/// Destination chat of an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatHandle(pub i64);

/// Identifier of one outbound message within a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageHandle(pub i32);

impl fmt::Display for ChatHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How an archived file is re-sent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Document,
    Photo,
    Video,
}

impl MediaKind {
    /// Parses a stored kind tag, falling back to [`MediaKind::Document`] for
    /// anything unrecognised so a damaged row can still be re-sent.
    pub fn from_stored(tag: &str) -> Self {
        tag.trim().parse().unwrap_or(MediaKind::Document)
    }
}

/// One logical archived file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    /// Fixed-length decimal id users quote to retrieve the file.
    pub logical_id: String,
    /// Platform-issued handle of the binary content.
    pub external_file_ref: String,
    /// Free-text name shown to users.
    pub display_name: String,
    pub media_kind: MediaKind,
}

/// One scheduled removal of a previously sent outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionJob {
    pub chat_handle: ChatHandle,
    pub message_handle: MessageHandle,
    /// Unix epoch milliseconds after which the job may run.
    pub due_at: i64,
    /// Failed deletion attempts so far.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub attempts: u32,
}

impl DeletionJob {
    /// Creates a job that has not been attempted yet.
    pub fn new(chat_handle: ChatHandle, message_handle: MessageHandle, due_at: i64) -> Self {
        Self {
            chat_handle,
            message_handle,
            due_at,
            attempts: 0,
        }
    }

    /// A job is due once `due_at <= now`.
    pub fn is_due(&self, now: i64) -> bool {
        self.due_at <= now
    }
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

/// A media upload extracted from an inbound update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub chat: ChatHandle,
    pub external_file_ref: String,
    pub display_name: String,
    pub media_kind: MediaKind,
}

/// Channel-agnostic classification of an inbound update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A document, photo, or video to archive.
    Upload(UploadRequest),
    /// `/start` or `/get`, optionally followed by a logical id.
    Retrieve {
        chat: ChatHandle,
        logical_id: Option<String>,
    },
    /// `/debug` status report.
    Debug { chat: ChatHandle },
    /// Anything else; acknowledged without side effects.
    Ignored,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_threshold_is_exclusive() {
        let at_limit = BlobEntry {
            version: VersionToken("a".into()),
            size: LARGE_CONTENT_THRESHOLD,
            content: Some(String::new()),
        };
        assert!(!at_limit.is_large());

        let over = BlobEntry {
            size: LARGE_CONTENT_THRESHOLD + 1,
            ..at_limit
        };
        assert!(over.is_large());
    }

    #[test]
    fn media_kind_tags() {
        assert_eq!(MediaKind::Photo.to_string(), "photo");
        assert_eq!(MediaKind::from_stored(" VIDEO "), MediaKind::Video);
        assert_eq!(MediaKind::from_stored("sticker"), MediaKind::Document);
    }

    #[test]
    fn deletion_job_wire_format() {
        let job = DeletionJob::new(ChatHandle(-100), MessageHandle(7), 1_700_000_000_000);
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "chat_handle": -100,
                "message_handle": 7,
                "due_at": 1_700_000_000_000i64,
            })
        );

        let retried: DeletionJob = serde_json::from_value(serde_json::json!({
            "chat_handle": 1,
            "message_handle": 2,
            "due_at": 3,
            "attempts": 2,
        }))
        .unwrap();
        assert_eq!(retried.attempts, 2);
    }

    #[test]
    fn due_is_inclusive() {
        let job = DeletionJob::new(ChatHandle(1), MessageHandle(1), 1000);
        assert!(job.is_due(1000));
        assert!(job.is_due(1001));
        assert!(!job.is_due(999));
    }
}
