// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock notifier for deterministic testing.
//!
//! `MockNotifier` implements `Notifier`, capturing every send and delete for
//! assertion and allowing individual deletions to be made to fail.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use arkive_core::{ArkiveError, ChatHandle, MediaKind, MessageHandle, Notifier};

/// A message captured by [`MockNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Text {
        chat: ChatHandle,
        handle: MessageHandle,
        text: String,
    },
    Media {
        chat: ChatHandle,
        handle: MessageHandle,
        kind: MediaKind,
        file_ref: String,
        caption: Option<String>,
    },
}

impl SentMessage {
    pub fn handle(&self) -> MessageHandle {
        match self {
            Self::Text { handle, .. } | Self::Media { handle, .. } => *handle,
        }
    }
}

/// A mock outbound messaging API.
pub struct MockNotifier {
    next_handle: AtomicI32,
    sent: Mutex<Vec<SentMessage>>,
    deleted: Mutex<Vec<(ChatHandle, MessageHandle)>>,
    failing_deletes: Mutex<HashSet<(ChatHandle, MessageHandle)>>,
    fail_sends: AtomicBool,
}

impl MockNotifier {
    /// Create a notifier whose first message handle is 1000.
    pub fn new() -> Self {
        Self {
            next_handle: AtomicI32::new(1000),
            sent: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            failing_deletes: Mutex::new(HashSet::new()),
            fail_sends: AtomicBool::new(false),
        }
    }

    /// All messages sent so far, in order.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Text bodies of all plain text messages sent so far.
    pub async fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|m| match m {
                SentMessage::Text { text, .. } => Some(text.clone()),
                SentMessage::Media { .. } => None,
            })
            .collect()
    }

    /// Messages deleted so far, in order.
    pub async fn deleted(&self) -> Vec<(ChatHandle, MessageHandle)> {
        self.deleted.lock().await.clone()
    }

    /// Make deletion of one specific message fail.
    pub async fn fail_delete_of(&self, chat: ChatHandle, message: MessageHandle) {
        self.failing_deletes.lock().await.insert((chat, message));
    }

    /// Make every subsequent send fail with a transport error.
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    async fn record_media(
        &self,
        chat: ChatHandle,
        kind: MediaKind,
        file_ref: &str,
        caption: Option<&str>,
    ) -> Result<MessageHandle, ArkiveError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(ArkiveError::transport("injected send failure"));
        }
        let handle = MessageHandle(self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.sent.lock().await.push(SentMessage::Media {
            chat,
            handle,
            kind,
            file_ref: file_ref.to_string(),
            caption: caption.map(str::to_string),
        });
        Ok(handle)
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send_text(&self, chat: ChatHandle, text: &str) -> Result<MessageHandle, ArkiveError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(ArkiveError::transport("injected send failure"));
        }
        let handle = MessageHandle(self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.sent.lock().await.push(SentMessage::Text {
            chat,
            handle,
            text: text.to_string(),
        });
        Ok(handle)
    }

    async fn send_photo(
        &self,
        chat: ChatHandle,
        file_ref: &str,
        caption: Option<&str>,
    ) -> Result<MessageHandle, ArkiveError> {
        self.record_media(chat, MediaKind::Photo, file_ref, caption).await
    }

    async fn send_document(
        &self,
        chat: ChatHandle,
        file_ref: &str,
        caption: Option<&str>,
    ) -> Result<MessageHandle, ArkiveError> {
        self.record_media(chat, MediaKind::Document, file_ref, caption)
            .await
    }

    async fn send_video(
        &self,
        chat: ChatHandle,
        file_ref: &str,
        caption: Option<&str>,
    ) -> Result<MessageHandle, ArkiveError> {
        self.record_media(chat, MediaKind::Video, file_ref, caption).await
    }

    async fn delete_message(
        &self,
        chat: ChatHandle,
        message: MessageHandle,
    ) -> Result<(), ArkiveError> {
        if self.failing_deletes.lock().await.contains(&(chat, message)) {
            return Err(ArkiveError::transport(format!(
                "injected delete failure for {chat}/{message}"
            )));
        }
        self.deleted.lock().await.push((chat, message));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_media_dispatches_by_kind() {
        let notifier = MockNotifier::new();
        let handle = notifier
            .send_media(ChatHandle(1), MediaKind::Video, "vid-ref", Some("clip.mp4"))
            .await
            .unwrap();

        let sent = notifier.sent_messages().await;
        assert_eq!(
            sent,
            vec![SentMessage::Media {
                chat: ChatHandle(1),
                handle,
                kind: MediaKind::Video,
                file_ref: "vid-ref".into(),
                caption: Some("clip.mp4".into()),
            }]
        );
    }

    #[tokio::test]
    async fn handles_increment() {
        let notifier = MockNotifier::new();
        let a = notifier.send_text(ChatHandle(1), "a").await.unwrap();
        let b = notifier.send_text(ChatHandle(1), "b").await.unwrap();
        assert_eq!(b.0, a.0 + 1);
        assert_eq!(notifier.sent_texts().await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn injected_delete_failure_is_scoped_to_one_message() {
        let notifier = MockNotifier::new();
        notifier
            .fail_delete_of(ChatHandle(1), MessageHandle(5))
            .await;

        assert!(
            notifier
                .delete_message(ChatHandle(1), MessageHandle(5))
                .await
                .is_err()
        );
        notifier
            .delete_message(ChatHandle(1), MessageHandle(6))
            .await
            .unwrap();
        assert_eq!(
            notifier.deleted().await,
            vec![(ChatHandle(1), MessageHandle(6))]
        );
    }
}
