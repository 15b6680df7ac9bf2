// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notifier trait for the outbound messaging API.

use async_trait::async_trait;

use crate::error::ArkiveError;
use crate::types::{ChatHandle, MediaKind, MessageHandle};

/// Sends and deletes user-facing messages.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Sends a plain text message.
    async fn send_text(&self, chat: ChatHandle, text: &str) -> Result<MessageHandle, ArkiveError>;

    /// Sends a photo by its platform file handle.
    async fn send_photo(
        &self,
        chat: ChatHandle,
        file_ref: &str,
        caption: Option<&str>,
    ) -> Result<MessageHandle, ArkiveError>;

    /// Sends a document by its platform file handle.
    async fn send_document(
        &self,
        chat: ChatHandle,
        file_ref: &str,
        caption: Option<&str>,
    ) -> Result<MessageHandle, ArkiveError>;

    /// Sends a video by its platform file handle.
    async fn send_video(
        &self,
        chat: ChatHandle,
        file_ref: &str,
        caption: Option<&str>,
    ) -> Result<MessageHandle, ArkiveError>;

    /// Deletes a previously sent message.
    async fn delete_message(
        &self,
        chat: ChatHandle,
        message: MessageHandle,
    ) -> Result<(), ArkiveError>;

    /// Re-sends an archived file using the method matching its kind.
    async fn send_media(
        &self,
        chat: ChatHandle,
        kind: MediaKind,
        file_ref: &str,
        caption: Option<&str>,
    ) -> Result<MessageHandle, ArkiveError> {
        match kind {
            MediaKind::Document => self.send_document(chat, file_ref, caption).await,
            MediaKind::Photo => self.send_photo(chat, file_ref, caption).await,
            MediaKind::Video => self.send_video(chat, file_ref, caption).await,
        }
    }
}
