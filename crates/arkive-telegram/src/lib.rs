// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram integration for the Arkive archive bot.
//!
//! [`TelegramNotifier`] implements [`Notifier`] over the Bot API via teloxide.
//! Archived files are re-sent by their Telegram `file_id`, so nothing is
//! downloaded or uploaded. [`handler`] classifies inbound webhook updates.

pub mod handler;

pub use teloxide::types::Update;

use arkive_config::model::TelegramConfig;
use arkive_core::{ArkiveError, ChatHandle, MessageHandle, Notifier};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, FileId, InputFile, MessageId, Recipient};
use tracing::debug;

/// Outbound messaging through the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    /// Creates a notifier from the `[telegram]` config section.
    ///
    /// Requires `bot_token` to be set.
    pub fn new(config: &TelegramConfig) -> Result<Self, ArkiveError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            ArkiveError::Config("telegram.bot_token is required to reach Telegram".into())
        })?;

        if token.is_empty() {
            return Err(ArkiveError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        Ok(Self {
            bot: Bot::new(token),
        })
    }

    /// Wraps an existing bot, e.g. one pointed at a different API URL.
    pub fn from_bot(bot: Bot) -> Self {
        Self { bot }
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

fn recipient(chat: ChatHandle) -> Recipient {
    Recipient::Id(ChatId(chat.0))
}

fn input_file(file_ref: &str) -> InputFile {
    InputFile::file_id(FileId(file_ref.to_string()))
}

fn send_error(what: &str, e: teloxide::RequestError) -> ArkiveError {
    ArkiveError::Transport {
        message: format!("failed to send {what}: {e}"),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, chat: ChatHandle, text: &str) -> Result<MessageHandle, ArkiveError> {
        let sent = self
            .bot
            .send_message(recipient(chat), text)
            .await
            .map_err(|e| send_error("message", e))?;
        debug!(chat = %chat, msg_id = sent.id.0, "sent text");
        Ok(MessageHandle(sent.id.0))
    }

    async fn send_photo(
        &self,
        chat: ChatHandle,
        file_ref: &str,
        caption: Option<&str>,
    ) -> Result<MessageHandle, ArkiveError> {
        let mut request = self.bot.send_photo(recipient(chat), input_file(file_ref));
        if let Some(caption) = caption {
            request = request.caption(caption);
        }
        let sent = request.await.map_err(|e| send_error("photo", e))?;
        debug!(chat = %chat, msg_id = sent.id.0, "sent photo");
        Ok(MessageHandle(sent.id.0))
    }

    async fn send_document(
        &self,
        chat: ChatHandle,
        file_ref: &str,
        caption: Option<&str>,
    ) -> Result<MessageHandle, ArkiveError> {
        let mut request = self
            .bot
            .send_document(recipient(chat), input_file(file_ref));
        if let Some(caption) = caption {
            request = request.caption(caption);
        }
        let sent = request.await.map_err(|e| send_error("document", e))?;
        debug!(chat = %chat, msg_id = sent.id.0, "sent document");
        Ok(MessageHandle(sent.id.0))
    }

    async fn send_video(
        &self,
        chat: ChatHandle,
        file_ref: &str,
        caption: Option<&str>,
    ) -> Result<MessageHandle, ArkiveError> {
        let mut request = self.bot.send_video(recipient(chat), input_file(file_ref));
        if let Some(caption) = caption {
            request = request.caption(caption);
        }
        let sent = request.await.map_err(|e| send_error("video", e))?;
        debug!(chat = %chat, msg_id = sent.id.0, "sent video");
        Ok(MessageHandle(sent.id.0))
    }

    async fn delete_message(
        &self,
        chat: ChatHandle,
        message: MessageHandle,
    ) -> Result<(), ArkiveError> {
        self.bot
            .delete_message(recipient(chat), MessageId(message.0))
            .await
            .map_err(|e| ArkiveError::Transport {
                message: format!("failed to delete message {message} in chat {chat}: {e}"),
                source: Some(Box::new(e)),
            })?;
        debug!(chat = %chat, msg_id = message.0, "deleted message");
        Ok(())
    }
}
