// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update classification, uploader authorization, and display-name derivation.
//!
//! Turns a Telegram update into a channel-agnostic [`Inbound`] value so the
//! archiving logic never touches teloxide types.

use arkive_core::{ChatHandle, Inbound, MediaKind, UploadRequest};
use teloxide::prelude::*;
use teloxide::types::{Update, UpdateKind};
use tracing::debug;

/// Checks whether the sender may upload.
///
/// An empty allowlist admits everyone. Otherwise the sender's user id or
/// username (with or without `@`) must be listed. Messages without a sender
/// are rejected.
pub fn is_authorized(msg: &Message, allowed_users: &[String]) -> bool {
    if allowed_users.is_empty() {
        return true;
    }

    let Some(user) = msg.from.as_ref() else {
        return false;
    };
    let user_id_str = user.id.0.to_string();

    allowed_users.iter().any(|allowed| {
        *allowed == user_id_str
            || user.username.as_deref().is_some_and(|username| {
                username.eq_ignore_ascii_case(allowed.strip_prefix('@').unwrap_or(allowed))
            })
    })
}

/// Classifies a webhook update. Anything but a new message is ignored.
pub fn classify_update(update: &Update, allowed_users: &[String]) -> Inbound {
    match &update.kind {
        UpdateKind::Message(msg) => classify(msg, allowed_users),
        _ => {
            debug!(update_id = update.id.0, "ignoring non-message update");
            Inbound::Ignored
        }
    }
}

/// Classifies one message.
pub fn classify(msg: &Message, allowed_users: &[String]) -> Inbound {
    let chat = ChatHandle(msg.chat.id.0);

    if let Some(upload) = extract_upload(msg) {
        if !is_authorized(msg, allowed_users) {
            debug!(msg_id = msg.id.0, "ignoring upload from unauthorized sender");
            return Inbound::Ignored;
        }
        return Inbound::Upload(upload);
    }

    let Some(text) = msg.text() else {
        debug!(msg_id = msg.id.0, "ignoring unsupported message type");
        return Inbound::Ignored;
    };

    let mut tokens = text.split_whitespace();
    let command = tokens.next().and_then(parse_command);
    match command.as_deref() {
        Some("start") | Some("get") => Inbound::Retrieve {
            chat,
            logical_id: tokens.next().map(str::to_string),
        },
        Some("debug") => Inbound::Debug { chat },
        _ => Inbound::Ignored,
    }
}

/// `/Start@arkive_bot` -> `start`. `None` when `token` is not a command.
fn parse_command(token: &str) -> Option<String> {
    let body = token.strip_prefix('/')?;
    let name = body.split('@').next().unwrap_or(body);
    (!name.is_empty()).then(|| name.to_ascii_lowercase())
}

fn extract_upload(msg: &Message) -> Option<UploadRequest> {
    let chat = ChatHandle(msg.chat.id.0);

    let (kind, file_ref, file_name) = if let Some(doc) = msg.document() {
        (MediaKind::Document, doc.file.id.to_string(), doc.file_name.clone())
    } else if let Some(video) = msg.video() {
        (MediaKind::Video, video.file.id.to_string(), video.file_name.clone())
    } else if let Some(photos) = msg.photo() {
        // Telegram lists sizes ascending; the last one is the largest.
        let largest = photos.last()?;
        (MediaKind::Photo, largest.file.id.to_string(), None)
    } else {
        return None;
    };

    Some(UploadRequest {
        chat,
        external_file_ref: file_ref,
        display_name: display_name(kind, file_name.as_deref(), msg.caption(), msg.id.0),
        media_kind: kind,
    })
}

/// File name, else caption, else `<kind>_<message id>.<ext>`. Line breaks
/// become spaces.
pub fn display_name(
    kind: MediaKind,
    file_name: Option<&str>,
    caption: Option<&str>,
    message_id: i32,
) -> String {
    let chosen = [file_name, caption]
        .into_iter()
        .flatten()
        .map(|s| s.replace(['\r', '\n'], " ").trim().to_string())
        .find(|s| !s.is_empty());

    chosen.unwrap_or_else(|| {
        let ext = match kind {
            MediaKind::Document => "bin",
            MediaKind::Photo => "jpg",
            MediaKind::Video => "mp4",
        };
        format!("{kind}_{message_id}.{ext}")
    })
}
