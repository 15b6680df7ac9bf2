// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Arkive archive bot.

use thiserror::Error;

/// The primary error type used across all Arkive adapters and stores.
///
/// "Not found" is deliberately absent: every read boundary reports a missing
/// path or id as `None` instead of an error.
#[derive(Debug, Error)]
pub enum ArkiveError {
    /// Configuration errors (missing credentials, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// The remote store or the notification API was unreachable or answered
    /// with a non-success status.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A write supplied a version token that no longer matches the remote path.
    #[error("version conflict writing `{path}`: the file changed since it was read")]
    Conflict { path: String },

    /// Stored content could not be encoded or decoded.
    #[error("serialization error: {source}")]
    Serialization {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ArkiveError {
    /// Builds a [`ArkiveError::Transport`] without an underlying source.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Returns `true` when the error is a lost optimistic-concurrency race.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<serde_json::Error> for ArkiveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            source: Box::new(err),
        }
    }
}
