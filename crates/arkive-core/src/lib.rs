// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Arkive archive bot.
//!
//! This crate provides the error taxonomy, the archive data model, and the
//! two adapter traits every other crate is written against: [`BlobStore`]
//! for the versioned remote content store and [`Notifier`] for the outbound
//! messaging API.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ArkiveError;
pub use traits::{BlobStore, Notifier};
pub use types::{
    ArchiveRecord, BlobEntry, ChatHandle, DeletionJob, Inbound, MediaKind, MessageHandle,
    UploadRequest, VersionToken, LARGE_CONTENT_THRESHOLD,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arkive_error_has_all_variants() {
        let _config = ArkiveError::Config("test".into());
        let _transport = ArkiveError::Transport {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _conflict = ArkiveError::Conflict {
            path: "archive.csv".into(),
        };
        let _serialization = ArkiveError::Serialization {
            source: Box::new(std::io::Error::other("test")),
        };
        let _internal = ArkiveError::Internal("test".into());
    }

    #[test]
    fn conflict_is_detectable() {
        let err = ArkiveError::Conflict {
            path: "deletions.json".into(),
        };
        assert!(err.is_conflict());
        assert!(err.to_string().contains("deletions.json"));
        assert!(!ArkiveError::transport("down").is_conflict());
    }

    #[test]
    fn serde_errors_convert() {
        let err: ArkiveError = serde_json::from_str::<Vec<DeletionJob>>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, ArkiveError::Serialization { .. }));
    }

    #[test]
    fn all_traits_are_object_safe() {
        fn _assert_blob_store(_: &dyn BlobStore) {}
        fn _assert_notifier(_: &dyn Notifier) {}
    }
}
