// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the GitHub REST contents and git-blob endpoints.

use serde::{Deserialize, Serialize};

/// `GET /repos/{owner}/{repo}/contents/{path}` for a file.
///
/// For files above 1 MiB GitHub returns an empty `content` with
/// `encoding: "none"`.
#[derive(Debug, Deserialize)]
pub struct ContentsResponse {
    pub sha: String,
    pub size: u64,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

/// `GET /repos/{owner}/{repo}/git/blobs/{sha}`.
#[derive(Debug, Deserialize)]
pub struct BlobResponse {
    pub content: String,
    pub encoding: String,
}

/// Commit identity attached to a contents write.
#[derive(Debug, Clone, Serialize)]
pub struct Committer {
    pub name: String,
    pub email: String,
}

/// `PUT /repos/{owner}/{repo}/contents/{path}` body.
#[derive(Debug, Serialize)]
pub struct PutContentsRequest<'a> {
    pub message: &'a str,
    /// Base64-encoded file content.
    pub content: String,
    pub branch: &'a str,
    /// Current blob sha; omitted when creating the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committer: Option<&'a Committer>,
}

/// Response to a successful contents write.
#[derive(Debug, Deserialize)]
pub struct PutContentsResponse {
    pub content: ContentRef,
}

#[derive(Debug, Deserialize)]
pub struct ContentRef {
    pub sha: String,
}

/// Error body returned by the GitHub API.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub message: String,
}
