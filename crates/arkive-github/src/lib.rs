// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! GitHub-backed [`BlobStore`] for the Arkive archive bot.
//!
//! Files are read and written through the repository contents API, which
//! gives every write a new blob sha used as the optimistic-concurrency
//! [`VersionToken`]. Content above 1 MiB is not inlined by the contents
//! endpoint, so [`GithubBlobStore::read_large`] fetches it through the
//! immutable git-blob endpoint keyed by that same sha.

pub mod types;

use std::time::Duration;

use arkive_config::model::GithubConfig;
use arkive_core::{ArkiveError, BlobEntry, BlobStore, VersionToken};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{StatusCode, Url};
use tracing::{debug, info, warn};

use crate::types::{
    ApiErrorResponse, BlobResponse, Committer, ContentsResponse, PutContentsRequest,
    PutContentsResponse,
};

const API_VERSION: &str = "2022-11-28";

/// Default media type for every request.
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Media type for contents reads. Files between 1 and 100 MiB are only
/// described under it, as `encoding: "none"` with an empty `content`.
const OBJECT_MEDIA_TYPE: &str = "application/vnd.github.object+json";

/// Delay before retrying a read after a transient status.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Blob store over one branch of one GitHub repository.
#[derive(Debug, Clone)]
pub struct GithubBlobStore {
    client: reqwest::Client,
    api_base: String,
    owner: String,
    repo: String,
    branch: String,
    committer: Option<Committer>,
    max_retries: u32,
}

impl GithubBlobStore {
    /// Creates a client from the `[github]` config section.
    ///
    /// Requires `token`, `owner`, and `repo` to be set.
    pub fn new(config: &GithubConfig) -> Result<Self, ArkiveError> {
        let token = config
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ArkiveError::Config("github.token is required".into()))?;

        if config.owner.is_empty() || config.repo.is_empty() {
            return Err(ArkiveError::Config(
                "github.owner and github.repo are required".into(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                ArkiveError::Config(format!("invalid github.token header value: {e}"))
            })?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(JSON_MEDIA_TYPE),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(API_VERSION),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("arkive/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ArkiveError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let committer = match (&config.committer_name, &config.committer_email) {
            (Some(name), Some(email)) => Some(Committer {
                name: name.clone(),
                email: email.clone(),
            }),
            _ => None,
        };

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
            committer,
            max_retries: 1,
        })
    }

    /// Builds `{api_base}/repos/{owner}/{repo}/{segments...}` with each
    /// segment percent-encoded.
    fn repo_url<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Result<Url, ArkiveError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| ArkiveError::Config(format!("invalid github.api_base: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ArkiveError::Config("github.api_base cannot be a base URL".into()))?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str()])
            .extend(segments);
        Ok(url)
    }

    fn contents_url(&self, path: &str) -> Result<Url, ArkiveError> {
        let segments = std::iter::once("contents").chain(path.split('/').filter(|s| !s.is_empty()));
        self.repo_url(segments)
    }

    /// GETs a URL with the given `Accept` media type, retrying once on
    /// transient statuses. `Ok(None)` on 404.
    async fn get(
        &self,
        url: Url,
        accept: &'static str,
    ) -> Result<Option<reqwest::Response>, ArkiveError> {
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, url = %url, "retrying GitHub read after transient error");
                tokio::time::sleep(RETRY_DELAY).await;
            }

            let response = self
                .client
                .get(url.clone())
                .header(ACCEPT, accept)
                .send()
                .await
                .map_err(|e| ArkiveError::Transport {
                    message: format!("GitHub request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, url = %url, "GitHub read response");

            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if status.is_success() {
                return Ok(Some(response));
            }
            if is_transient_error(status) && attempt < self.max_retries {
                continue;
            }
            return Err(api_error(status, response).await);
        }

        Err(ArkiveError::transport("GitHub read failed after retries"))
    }
}

#[async_trait]
impl BlobStore for GithubBlobStore {
    async fn read(&self, path: &str) -> Result<Option<BlobEntry>, ArkiveError> {
        let mut url = self.contents_url(path)?;
        url.query_pairs_mut().append_pair("ref", &self.branch);

        let Some(response) = self.get(url, OBJECT_MEDIA_TYPE).await? else {
            debug!(path, "path does not exist");
            return Ok(None);
        };

        let body: ContentsResponse = response.json().await.map_err(|e| ArkiveError::Transport {
            message: format!("failed to parse contents response for `{path}`: {e}"),
            source: Some(Box::new(e)),
        })?;

        // Anything not inlined as base64 (GitHub uses "none" above 1 MiB) is
        // left for the blob endpoint.
        let content = match body.encoding.as_deref() {
            Some("base64") => Some(decode_base64(body.content.as_deref().unwrap_or_default())?),
            _ => None,
        };

        debug!(
            path,
            sha = %body.sha,
            size = body.size,
            inline = content.is_some(),
            "read contents"
        );
        Ok(Some(BlobEntry {
            version: VersionToken(body.sha),
            size: body.size,
            content,
        }))
    }

    async fn read_large(&self, version: &VersionToken) -> Result<String, ArkiveError> {
        let url = self.repo_url(["git", "blobs", version.0.as_str()])?;
        let response = self.get(url, JSON_MEDIA_TYPE).await?.ok_or_else(|| {
            ArkiveError::transport(format!("blob {version} not found"))
        })?;

        let body: BlobResponse = response.json().await.map_err(|e| ArkiveError::Transport {
            message: format!("failed to parse blob response for {version}: {e}"),
            source: Some(Box::new(e)),
        })?;

        let content = match body.encoding.as_str() {
            "base64" => decode_base64(&body.content)?,
            _ => body.content,
        };
        debug!(sha = %version, bytes = content.len(), "read large blob");
        Ok(content)
    }

    async fn write(
        &self,
        path: &str,
        content: &str,
        expected: Option<&VersionToken>,
        message: &str,
    ) -> Result<VersionToken, ArkiveError> {
        let url = self.contents_url(path)?;
        let body = PutContentsRequest {
            message,
            content: STANDARD.encode(content),
            branch: &self.branch,
            sha: expected.map(|v| v.0.as_str()),
            committer: self.committer.as_ref(),
        };

        let response = self
            .client
            .put(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ArkiveError::Transport {
                message: format!("GitHub write of `{path}` failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if status.is_success() {
            let written: PutContentsResponse =
                response.json().await.map_err(|e| ArkiveError::Transport {
                    message: format!("failed to parse write response for `{path}`: {e}"),
                    source: Some(Box::new(e)),
                })?;
            info!(path, sha = %written.content.sha, created = expected.is_none(), "wrote contents");
            return Ok(VersionToken(written.content.sha));
        }

        // 409: sha does not match. 422: sha missing for an existing file or
        // supplied for a missing one. 404 with a token: the file vanished.
        let conflict = matches!(status, StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY)
            || (status == StatusCode::NOT_FOUND && expected.is_some());
        if conflict {
            warn!(path, status = %status, "write rejected: version token is stale");
            return Err(ArkiveError::Conflict {
                path: path.to_string(),
            });
        }

        Err(api_error(status, response).await)
    }
}

/// Decodes GitHub's line-wrapped base64 into UTF-8 text.
fn decode_base64(encoded: &str) -> Result<String, ArkiveError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact).map_err(|e| ArkiveError::Serialization {
        source: Box::new(e),
    })?;
    String::from_utf8(bytes).map_err(|e| ArkiveError::Serialization {
        source: Box::new(e),
    })
}

async fn api_error(status: StatusCode, response: reqwest::Response) -> ArkiveError {
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ApiErrorResponse>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    ArkiveError::transport(format!("GitHub API returned {status}: {detail}"))
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> GithubConfig {
        GithubConfig {
            token: Some("ghp_test".into()),
            owner: "alice".into(),
            repo: "vault".into(),
            api_base: base_url.into(),
            ..GithubConfig::default()
        }
    }

    fn test_store(server: &MockServer) -> GithubBlobStore {
        GithubBlobStore::new(&test_config(&server.uri())).unwrap()
    }

    #[test]
    fn new_requires_token_and_repo() {
        let mut config = test_config("https://api.github.com");
        config.token = None;
        assert!(GithubBlobStore::new(&config).is_err());

        let mut config = test_config("https://api.github.com");
        config.repo = String::new();
        assert!(GithubBlobStore::new(&config).is_err());
    }

    #[test]
    fn contents_url_encodes_segments() {
        let store = GithubBlobStore::new(&test_config("https://api.github.com/")).unwrap();
        let url = store.contents_url("data/my index.csv").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/alice/vault/contents/data/my%20index.csv"
        );
    }

    #[test]
    fn decode_base64_ignores_line_wrapping() {
        assert_eq!(decode_base64("aGVs\nbG8=\n").unwrap(), "hello");
        assert!(decode_base64("!!!").is_err());
    }

    #[tokio::test]
    async fn read_inline_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/vault/contents/archive.csv"))
            .and(query_param("ref", "main"))
            .and(header("authorization", "Bearer ghp_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "type": "file",
                "sha": "sha-1",
                "size": 5,
                "content": "aGVs\nbG8=\n",
                "encoding": "base64",
            })))
            .mount(&server)
            .await;

        let entry = test_store(&server).read("archive.csv").await.unwrap().unwrap();
        assert_eq!(entry.version, VersionToken("sha-1".into()));
        assert_eq!(entry.size, 5);
        assert_eq!(entry.content.as_deref(), Some("hello"));
        assert!(!entry.is_large());
    }

    #[tokio::test]
    async fn read_missing_file_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"message": "Not Found"})),
            )
            .mount(&server)
            .await;

        assert!(test_store(&server).read("archive.csv").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn read_large_file_defers_to_blob_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/vault/contents/archive.csv"))
            .and(header("accept", "application/vnd.github.object+json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "type": "file",
                "sha": "big-sha",
                "size": 2_000_000,
                "content": "",
                "encoding": "none",
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/vault/git/blobs/big-sha"))
            .and(header("accept", "application/vnd.github+json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sha": "big-sha",
                "size": 5,
                "content": "aGVsbG8=",
                "encoding": "base64",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = test_store(&server);
        let entry = store.read("archive.csv").await.unwrap().unwrap();
        assert!(entry.is_large());
        assert!(entry.content.is_none());

        let content = store.read_large(&entry.version).await.unwrap();
        assert_eq!(content, "hello");
    }

    #[tokio::test]
    async fn read_retries_once_on_503() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let err = test_store(&server).read("archive.csv").await.unwrap_err();
        assert!(matches!(err, ArkiveError::Transport { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn create_omits_sha_and_returns_new_version() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/repos/alice/vault/contents/archive.csv"))
            .and(body_partial_json(serde_json::json!({
                "message": "archive: create index",
                "content": "aGVsbG8=",
                "branch": "main",
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "content": {"sha": "sha-new", "path": "archive.csv"},
                "commit": {"sha": "commit-1"},
            })))
            .mount(&server)
            .await;

        let version = test_store(&server)
            .write("archive.csv", "hello", None, "archive: create index")
            .await
            .unwrap();
        assert_eq!(version, VersionToken("sha-new".into()));

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body.get("sha").is_none(), "create must not send a sha");
    }

    #[tokio::test]
    async fn replace_sends_expected_sha() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(body_partial_json(serde_json::json!({"sha": "sha-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": {"sha": "sha-2"},
            })))
            .mount(&server)
            .await;

        let version = test_store(&server)
            .write("archive.csv", "x", Some(&VersionToken("sha-1".into())), "archive: add")
            .await
            .unwrap();
        assert_eq!(version.0, "sha-2");
    }

    #[tokio::test]
    async fn stale_sha_is_a_conflict() {
        for status in [409u16, 422] {
            let server = MockServer::start().await;
            Mock::given(method("PUT"))
                .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
                    "message": "archive.csv does not match sha-0",
                })))
                .mount(&server)
                .await;

            let err = test_store(&server)
                .write("archive.csv", "x", Some(&VersionToken("sha-0".into())), "archive: add")
                .await
                .unwrap_err();
            assert!(err.is_conflict(), "status {status} should map to conflict, got {err:?}");
        }
    }

    #[tokio::test]
    async fn server_error_on_write_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "message": "Server Error",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = test_store(&server)
            .write("archive.csv", "x", None, "archive: create index")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Server Error"), "got: {err}");
    }
}
