//! A GitHub Releases-backed artifact host, grounded in `ai-client`'s
//! REST-client shape (typed request/response structs, `reqwest::Client`,
//! bearer auth header, explicit error-body capture on non-2xx) applied to
//! the GitHub Releases API — the "daily tag"/"asset"/`github_release_days`
//! retention vocabulary maps directly onto GitHub's releases-by-tag and
//! release-assets endpoints.

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

use crate::error::ArtifactError;
use crate::traits::{ArtifactHost, TagHandle, UploadedAsset};

pub struct GitHubArtifactHost {
    token: String,
    http: reqwest::Client,
    api_base_url: String,
    upload_base_url: String,
    owner_repo: String,
}

impl GitHubArtifactHost {
    /// `api_base_url` defaults to `https://api.github.com` in production;
    /// overridable for tests against a wiremock server.
    pub fn new(token: impl Into<String>, api_base_url: impl Into<String>, owner_repo: impl Into<String>) -> Self {
        let api_base_url = api_base_url.into();
        Self {
            token: token.into(),
            http: reqwest::Client::new(),
            upload_base_url: api_base_url.replace("api.github.com", "uploads.github.com"),
            api_base_url,
            owner_repo: owner_repo.into(),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token))
                .expect("token must be a valid header value"),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("feedcast-artifacts"));
        headers
    }
}

#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    id: i64,
}

#[async_trait]
impl ArtifactHost for GitHubArtifactHost {
    async fn ensure_tag(&self, tag: &str) -> Result<TagHandle, ArtifactError> {
        let get_url = format!(
            "{}/repos/{}/releases/tags/{}",
            self.api_base_url, self.owner_repo, tag
        );

        let response = self
            .http
            .get(&get_url)
            .headers(self.headers())
            .send()
            .await
            .map_err(ArtifactError::Request)?;

        if response.status().is_success() {
            let release: ReleaseResponse = response
                .json()
                .await
                .map_err(ArtifactError::Request)?;
            return Ok(TagHandle {
                tag: tag.to_string(),
                release_id: release.id,
            });
        }

        debug!(%tag, "release tag not found, creating");

        let create_url = format!("{}/repos/{}/releases", self.api_base_url, self.owner_repo);
        let response = self
            .http
            .post(&create_url)
            .headers(self.headers())
            .json(&serde_json::json!({ "tag_name": tag, "name": tag }))
            .send()
            .await
            .map_err(ArtifactError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ArtifactError::Other(anyhow!(
                "failed to create release tag {tag} ({status}): {body}"
            )));
        }

        let release: ReleaseResponse = response.json().await.map_err(ArtifactError::Request)?;
        Ok(TagHandle {
            tag: tag.to_string(),
            release_id: release.id,
        })
    }

    async fn upload_asset(
        &self,
        tag: &TagHandle,
        local_path: &std::path::Path,
        content_type: mime::Mime,
    ) -> Result<UploadedAsset, ArtifactError> {
        let bytes = tokio::fs::read(local_path).await.map_err(ArtifactError::Io)?;
        let size_bytes = bytes.len() as u64;
        let file_name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("asset")
            .to_string();

        let url = format!(
            "{}/repos/{}/releases/{}/assets?name={}",
            self.upload_base_url, self.owner_repo, tag.release_id, file_name
        );

        let mut headers = self.headers();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_str(content_type.as_ref())
                .map_err(|e| ArtifactError::Other(anyhow!(e)))?,
        );

        let response = self
            .http
            .post(&url)
            .headers(headers)
            .body(bytes)
            .send()
            .await
            .map_err(ArtifactError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ArtifactError::Other(anyhow!(
                "failed to upload asset for tag {} ({status}): {body}",
                tag.tag
            )));
        }

        #[derive(Deserialize)]
        struct AssetResponse {
            browser_download_url: String,
        }

        let asset: AssetResponse = response.json().await.map_err(ArtifactError::Request)?;
        Ok(UploadedAsset {
            url: asset.browser_download_url,
            size_bytes,
        })
    }

    async fn list_tags(&self) -> Result<Vec<String>, ArtifactError> {
        #[derive(Deserialize)]
        struct ListedRelease {
            tag_name: String,
        }

        const PER_PAGE: u32 = 100;
        let mut tags = Vec::new();
        let mut page: u32 = 1;

        loop {
            let url = format!(
                "{}/repos/{}/releases?per_page={PER_PAGE}&page={page}",
                self.api_base_url, self.owner_repo
            );
            let response = self
                .http
                .get(&url)
                .headers(self.headers())
                .send()
                .await
                .map_err(ArtifactError::Request)?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(ArtifactError::Other(anyhow!("failed to list releases ({status}): {body}")));
            }

            let releases: Vec<ListedRelease> = response.json().await.map_err(ArtifactError::Request)?;
            let got = releases.len();
            tags.extend(releases.into_iter().map(|r| r.tag_name));

            if got < PER_PAGE as usize {
                break;
            }
            page += 1;
        }

        Ok(tags)
    }

    async fn delete_tag(&self, tag: &str) -> Result<(), ArtifactError> {
        let get_url = format!(
            "{}/repos/{}/releases/tags/{}",
            self.api_base_url, self.owner_repo, tag
        );
        let response = self
            .http
            .get(&get_url)
            .headers(self.headers())
            .send()
            .await
            .map_err(ArtifactError::Request)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        if !response.status().is_success() {
            let status = response.status();
            return Err(ArtifactError::Other(anyhow!("failed to look up tag {tag} ({status})")));
        }

        let release: ReleaseResponse = response.json().await.map_err(ArtifactError::Request)?;
        let delete_url = format!(
            "{}/repos/{}/releases/{}",
            self.api_base_url, self.owner_repo, release.id
        );
        let response = self
            .http
            .delete(&delete_url)
            .headers(self.headers())
            .send()
            .await
            .map_err(ArtifactError::Request)?;

        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            let status = response.status();
            return Err(ArtifactError::Other(anyhow!("failed to delete tag {tag} ({status})")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn ensure_tag_creates_when_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/me/feedcast/releases/tags/daily-2026-07-28"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/me/feedcast/releases"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 42})))
            .mount(&server)
            .await;

        let host = GitHubArtifactHost::new("token", server.uri(), "me/feedcast");
        let handle = host.ensure_tag("daily-2026-07-28").await.unwrap();
        assert_eq!(handle.release_id, 42);
    }

    #[tokio::test]
    async fn ensure_tag_reuses_existing_release() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/me/feedcast/releases/tags/daily-2026-07-28"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 7})))
            .mount(&server)
            .await;

        let host = GitHubArtifactHost::new("token", server.uri(), "me/feedcast");
        let handle = host.ensure_tag("daily-2026-07-28").await.unwrap();
        assert_eq!(handle.release_id, 7);
    }

    #[tokio::test]
    async fn list_tags_follows_pagination() {
        let server = MockServer::start().await;
        let page1: Vec<_> = (0..100).map(|i| serde_json::json!({"tag_name": format!("daily-{i}")})).collect();
        let page2 = vec![serde_json::json!({"tag_name": "daily-100"})];

        Mock::given(method("GET"))
            .and(path("/repos/me/feedcast/releases"))
            .and(wiremock::matchers::query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&page1))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/me/feedcast/releases"))
            .and(wiremock::matchers::query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&page2))
            .mount(&server)
            .await;

        let host = GitHubArtifactHost::new("token", server.uri(), "me/feedcast");
        let tags = host.list_tags().await.unwrap();
        assert_eq!(tags.len(), 101);
        assert_eq!(tags[0], "daily-0");
        assert_eq!(tags[100], "daily-100");
    }

    #[tokio::test]
    async fn delete_tag_is_idempotent_when_already_gone() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/me/feedcast/releases/tags/daily-2026-07-20"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let host = GitHubArtifactHost::new("token", server.uri(), "me/feedcast");
        host.delete_tag("daily-2026-07-20").await.unwrap();
    }
}
