use async_trait::async_trait;

use crate::error::ArtifactError;

/// The artifact host boundary. `ensure_tag`/`delete_tag`
/// operate on a "tag" handle (a GitHub release tag in the concrete
/// implementation); `upload_asset` attaches a file to that tag.
#[async_trait]
pub trait ArtifactHost: Send + Sync {
    async fn ensure_tag(&self, tag: &str) -> Result<TagHandle, ArtifactError>;
    async fn upload_asset(
        &self,
        tag: &TagHandle,
        local_path: &std::path::Path,
        content_type: mime::Mime,
    ) -> Result<UploadedAsset, ArtifactError>;
    async fn list_tags(&self) -> Result<Vec<String>, ArtifactError>;
    async fn delete_tag(&self, tag: &str) -> Result<(), ArtifactError>;
}

#[derive(Debug, Clone)]
pub struct TagHandle {
    pub tag: String,
    pub release_id: i64,
}

#[derive(Debug, Clone)]
pub struct UploadedAsset {
    pub url: String,
    pub size_bytes: u64,
}
