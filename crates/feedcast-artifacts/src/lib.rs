pub mod error;
pub mod github;
pub mod traits;

pub use error::ArtifactError;
pub use github::GitHubArtifactHost;
pub use traits::{ArtifactHost, TagHandle, UploadedAsset};
