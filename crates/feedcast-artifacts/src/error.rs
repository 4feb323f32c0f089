use feedcast_common::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact host request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("I/O error reading asset to upload: {0}")]
    Io(#[source] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl feedcast_common::error::Classify for ArtifactError {
    fn kind(&self) -> ErrorKind {
        match self {
            ArtifactError::Request(e) if e.is_timeout() || e.is_connect() => ErrorKind::Transient,
            ArtifactError::Request(e)
                if e.status().map(|s| s.is_server_error() || s.as_u16() == 429).unwrap_or(false) =>
            {
                ErrorKind::Transient
            }
            ArtifactError::Request(_) => ErrorKind::InputInvalid,
            ArtifactError::Io(_) => ErrorKind::ResourceExhausted,
            ArtifactError::Other(_) => ErrorKind::InputInvalid,
        }
    }
}
