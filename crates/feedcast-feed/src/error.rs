use feedcast_common::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("feed fetch failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("feed parse failed: {0}")]
    Parse(#[from] feed_rs::parser::ParseFeedError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl feedcast_common::error::Classify for FeedError {
    fn kind(&self) -> ErrorKind {
        match self {
            FeedError::Request(e) if e.is_timeout() || e.is_connect() => ErrorKind::Transient,
            FeedError::Request(e) if e.status().map(|s| s.is_server_error()).unwrap_or(false) => {
                ErrorKind::Transient
            }
            FeedError::Request(_) => ErrorKind::InputInvalid,
            FeedError::Parse(_) => ErrorKind::InputInvalid,
            FeedError::Other(_) => ErrorKind::InputInvalid,
        }
    }
}
