use feedcast_common::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum RssError {
    #[error(transparent)]
    Store(#[from] feedcast_store::StoreError),

    #[error("failed to render RSS document: {0}")]
    Render(String),
}

impl feedcast_common::error::Classify for RssError {
    fn kind(&self) -> ErrorKind {
        match self {
            RssError::Store(e) => feedcast_common::error::Classify::kind(e),
            RssError::Render(_) => ErrorKind::IntegrityViolation,
        }
    }
}
