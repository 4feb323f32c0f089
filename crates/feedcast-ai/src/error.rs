use feedcast_common::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("LLM call failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("LLM returned a response that did not match the expected schema: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl feedcast_common::error::Classify for AiError {
    fn kind(&self) -> ErrorKind {
        match self {
            AiError::Request(e) if e.is_timeout() || e.is_connect() => ErrorKind::Transient,
            AiError::Request(e) if e.status().map(|s| s.is_server_error()).unwrap_or(false) => {
                ErrorKind::Transient
            }
            AiError::Request(_) => ErrorKind::InputInvalid,
            AiError::MalformedResponse(_) => ErrorKind::InputInvalid,
            AiError::Other(_) => ErrorKind::InputInvalid,
        }
    }
}
