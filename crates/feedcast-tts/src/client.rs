//! HTTP client against an OpenAI-compatible `/audio/speech` endpoint:
//! POSTs a JSON body (`{model, input, voice}`) and reads back raw audio
//! bytes.

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::TtsError;
use crate::traits::TtsClient;

pub struct HttpTtsClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl HttpTtsClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .expect("api key must be a valid header value"),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }
}

#[async_trait]
impl TtsClient for HttpTtsClient {
    async fn synthesize(&self, script: &str, voice_id: &str, model: &str) -> Result<Vec<u8>, TtsError> {
        let url = format!("{}/audio/speech", self.base_url);
        let body = serde_json::json!({
            "model": model,
            "voice": voice_id,
            "input": script,
            "response_format": "mp3",
        });

        let response = self
            .http
            .post(&url)
            .headers(self.headers())
            .json(&body)
            .send()
            .await
            .map_err(TtsError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(TtsError::Other(anyhow!("TTS error ({status}): {text}")));
        }

        Ok(response.bytes().await.map_err(TtsError::Request)?.to_vec())
    }
}
