//! A chat-completions client against any OpenAI-compatible endpoint,
//! grounded in `ai-client::openai::client::OpenAiClient`: same header
//! construction, same "non-2xx -> read body -> anyhow!" error shape, same
//! `base_url` override hook.

use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AiError;
use crate::traits::{ContentScorer, DigestMetadata, MetadataGenerator, ScoringTopic, ScriptGenerator};

pub struct OpenAiCompatibleClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl OpenAiCompatibleClient {
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

    async fn chat(&self, request: &ChatRequest) -> Result<String, AiError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %request.model, "LLM chat request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers())
            .json(request)
            .send()
            .await
            .map_err(AiError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Other(anyhow!("LLM error ({status}): {body}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AiError::MalformedResponse("no choices in LLM response".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    scores: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct MetadataResponse {
    title: String,
    summary: String,
    #[serde(default)]
    description: String,
}

#[async_trait]
impl ContentScorer for OpenAiCompatibleClient {
    async fn score(
        &self,
        transcript: &str,
        topics: &[ScoringTopic],
        model: &str,
        max_tokens: i64,
    ) -> Result<HashMap<String, f64>, AiError> {
        let topic_list = topics
            .iter()
            .map(|t| format!("- {}: {}", t.name, t.instructions_md))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Score this transcript against each topic below on a 0.0-1.0 scale. \
             Respond with JSON: {{\"scores\": {{\"<topic>\": <float>, ...}}}}.\n\n\
             Topics:\n{topic_list}\n\nTranscript:\n{transcript}"
        );

        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            response_format: Some(ResponseFormat { kind: "json_object" }),
        };

        let content = self.chat(&request).await?;
        let parsed: ScoreResponse = serde_json::from_str(&content)
            .map_err(|e| AiError::MalformedResponse(e.to_string()))?;

        for (topic, score) in &parsed.scores {
            if !(0.0..=1.0).contains(score) {
                return Err(AiError::MalformedResponse(format!(
                    "score for topic {topic} out of range: {score}"
                )));
            }
        }

        Ok(parsed.scores)
    }
}

#[async_trait]
impl ScriptGenerator for OpenAiCompatibleClient {
    async fn generate_script(
        &self,
        topic_name: &str,
        instructions_md: &str,
        transcripts: &[String],
        model: &str,
        max_output_tokens: i64,
    ) -> Result<String, AiError> {
        let joined = transcripts
            .iter()
            .enumerate()
            .map(|(i, t)| format!("### Episode {}\n{}", i + 1, t))
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = format!(
            "Write a spoken-word digest script for the topic \"{topic_name}\" \
             following these instructions:\n{instructions_md}\n\n\
             Source transcripts:\n{joined}"
        );

        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: max_output_tokens,
            response_format: None,
        };

        self.chat(&request).await
    }
}

#[async_trait]
impl MetadataGenerator for OpenAiCompatibleClient {
    async fn generate_metadata(
        &self,
        topic_name: &str,
        script_content: &str,
        model: &str,
        max_title_tokens: i64,
        max_summary_tokens: i64,
        max_description_tokens: i64,
    ) -> Result<DigestMetadata, AiError> {
        let prompt = format!(
            "Given this digest script for topic \"{topic_name}\", produce a short title, \
             a one-sentence summary, and a one-paragraph description. Respond with JSON: \
             {{\"title\": \"...\", \"summary\": \"...\", \"description\": \"...\"}}.\n\n\
             Script:\n{script_content}"
        );

        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: max_title_tokens + max_summary_tokens + max_description_tokens,
            response_format: Some(ResponseFormat { kind: "json_object" }),
        };

        let content = self.chat(&request).await?;
        let parsed: MetadataResponse = serde_json::from_str(&content)
            .map_err(|e| AiError::MalformedResponse(e.to_string()))?;

        Ok(DigestMetadata {
            title: parsed.title,
            summary: parsed.summary,
            description: parsed.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn scores_parses_json_response_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "{\"scores\": {\"ai\": 0.8}}"}}]
            })))
            .mount(&server)
            .await;

        let client = OpenAiCompatibleClient::new("test-key", server.uri());
        let topics = vec![ScoringTopic {
            name: "ai".to_string(),
            instructions_md: "AI news".to_string(),
        }];
        let scores = client
            .score("transcript text", &topics, "gpt-test", 100)
            .await
            .unwrap();
        assert_eq!(scores.get("ai"), Some(&0.8));
    }

    #[tokio::test]
    async fn out_of_range_score_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "{\"scores\": {\"ai\": 1.5}}"}}]
            })))
            .mount(&server)
            .await;

        let client = OpenAiCompatibleClient::new("test-key", server.uri());
        let topics = vec![ScoringTopic {
            name: "ai".to_string(),
            instructions_md: "AI news".to_string(),
        }];
        let result = client.score("transcript text", &topics, "gpt-test", 100).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn non_success_status_surfaces_as_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = OpenAiCompatibleClient::new("test-key", server.uri());
        let result = client
            .generate_script("ai", "instructions", &["t1".to_string()], "gpt-test", 100)
            .await;
        assert!(result.is_err());
    }
}
