//! Environment-sourced connection and credential configuration.
//!
//! Required variables are read eagerly at startup and panic (naming the
//! variable) rather than surface a deferred error deep in a request path.
//! This is the one place in the workspace a panic for missing config is
//! acceptable — everywhere else, a missing tunable is a `ConfigMissing`
//! error returned to a caller.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub tts_api_key: String,
    pub tts_base_url: String,
    pub artifact_host_token: String,
    pub artifact_host_base_url: String,
    pub artifact_host_owner_repo: String,
    pub whisper_model_path: String,
    pub bind_host: String,
    pub bind_port: u16,
}

impl Config {
    /// Reads every required variable from the process environment.
    ///
    /// Panics naming the missing variable if a required one is absent.
    /// Call `dotenvy::dotenv().ok()` before this in `main` if `.env` support
    /// is wanted; this function itself never touches the filesystem.
    pub fn from_env() -> Self {
        Config {
            database_url: required_env("DATABASE_URL"),
            llm_api_key: required_env("FEEDCAST_LLM_API_KEY"),
            llm_base_url: optional_env("FEEDCAST_LLM_BASE_URL", "https://api.openai.com/v1"),
            tts_api_key: required_env("FEEDCAST_TTS_API_KEY"),
            tts_base_url: optional_env("FEEDCAST_TTS_BASE_URL", "https://api.openai.com/v1"),
            artifact_host_token: required_env("FEEDCAST_ARTIFACT_HOST_TOKEN"),
            artifact_host_base_url: required_env("FEEDCAST_ARTIFACT_HOST_BASE_URL"),
            artifact_host_owner_repo: required_env("FEEDCAST_ARTIFACT_HOST_OWNER_REPO"),
            whisper_model_path: required_env("FEEDCAST_WHISPER_MODEL_PATH"),
            bind_host: optional_env("FEEDCAST_BIND_HOST", "0.0.0.0"),
            bind_port: optional_env("FEEDCAST_BIND_PORT", "8080")
                .parse()
                .expect("FEEDCAST_BIND_PORT must be a valid u16"),
        }
    }
}

fn required_env(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("missing required environment variable: {name}"))
}

fn optional_env(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}
