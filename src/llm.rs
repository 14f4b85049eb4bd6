use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::GenerationConfig;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("request to the generation service failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("generation service returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("could not decode generation response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("generation service returned no text")]
    EmptyResponse,
}

/// Turns a prompt into generated documentation text.
#[async_trait]
pub trait DocGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationParams,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationParams {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiResponse {
    /// Joined text of the first candidate, if it has any.
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

/// Client for the Gemini `generateContent` endpoint.
// Debug is written by hand to leave out the reqwest client.
pub struct GeminiClient {
    client: Client,
    api_key: SecretString,
    api_base: String,
    config: GenerationConfig,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &self.api_key)
            .field("api_base", &self.api_base)
            .field("config", &self.config)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(api_key: SecretString, config: GenerationConfig) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_base: DEFAULT_API_BASE.to_string(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request<'a>(&self, prompt: &'a str) -> GeminiRequest<'a> {
        GeminiRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationParams {
                max_output_tokens: self.config.max_output_tokens,
                temperature: self.config.temperature,
            },
        }
    }
}

#[async_trait]
impl DocGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        debug!(
            "Sending {} byte prompt to {} (max tokens: {}, temperature: {})",
            prompt.len(),
            self.config.model,
            self.config.max_output_tokens,
            self.config.temperature
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(GenerationError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api { status, body });
        }

        let body: GeminiResponse = response.json().await.map_err(GenerationError::Decode)?;
        body.into_text().ok_or(GenerationError::EmptyResponse)
    }
}
