use std::time::Duration;

use anyhow::Result;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::settings::{LabSettings, Provider};
use crate::error::{LabError, LabResult};

/// Anything that turns a prompt into free-form text.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String, ServiceError>;
}

impl<T: TextGenerator + ?Sized> TextGenerator for Box<T> {
    fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        (**self).generate(prompt)
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("service returned no text")]
    EmptyResponse,
}

fn send(request: RequestBuilder) -> Result<Response, ServiceError> {
    let resp = request.send()?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().unwrap_or_default();
        return Err(ServiceError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp)
}

/* =========================
   OpenAI-compatible servers
   ========================= */

#[derive(Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: ChatMessageResponse,
}

#[derive(Deserialize)]
pub struct ChatMessageResponse {
    #[serde(default)]
    pub content: Option<String>,
}

/// Client for `/v1/chat/completions` endpoints (LM Studio, llama.cpp server,
/// OpenAI itself).
///
/// Not `Debug`: it may hold an API key.
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    http: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl OpenAiCompatibleClient {
    pub const DEFAULT_ENDPOINT: &'static str = "http://localhost:1234";

    pub fn new(http: Client, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: None,
            temperature: 0.7,
            max_tokens: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    pub fn check_connection(&self) -> Result<String> {
        let request = self.http.get(format!("{}/v1/models", self.endpoint));
        let resp: serde_json::Value = send(self.authorize(request))?.json()?;

        Ok(format!(
            "Connected to {} ({} models available)",
            self.endpoint,
            resp["data"].as_array().map(|a| a.len()).unwrap_or(0)
        ))
    }
}

impl TextGenerator for OpenAiCompatibleClient {
    fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let req = ChatCompletionRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            messages: vec![ChatMessage {
                role: "user".into(),
                content: prompt.to_string(),
            }],
        };

        let request = self
            .http
            .post(format!("{}/v1/chat/completions", self.endpoint))
            .json(&req);

        let resp: ChatCompletionResponse = send(self.authorize(request))?.json()?;

        resp.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.is_empty())
            .ok_or(ServiceError::EmptyResponse)
    }
}

/* =========================
   Google Gemini
   ========================= */

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Serialize)]
pub struct Part {
    pub text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    pub fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_output_tokens: Option<u32>,
}

impl GeminiClient {
    pub const DEFAULT_ENDPOINT: &'static str = "https://generativelanguage.googleapis.com";

    pub fn new(
        http: Client,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let model = model.into();
        Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            // Both "gemini-flash-latest" and "models/gemini-flash-latest" are accepted.
            model: model.trim_start_matches("models/").to_string(),
            api_key: api_key.into(),
            temperature: 0.7,
            max_output_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: Option<u32>) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn check_connection(&self) -> Result<String> {
        let request = self
            .http
            .get(format!("{}/v1beta/models", self.endpoint))
            .header("x-goog-api-key", &self.api_key);
        let resp: serde_json::Value = send(request)?.json()?;

        Ok(format!(
            "Connected to {} ({} models available)",
            self.endpoint,
            resp["models"].as_array().map(|a| a.len()).unwrap_or(0)
        ))
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let req = GenerateContentRequest {
            contents: vec![Content {
                role: "user".into(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let request = self
            .http
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.endpoint, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&req);

        let resp: GenerateContentResponse = send(request)?.json()?;
        resp.text().ok_or(ServiceError::EmptyResponse)
    }
}

/* =========================
   Configured client
   ========================= */

/// The backend selected by `LabSettings::provider`.
#[derive(Clone)]
pub enum LlmClient {
    Gemini(GeminiClient),
    OpenAiCompatible(OpenAiCompatibleClient),
}

impl LlmClient {
    pub fn from_settings(settings: &LabSettings, api_key: Option<&str>) -> LabResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(ServiceError::from)?;

        let client = match settings.provider {
            Provider::Gemini => {
                let api_key = api_key.ok_or_else(|| {
                    LabError::Configuration("the Gemini provider needs an API key".into())
                })?;
                LlmClient::Gemini(
                    GeminiClient::new(http, settings.endpoint(), settings.model(), api_key)
                        .with_temperature(settings.temperature)
                        .with_max_output_tokens(settings.max_output_tokens),
                )
            }
            Provider::OpenAiCompatible => LlmClient::OpenAiCompatible(
                OpenAiCompatibleClient::new(http, settings.endpoint(), settings.model())
                    .with_api_key(api_key.map(str::to_string))
                    .with_temperature(settings.temperature)
                    .with_max_tokens(settings.max_output_tokens),
            ),
        };

        log::info!(
            "using {:?} provider, model `{}` at {}",
            settings.provider,
            settings.model(),
            settings.endpoint()
        );
        Ok(client)
    }

    pub fn check_connection(&self) -> Result<String> {
        match self {
            LlmClient::Gemini(client) => client.check_connection(),
            LlmClient::OpenAiCompatible(client) => client.check_connection(),
        }
    }
}

impl TextGenerator for LlmClient {
    fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        match self {
            LlmClient::Gemini(client) => client.generate(prompt),
            LlmClient::OpenAiCompatible(client) => client.generate(prompt),
        }
    }
}
