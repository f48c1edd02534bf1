//! Markdown drafting through Google's Gemini text API.
//!
//! Models are tried one after another until one answers; there is no
//! backoff and no parallelism.

use std::time::Duration;

use axum::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const GEMINI_MODELS: [&str; 6] = [
    "gemini-1.5-pro",
    "gemini-2.0-flash",
    "gemini-pro",
    "gemini-1.0-pro",
    "text-unicorn",
    "text-bison",
];

const SYSTEM_PROMPT: &str = "You are a helpful AI writing assistant. Generate well-formatted markdown content based on the user's request. \
Include appropriate markdown formatting like headers, lists, code blocks, etc. \
Your response should be in pure markdown format that can be directly used in a blog post.";

const TEMPERATURE: f32 = 0.7;
const MAX_OUTPUT_TOKENS: u32 = 2048;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Sent as a header, never in the URL.
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Error)]
pub enum AiError {
    #[error("Please enter a prompt for the AI to generate content.")]
    EmptyPrompt,
    #[error("Gemini API key is missing. Please check your environment variables.")]
    MissingApiKey,
    #[error("{0}")]
    Request(String),
    #[error("All Gemini models failed. Last error: {0}")]
    AllModelsFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub markdown: String,
    pub model: String,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Whether credentials are present at all.
    fn is_configured(&self) -> bool {
        true
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, AiError>;
}

pub fn build_prompt(prompt: &str) -> String {
    format!("{SYSTEM_PROMPT}\n\nUser request: {prompt}")
}

/// Draft markdown for `prompt`, trying each of [`GEMINI_MODELS`] in order.
pub async fn generate_markdown(
    generator: &dyn TextGenerator,
    prompt: &str,
) -> Result<Generated, AiError> {
    generate_with_models(generator, &GEMINI_MODELS, prompt).await
}

pub async fn generate_with_models(
    generator: &dyn TextGenerator,
    models: &[&str],
    prompt: &str,
) -> Result<Generated, AiError> {
    if prompt.trim().is_empty() {
        return Err(AiError::EmptyPrompt);
    }
    if !generator.is_configured() {
        return Err(AiError::MissingApiKey);
    }

    let full_prompt = build_prompt(prompt.trim());
    let mut last_error: Option<AiError> = None;

    for model in models {
        tracing::info!(model, "Trying model");
        match generator.generate(model, &full_prompt).await {
            Ok(markdown) => {
                return Ok(Generated {
                    markdown,
                    model: model.to_string(),
                })
            }
            Err(e) => {
                tracing::warn!(model, error = %e, "Model failed");
                last_error = Some(e);
            }
        }
    }

    Err(AiError::AllModelsFailed(
        last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string()),
    ))
}

/// Turn a provider error into copy an editor can act on.
pub fn friendly_message(error: &str) -> String {
    let text = error.to_lowercase();
    if text.contains("api key") {
        "Invalid or missing API key. Please check your Gemini API key configuration.".to_string()
    } else if text.contains("model") && text.contains("not found") {
        "The Gemini model is not available with your current API key or region. Please ensure you have access to Gemini Pro or try a different API key.".to_string()
    } else if text.contains("permission") || text.contains("access") {
        "You don't have permission to use this model. Make sure your API key has access to Gemini AI models.".to_string()
    } else if text.contains("network") || text.contains("connection") {
        "Network error while connecting to Gemini API. Please check your internet connection and try again.".to_string()
    } else if text.contains("timeout") || text.contains("timed out") {
        "The request to Gemini timed out. Please try again with a shorter prompt.".to_string()
    } else {
        error.to_string()
    }
}

// ----------------- Gemini Client -----------------

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
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
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, AiError> {
        let key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let response = self
            .http
            .post(format!(
                "{}/v1beta/models/{model}:generateContent",
                self.base_url
            ))
            .header(API_KEY_HEADER, key)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                if e.is_timeout() {
                    AiError::Request(format!("request timed out: {e}"))
                } else {
                    AiError::Request(format!("network error: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(text);
            return Err(AiError::Request(format!("[{status}] {message}")));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AiError::Request(format!("invalid response from model {model}: {e}")))?;
        let markdown = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if markdown.trim().is_empty() {
            return Err(AiError::Request(format!("model {model} returned no content")));
        }
        Ok(markdown)
    }
}
