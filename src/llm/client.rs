//! Gemini `generateContent` client.

use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::GenerativeModel;

/// Default Generative Language API base URL.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model name.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const API_KEY_VAR: &str = "GOOGLE_API_KEY";
const MODEL_VAR: &str = "ATSCORE_MODEL";
const ENDPOINT_VAR: &str = "ATSCORE_ENDPOINT";

/// Connection settings for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API key sent as `x-goog-api-key`
    pub api_key: String,
    /// Model name, e.g. `gemini-1.5-flash`
    pub model: String,
    /// API base URL
    pub endpoint: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Attempts made on 429 and 5xx before giving up
    pub max_retries: u32,
}

impl LlmConfig {
    /// Config with the given key and default everything else.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(120),
            max_retries: 3,
        }
    }

    /// Read `GOOGLE_API_KEY`, `ATSCORE_MODEL` and `ATSCORE_ENDPOINT`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup. A missing or blank key is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config(format!("{} is not set", API_KEY_VAR)))?;

        let mut config = Self::new(api_key);
        if let Some(model) = lookup(MODEL_VAR).filter(|m| !m.is_empty()) {
            config.model = model;
        }
        if let Some(endpoint) = lookup(ENDPOINT_VAR).filter(|e| !e.is_empty()) {
            config.endpoint = endpoint;
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Full `generateContent` URL.
    pub fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

impl<'a> GenerateRequest<'a> {
    /// Single user turn with deterministic sampling.
    fn new(prompt: &'a str) -> Self {
        Self {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                top_p: 1.0,
                top_k: 1,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Result<String> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::ModelReply("no candidates returned".to_string()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::ModelReply("candidate has no text".to_string()));
        }
        Ok(text)
    }
}

/// Blocking client for the Generative Language API.
pub struct GeminiClient {
    client: Client,
    config: LlmConfig,
}

impl GeminiClient {
    /// Build a client. Fails only if the HTTP stack cannot be initialized.
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Client configured from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(LlmConfig::from_env()?)
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }
}

impl GenerativeModel for GeminiClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    /// Retries 429 and 5xx with exponential backoff (1s, 2s, 4s, ...).
    fn generate(&self, prompt: &str) -> Result<String> {
        let url = self.config.url();
        let body = GenerateRequest::new(prompt);
        let attempts = self.config.max_retries.max(1);
        let mut last_error: Option<Error> = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1).min(6)));
                warn!(
                    "{} attempt {} failed, retrying after {}ms",
                    self.config.model,
                    attempt,
                    delay.as_millis()
                );
                std::thread::sleep(delay);
            }

            let response = match self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.config.api_key)
                .json(&body)
                .send()
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(Error::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let message = response.text().unwrap_or_default();
                warn!("{} returned {}: {}", self.config.model, status, message);
                last_error = Some(Error::ModelApi {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(Error::ModelApi {
                    status: status.as_u16(),
                    message,
                });
            }

            let reply: GenerateResponse = response.json()?;
            let text = reply.into_text()?;
            debug!("{} replied with {} chars", self.config.model, text.len());
            return Ok(text);
        }

        Err(last_error.unwrap_or_else(|| {
            Error::ModelReply(format!("no reply after {} attempts", attempts))
        }))
    }
}
