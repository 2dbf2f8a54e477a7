//! Generative text providers.
//!
//! The `InsightProvider` trait abstracts over the text-generation backend so the
//! orchestrator can run against an OpenAI-compatible HTTP endpoint in
//! production and a mock in tests.

use serde::{Deserialize, Serialize};

use super::InsightError;
use crate::config::InsightConfig;

/// One blocking text-generation call.
pub trait InsightProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Send `system` and `prompt`, return the generated text.
    fn complete(&self, system: &str, prompt: &str) -> Result<String, InsightError>;
}

// ── Chat-completions wire format ─────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionsClient {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
    api_key: String,
    temperature: f64,
    max_tokens: u32,
}

impl ChatCompletionsClient {
    pub fn new(config: &InsightConfig, api_key: String) -> Result<Self, InsightError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| InsightError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: completions_url(&config.base_url),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Pull the first choice's text out of a decoded response.
    fn parse_response(resp: ChatResponse) -> Result<String, InsightError> {
        let content = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| InsightError::MalformedResponse("no choices in response".into()))?
            .message
            .content
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(InsightError::EmptyResponse);
        }
        Ok(content)
    }
}

fn completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

impl InsightProvider for ChatCompletionsClient {
    fn name(&self) -> &str {
        &self.model
    }

    fn complete(&self, system: &str, prompt: &str) -> Result<String, InsightError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| InsightError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(InsightError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = resp
            .json()
            .map_err(|e| InsightError::MalformedResponse(e.to_string()))?;
        Self::parse_response(parsed)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
