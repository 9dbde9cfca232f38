//! Groq chat-completions client
//!
//! Speaks the OpenAI-compatible chat completions API with a bounded request
//! timeout. Model output is treated as untrusted: the structured verdict is
//! re-validated field by field, tolerating markdown fences and surrounding
//! prose, and anything unparseable is a client failure the caller recovers
//! from.

use crate::config::ModelConfig;
use crate::error::{Error, Result};
use crate::model::{prompts, GenerateRequest, ModelClient, ModelVerdict};
use crate::session::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MAX_REASON_LEN: usize = 200;

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct GroqClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl GroqClient {
    /// Create a client from model configuration.
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// One chat completion round trip.
    async fn chat(&self, prompt: &str, temperature: f64, max_tokens: u32) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
            max_tokens,
            top_p: 0.9,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Model(format!(
                "Chat completion failed with status {}",
                response.status()
            )));
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Model("Chat completion returned no choices".to_string()))
    }
}

#[async_trait]
impl ModelClient for GroqClient {
    async fn classify(&self, text: &str, history: &[Message]) -> Result<ModelVerdict> {
        let prompt = prompts::classify_prompt(text, history);
        // Low temperature for consistent analysis
        let raw = self.chat(&prompt, 0.2, 200).await?;
        parse_verdict(&raw)
            .ok_or_else(|| Error::Model(format!("Unparseable verdict: {}", truncate(&raw, 100))))
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let prompt = prompts::generate_prompt(request);
        // Moderate temperature for natural variety, short replies
        let raw = self.chat(&prompt, 0.7, 100).await?;
        Ok(raw)
    }
}

/// Parse a structured verdict out of raw model output.
///
/// Accepts plain JSON, JSON inside markdown code fences, and JSON embedded
/// in prose. Returns `None` when required fields are missing or mistyped.
pub(crate) fn parse_verdict(raw: &str) -> Option<ModelVerdict> {
    let candidate = extract_json_object(raw)?;
    let value: serde_json::Value = serde_json::from_str(&candidate).ok()?;

    let is_scam = value.get("is_scam")?.as_bool()?;
    let confidence = value.get("confidence")?.as_f64()?.clamp(0.0, 1.0);
    let reason = value
        .get("reason")
        .and_then(|r| r.as_str())
        .unwrap_or("model analysis");

    Some(ModelVerdict {
        is_scam,
        confidence,
        reason: truncate(reason, MAX_REASON_LEN),
    })
}

/// Pull the first `{...}` block mentioning `is_scam` out of raw output,
/// stripping markdown fences first.
fn extract_json_object(raw: &str) -> Option<String> {
    let mut text = raw.trim();
    if let Some(stripped) = text.strip_prefix("```") {
        let stripped = stripped.strip_prefix("json").unwrap_or(stripped);
        text = stripped.split("```").next().unwrap_or(stripped).trim();
    }

    if text.starts_with('{') && text.ends_with('}') {
        return Some(text.to_string());
    }

    let start = text.find('{')?;
    let end = text[start..].find('}')? + start;
    let block = &text[start..=end];
    if block.contains("\"is_scam\"") {
        Some(block.to_string())
    } else {
        None
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
