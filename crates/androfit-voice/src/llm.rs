//! Chat completion client.
//!
//! Converts the session transcript into an OpenAI-compatible Chat
//! Completions request and returns the generated reply text. The model
//! name and sampling temperature are fixed at construction time.

use crate::config::OpenAiConfig;
use crate::error::VoiceError;
use androfit_types::TranscriptEntry;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Timeout for a completion request.
const LLM_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

impl From<&TranscriptEntry> for ChatMessage {
    fn from(entry: &TranscriptEntry) -> Self {
        ChatMessage {
            role: entry.role.as_str(),
            content: entry.text.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Client for the hosted chat completion endpoint.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    config: OpenAiConfig,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl LlmClient {
    pub fn new(config: OpenAiConfig, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            model: model.into(),
            temperature,
            max_tokens: None,
        }
    }

    /// Caps the response length in tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// The completion model this client was constructed with.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generates one reply for the given conversation history.
    pub async fn complete(&self, messages: &[TranscriptEntry]) -> Result<String, VoiceError> {
        debug!(
            model = %self.model,
            turns = messages.len(),
            "generating completion"
        );

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: messages.iter().map(ChatMessage::from).collect(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .timeout(LLM_TIMEOUT)
            .send()
            .await
            .map_err(|e| VoiceError::Llm(format!("Completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Llm(format!(
                "Completion API returned {}: {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::Llm(format!("Failed to parse completion: {}", e)))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| VoiceError::Llm("No choices in completion response".to_string()))?;

        Ok(choice.message.content)
    }
}
