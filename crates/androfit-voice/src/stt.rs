use crate::config::OpenAiConfig;
use crate::error::VoiceError;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Maximum audio input size for STT (10 MiB). Prevents OOM from oversized payloads.
const MAX_STT_INPUT_BYTES: usize = 10 * 1024 * 1024;

/// Timeout for a transcription request.
const STT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Client for the hosted transcription endpoint.
#[derive(Debug, Clone)]
pub struct SttClient {
    http: reqwest::Client,
    config: OpenAiConfig,
    model: String,
}

impl SttClient {
    pub fn new(config: OpenAiConfig, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            model: model.into(),
        }
    }

    /// The transcription model this client was constructed with.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Transcribes a WAV-encoded audio clip to text.
    pub async fn transcribe(&self, audio_wav: &[u8]) -> Result<String, VoiceError> {
        if audio_wav.len() > MAX_STT_INPUT_BYTES {
            return Err(VoiceError::Stt(format!(
                "audio data exceeds maximum size: {} bytes (limit: {} bytes)",
                audio_wav.len(),
                MAX_STT_INPUT_BYTES
            )));
        }

        let part = Part::bytes(audio_wav.to_vec())
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| VoiceError::Stt(format!("Failed to build multipart body: {}", e)))?;
        let form = Form::new()
            .text("model", self.model.clone())
            .part("file", part);

        let response = self
            .http
            .post(format!("{}/audio/transcriptions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .timeout(STT_TIMEOUT)
            .send()
            .await
            .map_err(|e| VoiceError::Stt(format!("Transcription request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Stt(format!(
                "Transcription API returned {}: {}",
                status, body
            )));
        }

        let body: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::Stt(format!("Failed to parse transcription: {}", e)))?;

        let text = body.text.trim().to_string();
        debug!(model = %self.model, chars = text.len(), "transcribed audio clip");
        Ok(text)
    }
}
