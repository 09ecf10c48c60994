use crate::config::OpenAiConfig;
use crate::error::VoiceError;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Maximum text input size for TTS. The hosted endpoint rejects longer
/// inputs, so fail locally before spending a request.
const MAX_TTS_INPUT_BYTES: usize = 4096;

/// Timeout for a synthesis request.
const TTS_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

/// Client for the hosted speech synthesis endpoint.
///
/// Requests `pcm` output so callers receive raw s16le samples ready to
/// publish into a room audio track.
#[derive(Debug, Clone)]
pub struct TtsClient {
    http: reqwest::Client,
    config: OpenAiConfig,
    model: String,
    voice: String,
}

impl TtsClient {
    pub fn new(
        config: OpenAiConfig,
        model: impl Into<String>,
        voice: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            model: model.into(),
            voice: voice.into(),
        }
    }

    /// The synthesis model this client was constructed with.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The voice id this client was constructed with.
    pub fn voice(&self) -> &str {
        &self.voice
    }

    /// Synthesizes speech for the given text, returning raw PCM audio.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        if text.len() > MAX_TTS_INPUT_BYTES {
            return Err(VoiceError::Tts(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_TTS_INPUT_BYTES
            )));
        }

        let request = SpeechRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            response_format: "pcm",
        };

        let response = self
            .http
            .post(format!("{}/audio/speech", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .timeout(TTS_TIMEOUT)
            .send()
            .await
            .map_err(|e| VoiceError::Tts(format!("Synthesis request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Tts(format!(
                "Synthesis API returned {}: {}",
                status, body
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| VoiceError::Tts(format!("Failed to read synthesized audio: {}", e)))?;

        debug!(
            model = %self.model,
            voice = %self.voice,
            bytes = audio.len(),
            "synthesized speech"
        );
        Ok(audio.to_vec())
    }
}
