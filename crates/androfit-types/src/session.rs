//! Per-session capability parameters.
//!
//! These are the fixed parameters each hosted client is constructed with:
//! model names, sampling temperature, and the voice id. The defaults match
//! the deployed configuration. VAD is off by default; the detector itself
//! is external, so `VadOptions` only carries its tuning parameters.

use serde::{Deserialize, Serialize};

fn default_stt_model() -> String {
    "whisper-1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_tts_model() -> String {
    "tts-1".to_string()
}

fn default_tts_voice() -> String {
    "alloy".to_string()
}

/// Capability parameters for one conversational session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Transcription model name.
    #[serde(default = "default_stt_model")]
    pub stt_model: String,

    /// Chat completion model name.
    #[serde(default = "default_llm_model")]
    pub llm_model: String,

    /// Sampling temperature for reply generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Speech synthesis model name.
    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    /// Voice id used for synthesis.
    #[serde(default = "default_tts_voice")]
    pub tts_voice: String,

    /// Voice activity detection parameters. `None` leaves turn detection
    /// entirely to the media pipeline, which keeps the session footprint
    /// small.
    #[serde(default)]
    pub vad: Option<VadOptions>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            stt_model: default_stt_model(),
            llm_model: default_llm_model(),
            temperature: default_temperature(),
            tts_model: default_tts_model(),
            tts_voice: default_tts_voice(),
            vad: None,
        }
    }
}

fn default_activation_threshold() -> f32 {
    0.5
}

fn default_min_speech_ms() -> u64 {
    50
}

fn default_min_silence_ms() -> u64 {
    550
}

/// Tuning parameters handed to the external voice activity detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VadOptions {
    /// Probability above which a frame counts as speech.
    #[serde(default = "default_activation_threshold")]
    pub activation_threshold: f32,

    /// Minimum run of speech frames before a turn opens, in milliseconds.
    #[serde(default = "default_min_speech_ms")]
    pub min_speech_ms: u64,

    /// Minimum run of silence frames before a turn closes, in milliseconds.
    #[serde(default = "default_min_silence_ms")]
    pub min_silence_ms: u64,
}

impl Default for VadOptions {
    fn default() -> Self {
        Self {
            activation_threshold: default_activation_threshold(),
            min_speech_ms: default_min_speech_ms(),
            min_silence_ms: default_min_silence_ms(),
        }
    }
}
