//! Hosted-capability clients and media-provider plumbing for Androfit.
//!
//! Every interesting behavior lives behind an external service: speech
//! recognition, reply generation, and speech synthesis are hosted APIs,
//! and real-time audio transport belongs to LiveKit. This crate only
//! constructs and drives those capabilities:
//!
//! - [`SttClient`], [`LlmClient`], [`TtsClient`] call the hosted speech
//!   and chat APIs over HTTP,
//! - [`RoomService`] talks to the LiveKit server API (join tokens, room
//!   lifecycle),
//! - [`AgentRoom`] is the agent's end of a room: publish synthesized
//!   audio, surface caller speech for transcription.

pub mod config;
pub mod error;
pub mod llm;
pub mod room;
pub mod service;
pub mod stt;
pub mod tts;

pub use config::{LiveKitConfig, OpenAiConfig, DEFAULT_OPENAI_BASE_URL};
pub use error::VoiceError;
pub use llm::LlmClient;
pub use room::{AgentRoom, UserSpeech};
pub use service::RoomService;
pub use stt::SttClient;
pub use tts::TtsClient;
