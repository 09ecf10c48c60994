//! One conversational session per call.
//!
//! A [`CoachSession`] constructs each hosted capability client exactly
//! once with its fixed parameters, seeds the transcript with the persona's
//! system prompt, and then drives turns: caller audio in through STT, a
//! completion, and synthesized speech published back to the room.

use crate::error::AgentError;
use androfit_types::{Persona, Role, SessionOptions, TranscriptEntry};
use androfit_voice::{
    AgentRoom, LlmClient, OpenAiConfig, RoomService, SttClient, TtsClient, UserSpeech,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Participant identity the coach joins rooms under.
const AGENT_IDENTITY: &str = "androfit-coach";

pub struct CoachSession {
    persona: Persona,
    options: SessionOptions,
    stt: SttClient,
    llm: LlmClient,
    tts: TtsClient,
    transcript: Vec<TranscriptEntry>,
    room: Option<Arc<AgentRoom>>,
}

impl CoachSession {
    /// Assembles a session: one STT, LLM, and TTS client, each constructed
    /// once with the fixed parameters from `options`.
    pub fn new(persona: Persona, options: SessionOptions, api: OpenAiConfig) -> Self {
        let stt = SttClient::new(api.clone(), &options.stt_model);
        let llm = LlmClient::new(api.clone(), &options.llm_model, options.temperature);
        let tts = TtsClient::new(api, &options.tts_model, &options.tts_voice);

        match &options.vad {
            Some(vad) => info!(
                threshold = vad.activation_threshold,
                min_speech_ms = vad.min_speech_ms,
                min_silence_ms = vad.min_silence_ms,
                "voice activity detection enabled"
            ),
            // Turn detection stays with the media pipeline; skipping the
            // detector keeps the session footprint small.
            None => debug!("voice activity detection disabled"),
        }

        let transcript = vec![TranscriptEntry::now(
            Role::System,
            persona.instructions.clone(),
        )];

        Self {
            persona,
            options,
            stt,
            llm,
            tts,
            transcript,
            room: None,
        }
    }

    /// Joins the given room. Any failure here aborts the whole startup;
    /// the session never runs partially initialized.
    pub async fn start(&mut self, rooms: &RoomService, room_name: &str) -> Result<(), AgentError> {
        let token = rooms.generate_agent_token(room_name, AGENT_IDENTITY, &self.persona.name)?;
        let room = AgentRoom::connect(rooms.url(), &token, room_name).await?;

        info!(room = room_name, persona = %self.persona.name, "session started");
        self.room = Some(Arc::new(room));
        Ok(())
    }

    /// Subscribes to caller speech in the joined room.
    pub fn subscribe_speech(&self) -> Result<broadcast::Receiver<UserSpeech>, AgentError> {
        match self.room.as_ref() {
            Some(room) => Ok(room.subscribe_speech()),
            None => Err(AgentError::NotStarted),
        }
    }

    /// Drives the conversational loop: each caller clip arriving on the
    /// subscription becomes one [`handle_user_turn`](Self::handle_user_turn)
    /// call, until the speech channel ends or the room closes. A failed
    /// turn is logged and the call continues.
    pub async fn run(
        &mut self,
        mut speech: broadcast::Receiver<UserSpeech>,
    ) -> Result<(), AgentError> {
        let Some(room) = self.room.clone() else {
            return Err(AgentError::NotStarted);
        };

        loop {
            tokio::select! {
                // Drain clips already buffered before reacting to a close.
                biased;

                clip = speech.recv() => match clip {
                    Ok(clip) => {
                        if let Err(e) = self.handle_user_turn(&clip.audio).await {
                            warn!(
                                participant = %clip.participant,
                                error = %e,
                                "failed to handle caller turn"
                            );
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "caller speech backed up, clips dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                () = room.closed() => break,
            }
        }

        info!(room = %room.room_name(), "conversation loop ended");
        Ok(())
    }

    /// Issues the one scripted opening greeting.
    pub async fn greet(&mut self) -> Result<String, AgentError> {
        let instructions = self.persona.greeting_instructions.clone();
        self.generate_reply(Some(&instructions)).await
    }

    /// Generates one coach reply, optionally steered by an extra system
    /// instruction, and publishes the synthesized audio to the room.
    pub async fn generate_reply(
        &mut self,
        instructions: Option<&str>,
    ) -> Result<String, AgentError> {
        let Some(room) = self.room.as_ref() else {
            return Err(AgentError::NotStarted);
        };

        let mut messages = self.transcript.clone();
        if let Some(extra) = instructions {
            messages.push(TranscriptEntry::now(Role::System, extra));
        }

        let reply = self.llm.complete(&messages).await?;
        let audio = self.tts.synthesize(&reply).await?;
        room.publish_audio(&audio).await?;

        self.transcript
            .push(TranscriptEntry::now(Role::Assistant, reply.clone()));

        info!(chars = reply.len(), "coach reply published");
        Ok(reply)
    }

    /// Handles one caller turn: transcribe the clip, then reply to it.
    ///
    /// Returns the reply text, or an empty string when the clip
    /// transcribed to nothing.
    pub async fn handle_user_turn(&mut self, audio: &[u8]) -> Result<String, AgentError> {
        if self.room.is_none() {
            return Err(AgentError::NotStarted);
        }

        let text = self.stt.transcribe(audio).await?;
        if text.is_empty() {
            debug!("caller clip transcribed to nothing, skipping turn");
            return Ok(String::new());
        }

        info!(chars = text.len(), "caller turn transcribed");
        self.transcript
            .push(TranscriptEntry::now(Role::User, text));

        self.generate_reply(None).await
    }

    /// Disconnects from the room, ending the session.
    pub async fn close(&mut self) {
        if let Some(room) = self.room.as_ref() {
            room.disconnect().await;
        }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// The conversation so far, system prompt first.
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn room(&self) -> Option<Arc<AgentRoom>> {
        self.room.clone()
    }
}
