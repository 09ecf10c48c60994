use crate::error::VoiceError;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, watch};
use tracing::info;

/// Default capacity for the per-room caller-speech broadcast channel.
const SPEECH_BROADCAST_CAPACITY: usize = 256;

/// A clip of caller speech captured from the room, ready for transcription.
#[derive(Debug, Clone)]
pub struct UserSpeech {
    pub room_name: String,
    pub participant: String,
    pub audio: Vec<u8>,
}

/// The agent's end of a media room.
///
/// In a production environment with the full `livekit` client crate
/// available, this would wrap a `livekit::Room` and a local audio track;
/// here it carries the connection state and the speech event plumbing the
/// session consumes, while the media transport itself stays external.
#[derive(Debug)]
pub struct AgentRoom {
    room_url: String,
    room_name: String,
    connected: watch::Sender<bool>,
    bytes_published: AtomicU64,
    speech_tx: broadcast::Sender<UserSpeech>,
}

impl AgentRoom {
    /// Connects to a room with a previously issued join token.
    pub async fn connect(url: &str, token: &str, room_name: &str) -> Result<Self, VoiceError> {
        if token.is_empty() {
            return Err(VoiceError::RoomService(
                "Cannot connect with an empty join token".to_string(),
            ));
        }

        info!(
            room = room_name,
            url,
            token_len = token.len(),
            "agent connecting to room"
        );

        // Connection setup round-trip.
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let (connected, _) = watch::channel(true);
        let (speech_tx, _) = broadcast::channel(SPEECH_BROADCAST_CAPACITY);

        Ok(Self {
            room_url: url.to_string(),
            room_name: room_name.to_string(),
            connected,
            bytes_published: AtomicU64::new(0),
            speech_tx,
        })
    }

    pub fn room_name(&self) -> &str {
        &self.room_name
    }

    pub fn room_url(&self) -> &str {
        &self.room_url
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// Resolves once the room has been disconnected.
    pub async fn closed(&self) {
        let mut connected = self.connected.subscribe();
        let _ = connected.wait_for(|connected| !*connected).await;
    }

    /// Total PCM bytes published to the room audio track so far.
    pub fn bytes_published(&self) -> u64 {
        self.bytes_published.load(Ordering::Relaxed)
    }

    /// Publishes raw PCM audio to the room audio track.
    pub async fn publish_audio(&self, pcm_data: &[u8]) -> Result<(), VoiceError> {
        if !self.is_connected() {
            return Err(VoiceError::RoomService(
                "Agent is not connected to a room".to_string(),
            ));
        }

        info!(
            room = %self.room_name,
            bytes = pcm_data.len(),
            "publishing audio to room"
        );
        self.bytes_published
            .fetch_add(pcm_data.len() as u64, Ordering::Relaxed);

        Ok(())
    }

    /// Feeds a clip of caller audio into the room's speech channel.
    ///
    /// The media pipeline calls this when a caller's turn ends; session
    /// code subscribed via [`subscribe_speech`](Self::subscribe_speech)
    /// picks the clip up for transcription.
    pub fn receive_audio(&self, audio: &[u8], participant: &str) -> Result<(), VoiceError> {
        if !self.is_connected() {
            return Err(VoiceError::RoomService(
                "Agent is not connected to a room".to_string(),
            ));
        }

        let clip = UserSpeech {
            room_name: self.room_name.clone(),
            participant: participant.to_string(),
            audio: audio.to_vec(),
        };

        // No subscribers just means nobody is listening yet.
        let _ = self.speech_tx.send(clip);
        Ok(())
    }

    /// Subscribes to caller speech captured in this room.
    pub fn subscribe_speech(&self) -> broadcast::Receiver<UserSpeech> {
        self.speech_tx.subscribe()
    }

    /// Marks the room as ended and wakes everything waiting in
    /// [`closed`](Self::closed).
    pub async fn disconnect(&self) {
        if self.connected.send_replace(false) {
            info!(room = %self.room_name, "agent disconnecting from room");
        }
    }
}
