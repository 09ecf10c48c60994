use crate::config::LiveKitConfig;
use crate::error::VoiceError;
use livekit_api::access_token::{AccessToken, VideoGrants};
use livekit_api::services::room::{CreateRoomOptions, RoomClient};
use livekit_protocol::Room;
use std::time::Duration;

/// LiveKit server API wrapper: join tokens and room lifecycle.
#[derive(Debug)]
pub struct RoomService {
    config: LiveKitConfig,
    room_client: RoomClient,
}

impl RoomService {
    pub fn new(config: LiveKitConfig) -> Self {
        let room_client =
            RoomClient::with_api_key(&config.url, &config.api_key, &config.api_secret);
        Self {
            config,
            room_client,
        }
    }

    /// The media server URL participants connect to.
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Generates a join token granting the agent publish and subscribe
    /// rights in the given room.
    pub fn generate_agent_token(
        &self,
        room_name: &str,
        agent_identity: &str,
        agent_name: &str,
    ) -> Result<String, VoiceError> {
        let token = AccessToken::with_api_key(&self.config.api_key, &self.config.api_secret)
            .with_identity(agent_identity)
            .with_name(agent_name)
            .with_grants(VideoGrants {
                room_join: true,
                room: room_name.to_string(),
                can_publish: true,
                can_subscribe: true,
                can_publish_data: true,
                ..Default::default()
            })
            .with_ttl(Duration::from_secs(self.config.token_ttl_seconds));

        token.to_jwt().map_err(VoiceError::LiveKit)
    }

    /// Creates the room if the media server does not already know it.
    pub async fn ensure_room(&self, name: &str) -> Result<Room, VoiceError> {
        let options = CreateRoomOptions::default();

        self.room_client
            .create_room(name, options)
            .await
            .map_err(|e| VoiceError::RoomService(e.to_string()))
    }

    /// Returns the number of participants currently in a room.
    /// Returns 0 if the room does not exist.
    pub async fn participant_count(&self, room_name: &str) -> Result<u32, VoiceError> {
        match self.room_client.list_participants(room_name).await {
            Ok(participants) => Ok(participants.len() as u32),
            Err(_) => Ok(0), // Room doesn't exist yet
        }
    }
}
