//! Session flow against a local listener standing in for the hosted API.
//! Room transport stays in-process, so the whole start / greet / user-turn
//! sequence runs without network access.

use androfit_agent::{AgentError, CoachSession};
use androfit_types::{Persona, Role, SessionOptions};
use androfit_voice::{LiveKitConfig, OpenAiConfig, RoomService};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

async fn spawn_mock(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v1", addr)
}

fn hosted_api_mock() -> Router {
    Router::new()
        .route(
            "/v1/chat/completions",
            post(|| async {
                Json(json!({
                    "choices": [
                        {"message": {"content": "How's your vibe today? Ready to crush it?"}}
                    ]
                }))
            }),
        )
        .route(
            "/v1/audio/transcriptions",
            post(|| async { Json(json!({"text": "Beginner, 20 min, no equipment"})) }),
        )
        .route("/v1/audio/speech", post(|| async { vec![0u8; 480] }))
}

fn test_rooms() -> RoomService {
    RoomService::new(LiveKitConfig::new(
        "http://localhost:7880",
        "devkey",
        "secret",
    ))
}

#[tokio::test]
async fn new_session_seeds_system_prompt() {
    let session = CoachSession::new(
        Persona::fitness_coach(),
        SessionOptions::default(),
        OpenAiConfig::new("test-key"),
    );

    let transcript = session.transcript();
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].role, Role::System);
    assert_eq!(transcript[0].text, Persona::fitness_coach().instructions);
    assert!(session.room().is_none());
}

#[tokio::test]
async fn greeting_follows_successful_start() {
    let base_url = spawn_mock(hosted_api_mock()).await;
    let mut session = CoachSession::new(
        Persona::fitness_coach(),
        SessionOptions::default(),
        OpenAiConfig::new("test-key").with_base_url(base_url),
    );

    session
        .start(&test_rooms(), "gym-session")
        .await
        .expect("start");
    let greeting = session.greet().await.expect("greeting");

    assert_eq!(greeting, "How's your vibe today? Ready to crush it?");

    let transcript = session.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[1].role, Role::Assistant);
    assert_eq!(transcript[1].text, greeting);

    // The greeting audio must actually reach the room.
    let room = session.room().expect("room");
    assert!(room.bytes_published() > 0);
}

#[tokio::test]
async fn user_turn_extends_transcript() {
    let base_url = spawn_mock(hosted_api_mock()).await;
    let mut session = CoachSession::new(
        Persona::fitness_coach(),
        SessionOptions::default(),
        OpenAiConfig::new("test-key").with_base_url(base_url),
    );

    session
        .start(&test_rooms(), "gym-session")
        .await
        .expect("start");

    let reply = session.handle_user_turn(&[0u8; 320]).await.expect("turn");
    assert!(!reply.is_empty());

    let transcript = session.transcript();
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[1].role, Role::User);
    assert_eq!(transcript[1].text, "Beginner, 20 min, no equipment");
    assert_eq!(transcript[2].role, Role::Assistant);
}

#[tokio::test]
async fn empty_transcription_skips_the_turn() {
    let app = Router::new().route(
        "/v1/audio/transcriptions",
        post(|| async { Json(json!({"text": "   "})) }),
    );
    let base_url = spawn_mock(app).await;
    let mut session = CoachSession::new(
        Persona::fitness_coach(),
        SessionOptions::default(),
        OpenAiConfig::new("test-key").with_base_url(base_url),
    );

    session
        .start(&test_rooms(), "gym-session")
        .await
        .expect("start");

    let reply = session.handle_user_turn(&[0u8; 320]).await.expect("turn");
    assert!(reply.is_empty());
    // Only the system prompt; no user or assistant turn was recorded.
    assert_eq!(session.transcript().len(), 1);
}

#[tokio::test]
async fn run_replies_to_caller_clips_until_room_closes() {
    let base_url = spawn_mock(hosted_api_mock()).await;
    let mut session = CoachSession::new(
        Persona::fitness_coach(),
        SessionOptions::default(),
        OpenAiConfig::new("test-key").with_base_url(base_url),
    );

    session
        .start(&test_rooms(), "gym-session")
        .await
        .expect("start");
    let speech = session.subscribe_speech().expect("subscription");
    let room = session.room().expect("room");

    // Stand in for the media pipeline: feed two caller clips, wait until
    // both replies have been published, then end the call.
    let pipeline = tokio::spawn(async move {
        room.receive_audio(&[0u8; 320], "caller-1").expect("clip 1");
        room.receive_audio(&[0u8; 320], "caller-1").expect("clip 2");

        let mut waited = 0;
        while room.bytes_published() < 960 {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            waited += 1;
            assert!(waited < 500, "replies never reached the room");
        }
        room.disconnect().await;
    });

    session.run(speech).await.expect("run");
    pipeline.await.expect("pipeline task");

    // System prompt plus two full user/assistant turns.
    let transcript = session.transcript();
    assert_eq!(transcript.len(), 5);
    assert_eq!(transcript[1].role, Role::User);
    assert_eq!(transcript[2].role, Role::Assistant);
    assert_eq!(transcript[3].role, Role::User);
    assert_eq!(transcript[4].role, Role::Assistant);
}

#[tokio::test]
async fn run_survives_a_failed_turn() {
    // Transcription always blows up; the loop must log and keep going.
    let app = Router::new().route(
        "/v1/audio/transcriptions",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
    );
    let base_url = spawn_mock(app).await;
    let mut session = CoachSession::new(
        Persona::fitness_coach(),
        SessionOptions::default(),
        OpenAiConfig::new("test-key").with_base_url(base_url),
    );

    session
        .start(&test_rooms(), "gym-session")
        .await
        .expect("start");
    let speech = session.subscribe_speech().expect("subscription");
    let room = session.room().expect("room");

    room.receive_audio(&[0u8; 320], "caller-1").expect("clip");
    room.disconnect().await;

    session.run(speech).await.expect("run");
    assert_eq!(session.transcript().len(), 1);
}

#[tokio::test]
async fn run_before_start_is_rejected() {
    let mut session = CoachSession::new(
        Persona::fitness_coach(),
        SessionOptions::default(),
        OpenAiConfig::new("test-key"),
    );

    assert!(matches!(
        session.subscribe_speech(),
        Err(AgentError::NotStarted)
    ));

    let (tx, rx) = tokio::sync::broadcast::channel(1);
    drop(tx);
    let result = session.run(rx).await;
    assert!(matches!(result, Err(AgentError::NotStarted)));
}

#[tokio::test]
async fn greet_before_start_is_rejected() {
    let mut session = CoachSession::new(
        Persona::fitness_coach(),
        SessionOptions::default(),
        OpenAiConfig::new("test-key"),
    );

    let result = session.greet().await;
    assert!(matches!(result, Err(AgentError::NotStarted)));
}

#[tokio::test]
async fn hosted_api_failure_propagates() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
    );
    let base_url = spawn_mock(app).await;
    let mut session = CoachSession::new(
        Persona::fitness_coach(),
        SessionOptions::default(),
        OpenAiConfig::new("test-key").with_base_url(base_url),
    );

    session
        .start(&test_rooms(), "gym-session")
        .await
        .expect("start");

    // A failing construction-time call must surface, not leave the session
    // half-greeted.
    let result = session.greet().await;
    assert!(matches!(result, Err(AgentError::Voice(_))));
    assert_eq!(session.transcript().len(), 1);
}

#[tokio::test]
async fn close_disconnects_the_room() {
    let base_url = spawn_mock(hosted_api_mock()).await;
    let mut session = CoachSession::new(
        Persona::fitness_coach(),
        SessionOptions::default(),
        OpenAiConfig::new("test-key").with_base_url(base_url),
    );

    session
        .start(&test_rooms(), "gym-session")
        .await
        .expect("start");
    session.close().await;

    let room = session.room().expect("room");
    assert!(!room.is_connected());
}
