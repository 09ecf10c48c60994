//! Exercises the hosted-API clients against a local listener standing in
//! for the provider, so request shape and error mapping are covered
//! without network access.

use androfit_types::{Role, TranscriptEntry};
use androfit_voice::{LlmClient, OpenAiConfig, SttClient, TtsClient, VoiceError};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

async fn spawn_mock(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v1", addr)
}

fn test_config(base_url: String) -> OpenAiConfig {
    OpenAiConfig::new("test-key").with_base_url(base_url)
}

#[tokio::test]
async fn llm_complete_returns_first_choice() {
    let captured: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let app = Router::new().route(
        "/v1/chat/completions",
        post({
            let captured = captured.clone();
            move |Json(body): Json<Value>| {
                let captured = captured.clone();
                async move {
                    *captured.lock().unwrap() = Some(body);
                    Json(json!({
                        "choices": [
                            {"message": {"content": "Let's crush it! What are your goals today?"}}
                        ]
                    }))
                }
            }
        }),
    );
    let base_url = spawn_mock(app).await;

    let client = LlmClient::new(test_config(base_url), "gpt-4o-mini", 0.7);
    let messages = vec![
        TranscriptEntry::now(Role::System, "You are a gym coach."),
        TranscriptEntry::now(Role::User, "Beginner, 20 min, no equipment"),
    ];

    let reply = client.complete(&messages).await.expect("completion");
    assert_eq!(reply, "Let's crush it! What are your goals today?");

    let body = captured.lock().unwrap().take().expect("request captured");
    assert_eq!(body["model"], "gpt-4o-mini");
    assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], "Beginner, 20 min, no equipment");
    assert!(body.get("max_tokens").is_none());
}

#[tokio::test]
async fn llm_api_failure_maps_to_llm_error() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
    );
    let base_url = spawn_mock(app).await;

    let client = LlmClient::new(test_config(base_url), "gpt-4o-mini", 0.7);
    let messages = vec![TranscriptEntry::now(Role::User, "hi")];

    let result = client.complete(&messages).await;
    match result {
        Err(VoiceError::Llm(msg)) => {
            assert!(msg.contains("500"), "got: {}", msg);
            assert!(msg.contains("upstream exploded"), "got: {}", msg);
        }
        other => panic!("Expected Llm error, got {:?}", other),
    }
}

#[tokio::test]
async fn llm_empty_choices_is_an_error() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async { Json(json!({"choices": []})) }),
    );
    let base_url = spawn_mock(app).await;

    let client = LlmClient::new(test_config(base_url), "gpt-4o-mini", 0.7);
    let messages = vec![TranscriptEntry::now(Role::User, "hi")];

    let result = client.complete(&messages).await;
    assert!(matches!(result, Err(VoiceError::Llm(_))));
}

#[tokio::test]
async fn stt_transcribe_trims_response_text() {
    let app = Router::new().route(
        "/v1/audio/transcriptions",
        post(|| async { Json(json!({"text": "  Beginner, 20 min, no equipment  "})) }),
    );
    let base_url = spawn_mock(app).await;

    let client = SttClient::new(test_config(base_url), "whisper-1");
    let text = client.transcribe(&[0u8; 320]).await.expect("transcription");
    assert_eq!(text, "Beginner, 20 min, no equipment");
    assert_eq!(client.model(), "whisper-1");
}

#[tokio::test]
async fn stt_rejects_oversized_audio_locally() {
    // Bogus base URL: the size check must fire before any request is sent.
    let client = SttClient::new(
        test_config("http://127.0.0.1:1/v1".to_string()),
        "whisper-1",
    );

    let oversized = vec![0u8; 10 * 1024 * 1024 + 1];
    let result = client.transcribe(&oversized).await;
    match result {
        Err(VoiceError::Stt(msg)) => assert!(msg.contains("maximum size"), "got: {}", msg),
        other => panic!("Expected Stt error, got {:?}", other),
    }
}

#[tokio::test]
async fn tts_synthesize_returns_pcm_bytes() {
    let captured: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let app = Router::new().route(
        "/v1/audio/speech",
        post({
            let captured = captured.clone();
            move |Json(body): Json<Value>| {
                let captured = captured.clone();
                async move {
                    *captured.lock().unwrap() = Some(body);
                    vec![1u8; 640]
                }
            }
        }),
    );
    let base_url = spawn_mock(app).await;

    let client = TtsClient::new(test_config(base_url), "tts-1", "alloy");
    let audio = client.synthesize("Welcome back!").await.expect("synthesis");
    assert_eq!(audio.len(), 640);

    let body = captured.lock().unwrap().take().expect("request captured");
    assert_eq!(body["model"], "tts-1");
    assert_eq!(body["voice"], "alloy");
    assert_eq!(body["input"], "Welcome back!");
    assert_eq!(body["response_format"], "pcm");
}

#[tokio::test]
async fn tts_rejects_oversized_text_locally() {
    let client = TtsClient::new(
        test_config("http://127.0.0.1:1/v1".to_string()),
        "tts-1",
        "alloy",
    );

    let oversized = "a".repeat(4097);
    let result = client.synthesize(&oversized).await;
    match result {
        Err(VoiceError::Tts(msg)) => assert!(msg.contains("maximum size"), "got: {}", msg),
        other => panic!("Expected Tts error, got {:?}", other),
    }
}

#[test]
fn openai_config_debug_redacts_key() {
    let config = OpenAiConfig::new("sk-very-secret");
    let debug = format!("{:?}", config);
    assert!(!debug.contains("sk-very-secret"));
    assert!(debug.contains("[REDACTED]"));
}
