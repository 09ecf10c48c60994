//! Androfit worker binary, the entry point for the voice fitness coach.
//!
//! Validates provider credentials before anything connects, starts the
//! job worker that runs one coach session per dispatched call, and serves
//! a small HTTP surface: `/health` for the hosting platform and
//! `/dispatch` for the media provider's job notifications. Shuts down
//! gracefully on SIGTERM/SIGINT.

mod config;

use androfit_agent::{CoachSession, JobContext, Worker};
use androfit_types::Persona;
use androfit_voice::RoomService;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// How many dispatched jobs may queue before `/dispatch` starts refusing.
const JOB_QUEUE_CAPACITY: usize = 16;

#[derive(Clone)]
struct AppState {
    jobs: mpsc::Sender<JobContext>,
}

/// Health check handler.
///
/// Returns `200 OK` with worker status and version. Used by the hosting
/// platform and monitoring to verify the worker is running.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "agent": "androfit",
        "version": "0.1.0"
    }))
}

#[derive(Debug, Deserialize)]
struct DispatchRequest {
    room_name: String,
}

/// Accepts a job notification from the media provider and queues it for
/// the worker.
async fn dispatch(
    State(state): State<AppState>,
    Json(request): Json<DispatchRequest>,
) -> (StatusCode, Json<Value>) {
    if request.room_name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "room_name is required"})),
        );
    }

    let ctx = JobContext::new(request.room_name);
    let job_id = ctx.job_id.to_string();

    match state.jobs.try_send(ctx) {
        Ok(()) => (StatusCode::ACCEPTED, Json(json!({"job_id": job_id}))),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "job queue is full"})),
        ),
    }
}

/// Builds the application router with all routes.
fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/dispatch", post(dispatch))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("ANDROFIT_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    // Load configuration
    let (config, config_file_found) = config::load_config(selected_config_path)
        .expect("failed to load configuration, the worker cannot start without valid config");

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );
    if !config_file_found {
        if let Some(path) = selected_config_path {
            tracing::info!(path, "config file not found, using defaults");
        }
    }

    // Credentials are validated before any client is constructed or any
    // connection is attempted.
    let credentials = match config::load_credentials() {
        Ok(credentials) => credentials,
        Err(e) => {
            tracing::error!(error = %e, "refusing to start without provider credentials");
            std::process::exit(1);
        }
    };

    let rooms = Arc::new(RoomService::new(credentials.livekit.clone()));
    let (jobs_tx, jobs_rx) = mpsc::channel::<JobContext>(JOB_QUEUE_CAPACITY);

    // One coach session per dispatched job: ensure the room, join it,
    // greet, then converse until the room closes. Any failure before the
    // greeting aborts that job's startup; the worker itself keeps serving.
    let openai = credentials.openai.clone();
    let session_options = config.session.clone();
    let entry_rooms = rooms.clone();
    let worker = Worker::new(move |ctx: JobContext| {
        let openai = openai.clone();
        let options = session_options.clone();
        let rooms = entry_rooms.clone();
        async move {
            tracing::info!(room = %ctx.room_name, "starting fitness coach session");

            rooms.ensure_room(&ctx.room_name).await?;

            let mut session = CoachSession::new(Persona::fitness_coach(), options, openai);
            session.start(&rooms, &ctx.room_name).await?;

            // Subscribe before greeting so clips arriving mid-greeting are
            // not lost.
            let speech = session.subscribe_speech()?;

            let greeting = session.greet().await?;
            let participants = rooms.participant_count(&ctx.room_name).await?;
            tracing::info!(
                room = %ctx.room_name,
                participants,
                greeting_chars = greeting.len(),
                "session started and caller greeted"
            );

            session.run(speech).await?;
            session.close().await;

            tracing::info!(room = %ctx.room_name, "session ended");
            Ok(())
        }
    });

    let worker_task = tokio::spawn(async move { worker.run(jobs_rx).await });

    // Build application
    let app = app(AppState { jobs: jobs_tx });
    let addr = SocketAddr::new(config.server.host, config.server.port);

    tracing::info!(%addr, "starting androfit worker");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address, is another process using this port?");

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    // A session lasts as long as its call, so an in-flight job may never
    // finish on its own; the media provider re-dispatches interrupted
    // calls.
    worker_task.abort();
    let _ = worker_task.await;

    tracing::info!("androfit worker shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
