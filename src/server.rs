//! JSON HTTP API for browser front ends.
//!
//! The server owns one [`Session`] for the process and exposes the stateless
//! actions alongside it.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/api/generate/{kind}` | Run one action, body `{"topic": "..."}` |
//! | `GET`  | `/api/session` | Session snapshot |
//! | `POST` | `/api/session/submit` | Generate a flashcard into the session |
//! | `POST` | `/api/session/recent` | Regenerate a recent topic |
//! | `POST` | `/api/session/navigate` | Move through history, body `{"direction": "older"}` |
//! | `GET`  | `/api/session/card/text` | Current card as plain text |
//! | `GET`  | `/api/session/card/pdf` | Current card as a PDF attachment |
//!
//! `{kind}` is one of `flashcard`, `flashcard-plain`, `short-summary`,
//! `detailed-explanation`.
//!
//! # Results and Errors
//!
//! Generation endpoints always answer `200` with a result union, including
//! for invalid topics and generation failures:
//!
//! ```json
//! { "success": false, "error": "Topic cannot be empty." }
//! ```
//!
//! Everything else uses the error envelope:
//!
//! ```json
//! { "error": { "code": "busy", "message": "A flashcard is already being generated" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `busy` (409),
//! `export_failed` (500), `internal` (500).

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::actions::Actions;
use crate::config::Config;
use crate::export::{render_pdf, safe_export_filename};
use crate::file_store::JsonFileStore;
use crate::generation::{create_client, GenerationClient};
use crate::notify::{Notification, TracingNotifier};
use crate::session::{Session, SessionError, SessionSnapshot};
use flashlearn_core::clipboard::plain_text;
use flashlearn_core::{Direction, Flashcard, Generated, GenerationKind, GenerationResult};

#[derive(Clone)]
struct AppState {
    actions: Actions,
    session: Arc<Mutex<Session>>,
}

/// Starts the HTTP server with the provider selected in `[generation]`.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let client = create_client(&config.generation)?;
    run_server_with_client(config, client).await
}

/// Starts the HTTP server with an explicit generation client.
pub async fn run_server_with_client(
    config: &Config,
    client: Arc<dyn GenerationClient>,
) -> anyhow::Result<()> {
    let app = build_router(config, client).await;

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    println!("FlashLearn API listening on http://{}", config.server.bind);
    tracing::info!(bind = %config.server.bind, "server started");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the router and its session without binding a socket.
pub async fn build_router(config: &Config, client: Arc<dyn GenerationClient>) -> Router {
    let actions = Actions::new(client);
    let store = Arc::new(JsonFileStore::new(&config.session.store_path));
    let session = Session::start(actions.clone(), store, Arc::new(TracingNotifier)).await;

    let state = AppState {
        actions,
        session: Arc::new(Mutex::new(session)),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/generate/{kind}", post(handle_generate))
        .route("/api/session", get(handle_snapshot))
        .route("/api/session/submit", post(handle_submit))
        .route("/api/session/recent", post(handle_recent))
        .route("/api/session/navigate", post(handle_navigate))
        .route("/api/session/card/text", get(handle_card_text))
        .route("/api/session/card/pdf", get(handle_card_pdf))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Busy => AppError {
                status: StatusCode::CONFLICT,
                code: "busy",
                message: err.to_string(),
            },
            SessionError::NoSuchRecentTopic(_) => not_found(err.to_string()),
        }
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: message.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /api/generate/{kind} ============

#[derive(Deserialize)]
struct TopicRequest {
    topic: String,
}

async fn handle_generate(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(req): Json<TopicRequest>,
) -> Result<Json<GenerationResult<Generated>>, AppError> {
    let kind: GenerationKind = kind
        .parse()
        .map_err(|e: anyhow::Error| bad_request(e.to_string()))?;
    Ok(Json(state.actions.perform(kind, &req.topic).await))
}

// ============ Session ============

async fn handle_snapshot(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session.lock().await.snapshot())
}

async fn handle_submit(
    State(state): State<AppState>,
    Json(req): Json<TopicRequest>,
) -> Result<Json<GenerationResult<Flashcard>>, AppError> {
    submit(&state, req.topic).await.map(Json)
}

/// `topic` must be one of the session's recent topics.
async fn handle_recent(
    State(state): State<AppState>,
    Json(req): Json<TopicRequest>,
) -> Result<Json<GenerationResult<Flashcard>>, AppError> {
    let known = state
        .session
        .lock()
        .await
        .recent_topics()
        .as_slice()
        .contains(&req.topic);
    if !known {
        return Err(not_found(format!("not a recent topic: {}", req.topic)));
    }
    submit(&state, req.topic).await.map(Json)
}

/// Run a submit without holding the session lock across the provider call,
/// so snapshots keep answering (with `phase: loading`) and overlapping
/// submits get `409 busy`. The generation runs in its own task so a dropped
/// request cannot leave the session stuck in the loading phase.
async fn submit(state: &AppState, topic: String) -> Result<GenerationResult<Flashcard>, AppError> {
    let actions = {
        let mut session = state.session.lock().await;
        session.begin_submit()?;
        session.actions().clone()
    };

    let session = state.session.clone();
    let task = tokio::spawn(async move {
        let result = actions.flashcard(&topic).await;
        session.lock().await.complete_submit(&topic, result).await
    });

    task.await.map_err(|e| {
        tracing::error!("submit task failed: {}", e);
        internal("flashcard generation was interrupted")
    })
}

#[derive(Deserialize)]
struct NavigateRequest {
    direction: Direction,
}

async fn handle_navigate(
    State(state): State<AppState>,
    Json(req): Json<NavigateRequest>,
) -> Json<SessionSnapshot> {
    let mut session = state.session.lock().await;
    session.navigate(req.direction);
    Json(session.snapshot())
}

async fn handle_card_text(State(state): State<AppState>) -> Result<String, AppError> {
    let session = state.session.lock().await;
    let card = session
        .current_card()
        .ok_or_else(|| not_found("no flashcard has been generated yet"))?;
    Ok(plain_text(card))
}

async fn handle_card_pdf(State(state): State<AppState>) -> Result<Response, AppError> {
    let card = state
        .session
        .lock()
        .await
        .current_card()
        .cloned()
        .ok_or_else(|| not_found("no flashcard has been generated yet"))?;

    let bytes = match render_pdf(&card) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("Failed to generate PDF: {:#}", e);
            state.session.lock().await.notifier().notify(Notification::error(
                "PDF Generation Failed",
                "There was an issue creating the PDF file.",
            ));
            return Err(AppError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "export_failed",
                message: "There was an issue creating the PDF file.".to_string(),
            });
        }
    };

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        safe_export_filename(&card.topic_name)
    ))
    .map_err(|e| internal(format!("invalid download file name: {}", e)))?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
