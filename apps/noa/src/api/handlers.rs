//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers. Read handlers
//! take the registry's read lock; anything that mutates a session takes the
//! write lock, which serializes mutations the way the engine requires.

use super::{
    AppState,
    types::{
        AnswerRequest, AnswerResponse, CatalogResponse, DeleteResponse, HealthResponse,
        LogResponse, StartRequest, StartResponse, StateResponse, SummaryJson,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use noa_core::{SessionId, TriageError, narrative};

/// HTTP status for an engine error.
///
/// Validation failures are mapped to 400 at the call sites; everything that
/// reaches the engine comes back through here.
fn error_status(error: &TriageError) -> StatusCode {
    match error {
        TriageError::UnknownSession(_) => StatusCode::NOT_FOUND,
        TriageError::DuplicateSession(_)
        | TriageError::SessionClosed
        | TriageError::AlreadyStarted => StatusCode::CONFLICT,
        TriageError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// CATALOG HANDLER
// =============================================================================

/// Stage catalog overview.
pub async fn catalog_handler(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.registry.read().await;
    let stages = registry.catalog().stages().cloned().collect();
    (StatusCode::OK, Json(CatalogResponse::success(stages)))
}

// =============================================================================
// START HANDLER
// =============================================================================

/// Open and start an interview session.
pub async fn start_handler(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> impl IntoResponse {
    let session_id = match request.to_session_id() {
        Ok(id) => id,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(StartResponse::error(format!("Invalid session id: {}", e))),
            );
        }
    };

    let mut registry = state.registry.write().await;
    match registry.start(session_id.clone()) {
        Ok(first) => {
            // Fresh sessions always resolve; read back the opening state.
            let (sequencer_state, progress) = match registry.session(&session_id) {
                Ok(session) => (session.state(), session.progress()),
                Err(e) => {
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(StartResponse::error(format!("Start failed: {}", e))),
                    );
                }
            };
            tracing::info!(session_id = %session_id, "session started");
            (
                StatusCode::OK,
                Json(StartResponse::success(first, sequencer_state, progress)),
            )
        }
        Err(e) => (
            error_status(&e),
            Json(StartResponse::error(format!("Start failed: {}", e))),
        ),
    }
}

// =============================================================================
// ANSWER HANDLER
// =============================================================================

/// Submit a free-text answer to a session.
pub async fn answer_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<AnswerRequest>,
) -> impl IntoResponse {
    let text = match request.validate() {
        Ok(t) => t.to_string(),
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(AnswerResponse::error(format!("Invalid answer: {}", e))),
            );
        }
    };

    let id = SessionId::new(session_id);
    let mut registry = state.registry.write().await;
    match registry.submit_answer(&id, &text) {
        Ok(turn) => {
            let summary = match (&turn.summary, registry.session(&id)) {
                (Some(summary), Ok(session)) => Some(SummaryJson::new(
                    summary,
                    narrative(session.catalog(), session.log()),
                )),
                _ => None,
            };
            (
                StatusCode::OK,
                Json(AnswerResponse::success(
                    turn.new_messages,
                    turn.state,
                    turn.progress,
                    summary,
                )),
            )
        }
        Err(e) => (
            error_status(&e),
            Json(AnswerResponse::error(format!("Answer rejected: {}", e))),
        ),
    }
}

// =============================================================================
// LOG HANDLER
// =============================================================================

/// Full transcript of a session.
pub async fn log_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let id = SessionId::new(session_id);
    let registry = state.registry.read().await;
    match registry.log(&id) {
        Ok(messages) => (
            StatusCode::OK,
            Json(LogResponse::success(messages.to_vec())),
        ),
        Err(e) => (
            error_status(&e),
            Json(LogResponse::error(format!("Log unavailable: {}", e))),
        ),
    }
}

// =============================================================================
// STATE HANDLER
// =============================================================================

/// Current state and progress of a session.
pub async fn state_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let id = SessionId::new(session_id);
    let registry = state.registry.read().await;
    match (registry.state(&id), registry.progress(&id)) {
        (Ok(sequencer_state), Ok(progress)) => (
            StatusCode::OK,
            Json(StateResponse::success(sequencer_state, progress)),
        ),
        (Err(e), _) | (_, Err(e)) => (
            error_status(&e),
            Json(StateResponse::error(format!("State unavailable: {}", e))),
        ),
    }
}

// =============================================================================
// DELETE HANDLER
// =============================================================================

/// Discard a session (completed, cancelled or abandoned).
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let id = SessionId::new(session_id);
    let mut registry = state.registry.write().await;
    match registry.remove(&id) {
        Ok(session) => {
            tracing::info!(session_id = %id, state = %session.state(), "session discarded");
            (
                StatusCode::OK,
                Json(DeleteResponse::success(session.messages().len())),
            )
        }
        Err(e) => (
            error_status(&e),
            Json(DeleteResponse::error(format!("Discard failed: {}", e))),
        ),
    }
}
