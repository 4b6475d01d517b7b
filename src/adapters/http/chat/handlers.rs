//! HTTP handlers for the chat API.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::error;

use crate::application::handlers::{
    EndConversationError, EndConversationHandler, GetConversationError, GetConversationHandler,
    SendMessageCommand, SendMessageError, SendMessageHandler, StartConversationError,
    StartConversationHandler,
};
use crate::application::SessionLocks;
use crate::domain::foundation::SessionId;
use crate::ports::session_store::SessionStore;
use crate::ports::text_generator::{GenerationParams, TextGenerator};

use super::dto::{
    ErrorResponse, SendMessageRequest, SendMessageResponse, SessionSummaryResponse,
    StartSessionResponse,
};

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Shared state for the chat routes.
#[derive(Clone)]
pub struct ChatAppState {
    store: Arc<dyn SessionStore>,
    generator: Arc<dyn TextGenerator>,
    locks: Arc<SessionLocks>,
    params: GenerationParams,
}

impl ChatAppState {
    pub fn new(store: Arc<dyn SessionStore>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            store,
            generator,
            locks: Arc::new(SessionLocks::new()),
            params: GenerationParams::default(),
        }
    }

    /// Overrides the generation parameters (from configuration).
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    fn start_handler(&self) -> StartConversationHandler {
        StartConversationHandler::new(self.store.clone())
    }

    fn send_handler(&self) -> SendMessageHandler {
        SendMessageHandler::new(self.store.clone(), self.generator.clone(), self.locks.clone())
            .with_params(self.params.clone())
    }

    fn get_handler(&self) -> GetConversationHandler {
        GetConversationHandler::new(self.store.clone())
    }

    fn end_handler(&self) -> EndConversationHandler {
        EndConversationHandler::new(self.store.clone(), self.locks.clone())
    }
}

fn parse_session_id(raw: &str) -> Result<SessionId, ApiError> {
    SessionId::from_str(raw).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid session id")),
        )
    })
}

/// POST /chat/sessions
pub async fn start_session(
    State(state): State<ChatAppState>,
) -> Result<(StatusCode, Json<StartSessionResponse>), ApiError> {
    let result = state.start_handler().handle().await.map_err(|err| {
        error!(error = %err, "failed to start session");
        match err {
            StartConversationError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("Failed to start session")),
            ),
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(StartSessionResponse {
            session_id: result.session_id.to_string(),
            greeting: result.greeting,
        }),
    ))
}

/// POST /chat/sessions/:session_id/messages
pub async fn send_message(
    State(state): State<ChatAppState>,
    Path(session_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let session_id = parse_session_id(&session_id)?;

    let result = state
        .send_handler()
        .handle(SendMessageCommand {
            session_id,
            message: body.message,
        })
        .await
        .map_err(|err| match err {
            SendMessageError::EmptyMessage => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request("Message cannot be empty")),
            ),
            SendMessageError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::not_found(format!("Session not found: {id}"))),
            ),
            SendMessageError::Storage(detail) => {
                error!(%session_id, detail = %detail, "storage failure during message handling");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::internal("Failed to process message")),
                )
            }
        })?;

    Ok(Json(SendMessageResponse {
        text: result.text,
        should_schedule_appointment: result.should_schedule_appointment,
        phase: result.phase,
    }))
}

/// GET /chat/sessions/:session_id
pub async fn get_session(
    State(state): State<ChatAppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSummaryResponse>, ApiError> {
    let session_id = parse_session_id(&session_id)?;

    let conversation = state.get_handler().handle(session_id).await.map_err(|err| match err {
        GetConversationError::SessionNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found(format!("Session not found: {id}"))),
        ),
        GetConversationError::Storage(detail) => {
            error!(%session_id, detail = %detail, "storage failure loading session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("Failed to load session")),
            )
        }
    })?;

    Ok(Json(SessionSummaryResponse::from(&conversation)))
}

/// DELETE /chat/sessions/:session_id
pub async fn end_session(
    State(state): State<ChatAppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session_id = parse_session_id(&session_id)?;

    state.end_handler().handle(session_id).await.map_err(|err| match err {
        EndConversationError::SessionNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found(format!("Session not found: {id}"))),
        ),
        EndConversationError::Storage(detail) => {
            error!(%session_id, detail = %detail, "storage failure ending session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("Failed to end session")),
            )
        }
    })?;

    Ok(StatusCode::NO_CONTENT)
}
