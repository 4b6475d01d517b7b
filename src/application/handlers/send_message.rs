//! Send Message Handler - one full triage round trip.
//!
//! Records the patient message, asks the model for the next response,
//! sanitizes it, applies the escalation policy, and persists the
//! updated conversation. Upstream failures degrade to canned fallback
//! replies; the conversation keeps going either way.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::session_locks::SessionLocks;
use crate::domain::foundation::SessionId;
use crate::domain::triage::{escalation, ConsultationPhase, PromptComposer, ResponseSanitizer};
use crate::ports::session_store::{SessionStore, SessionStoreError};
use crate::ports::text_generator::{
    GenerationError, GenerationParams, GenerationRequest, TextGenerator,
};

/// Shown when the upstream call fails outright.
pub const UNAVAILABLE_FALLBACK: &str = "I apologize, but I'm having trouble processing your \
request. Please try again or consider scheduling an appointment for personalized assistance.";

/// Shown when the model produced nothing usable.
pub const EMPTY_RESPONSE_FALLBACK: &str = "I apologize, but I couldn't generate a proper \
response. Could you please repeat your last message?";

#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub session_id: SessionId,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct SendMessageResult {
    /// The assistant reply, marker included when escalating.
    pub text: String,
    pub should_schedule_appointment: bool,
    pub phase: ConsultationPhase,
}

#[derive(Debug, thiserror::Error)]
pub enum SendMessageError {
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<SessionStoreError> for SendMessageError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(id) => Self::SessionNotFound(id),
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Handler for patient messages.
pub struct SendMessageHandler {
    store: Arc<dyn SessionStore>,
    generator: Arc<dyn TextGenerator>,
    locks: Arc<SessionLocks>,
    composer: PromptComposer,
    sanitizer: ResponseSanitizer,
    params: GenerationParams,
}

impl SendMessageHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        generator: Arc<dyn TextGenerator>,
        locks: Arc<SessionLocks>,
    ) -> Self {
        Self {
            store,
            generator,
            locks,
            composer: PromptComposer::new(),
            sanitizer: ResponseSanitizer::new(),
            params: GenerationParams::default(),
        }
    }

    /// Overrides the generation parameters (from configuration).
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub async fn handle(&self, cmd: SendMessageCommand) -> Result<SendMessageResult, SendMessageError> {
        if cmd.message.trim().is_empty() {
            return Err(SendMessageError::EmptyMessage);
        }

        // Serialize per session: concurrent messages for the same
        // session queue up here, other sessions proceed in parallel.
        let _guard = self.locks.acquire(cmd.session_id).await;

        let mut state = self.store.load(cmd.session_id).await?;
        state.record_patient_message(&cmd.message);

        let prompt = self.composer.compose(&state, &cmd.message);
        let request = GenerationRequest::new(prompt).with_params(self.params.clone());

        let text = match self.generator.generate(request).await {
            Ok(raw) => {
                // The policy below owns the scheduling marker; anything
                // the model emitted on its own is removed first.
                let clean = escalation::strip_marker(&self.sanitizer.sanitize(&raw));
                if clean.is_empty() {
                    warn!(session_id = %cmd.session_id, "completion sanitized to nothing");
                    EMPTY_RESPONSE_FALLBACK.to_string()
                } else {
                    clean
                }
            }
            Err(GenerationError::EmptyCompletion) => {
                warn!(session_id = %cmd.session_id, "upstream returned an empty completion");
                EMPTY_RESPONSE_FALLBACK.to_string()
            }
            Err(err) => {
                warn!(session_id = %cmd.session_id, error = %err, "generation failed, using fallback");
                UNAVAILABLE_FALLBACK.to_string()
            }
        };

        let should_schedule = escalation::should_escalate(&state);
        let text = if should_schedule {
            escalation::append_marker(&text)
        } else {
            text
        };

        state.record_assistant_message(&text);
        self.store.save(cmd.session_id, &state).await?;

        info!(
            session_id = %cmd.session_id,
            phase = ?state.phase,
            should_schedule,
            "triage exchange completed"
        );

        Ok(SendMessageResult {
            text,
            should_schedule_appointment: should_schedule,
            phase: state.phase,
        })
    }
}
