//! Request/response DTOs for the chat HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::triage::{ConsultationPhase, ConversationState, Speaker, Turn};

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub greeting: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub text: String,
    pub should_schedule_appointment: bool,
    pub phase: ConsultationPhase,
}

/// One transcript entry as exposed over the API.
#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&Turn> for TurnResponse {
    fn from(turn: &Turn) -> Self {
        Self {
            speaker: turn.speaker,
            text: turn.text.clone(),
            timestamp: turn.timestamp,
        }
    }
}

/// Session summary: phase, extracted fields, turn counts, and the
/// conversation history.
#[derive(Debug, Serialize)]
pub struct SessionSummaryResponse {
    pub session_id: String,
    pub phase: ConsultationPhase,
    pub phase_label: String,
    pub main_complaint: Option<String>,
    pub location: Option<String>,
    pub duration: Option<String>,
    pub intensity: Option<String>,
    pub triggers: Option<String>,
    pub patient_turns: usize,
    pub assistant_turns: u32,
    pub transcript: Vec<TurnResponse>,
}

impl From<&ConversationState> for SessionSummaryResponse {
    fn from(state: &ConversationState) -> Self {
        Self {
            session_id: state.session_id.to_string(),
            phase: state.phase,
            phase_label: state.phase.label().to_string(),
            main_complaint: state.fields.main_complaint.clone(),
            location: state.fields.location.clone(),
            duration: state.fields.duration.clone(),
            intensity: state.fields.intensity.clone(),
            triggers: state.fields.triggers.clone(),
            patient_turns: state.patient_turns(),
            assistant_turns: state.assistant_turns,
            transcript: state.transcript.iter().map(TurnResponse::from).collect(),
        }
    }
}

/// Standard error body for every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}
