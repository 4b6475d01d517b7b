//! Start Conversation Handler - opens a new triage session.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::SessionId;
use crate::domain::triage::ConversationState;
use crate::ports::session_store::{SessionStore, SessionStoreError};

/// Greeting shown to the patient when a session opens. Presentation
/// only: it is not part of the transcript and never reaches the model.
pub const GREETING: &str =
    "Hello! I'm Dr. AI, your virtual physiotherapy assistant. What brings you in today?";

#[derive(Debug, Clone)]
pub struct StartConversationResult {
    pub session_id: SessionId,
    pub greeting: String,
    pub state: ConversationState,
}

#[derive(Debug, thiserror::Error)]
pub enum StartConversationError {
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<SessionStoreError> for StartConversationError {
    fn from(err: SessionStoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Handler mints a fresh session id and persists a Greeting-phase state.
pub struct StartConversationHandler {
    store: Arc<dyn SessionStore>,
}

impl StartConversationHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self) -> Result<StartConversationResult, StartConversationError> {
        let session_id = SessionId::new();
        let state = ConversationState::new(session_id);
        self.store.save(session_id, &state).await?;

        info!(%session_id, "triage session started");

        Ok(StartConversationResult {
            session_id,
            greeting: GREETING.to_string(),
            state,
        })
    }
}
