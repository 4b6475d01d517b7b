//! Get Conversation Handler - reads a session summary.

use std::sync::Arc;

use crate::domain::foundation::SessionId;
use crate::domain::triage::ConversationState;
use crate::ports::session_store::{SessionStore, SessionStoreError};

#[derive(Debug, thiserror::Error)]
pub enum GetConversationError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<SessionStoreError> for GetConversationError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(id) => Self::SessionNotFound(id),
            other => Self::Storage(other.to_string()),
        }
    }
}

pub struct GetConversationHandler {
    store: Arc<dyn SessionStore>,
}

impl GetConversationHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        session_id: SessionId,
    ) -> Result<ConversationState, GetConversationError> {
        Ok(self.store.load(session_id).await?)
    }
}
