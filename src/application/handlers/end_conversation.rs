//! End Conversation Handler - closes a session and frees its resources.

use std::sync::Arc;

use tracing::info;

use crate::application::session_locks::SessionLocks;
use crate::domain::foundation::SessionId;
use crate::ports::session_store::{SessionStore, SessionStoreError};

#[derive(Debug, thiserror::Error)]
pub enum EndConversationError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<SessionStoreError> for EndConversationError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(id) => Self::SessionNotFound(id),
            other => Self::Storage(other.to_string()),
        }
    }
}

pub struct EndConversationHandler {
    store: Arc<dyn SessionStore>,
    locks: Arc<SessionLocks>,
}

impl EndConversationHandler {
    pub fn new(store: Arc<dyn SessionStore>, locks: Arc<SessionLocks>) -> Self {
        Self { store, locks }
    }

    pub async fn handle(&self, session_id: SessionId) -> Result<(), EndConversationError> {
        // An in-flight exchange holds the session lock across the
        // upstream call; deleting underneath it would let its save
        // resurrect the session. Wait for it to finish first.
        let _guard = self.locks.acquire(session_id).await;

        if !self.store.exists(session_id).await? {
            return Err(EndConversationError::SessionNotFound(session_id));
        }

        self.store.delete(session_id).await?;
        self.locks.remove(session_id).await;

        info!(%session_id, "triage session ended");
        Ok(())
    }
}
