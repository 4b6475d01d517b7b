//! Session Store Port - Interface for persisting conversation state.

use async_trait::async_trait;

use crate::domain::foundation::SessionId;
use crate::domain::triage::ConversationState;

/// Errors that can occur during session storage operations
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Failed to serialize session state: {0}")]
    SerializationFailed(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Port for persisting and loading per-session conversation state
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Save conversation state for a session, replacing any prior state.
    ///
    /// # Errors
    /// Returns `SessionStoreError` if the save fails
    async fn save(
        &self,
        session_id: SessionId,
        state: &ConversationState,
    ) -> Result<(), SessionStoreError>;

    /// Load conversation state for a session.
    ///
    /// # Errors
    /// Returns `SessionStoreError::NotFound` if the session does not exist
    async fn load(&self, session_id: SessionId) -> Result<ConversationState, SessionStoreError>;

    /// Check whether state exists for a session.
    async fn exists(&self, session_id: SessionId) -> Result<bool, SessionStoreError>;

    /// Delete all state for a session. Deleting a missing session is a no-op.
    async fn delete(&self, session_id: SessionId) -> Result<(), SessionStoreError>;
}
