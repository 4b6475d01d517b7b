//! In-memory session store.
//!
//! Keeps conversation state in a process-local map. Suitable for a
//! single-instance deployment; sessions do not survive a restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::SessionId;
use crate::domain::triage::ConversationState;
use crate::ports::session_store::{SessionStore, SessionStoreError};

/// Session store backed by a `HashMap` behind an async `RwLock`.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, ConversationState>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions currently held.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops all sessions.
    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(
        &self,
        session_id: SessionId,
        state: &ConversationState,
    ) -> Result<(), SessionStoreError> {
        self.sessions.write().await.insert(session_id, state.clone());
        Ok(())
    }

    async fn load(&self, session_id: SessionId) -> Result<ConversationState, SessionStoreError> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or(SessionStoreError::NotFound(session_id))
    }

    async fn exists(&self, session_id: SessionId) -> Result<bool, SessionStoreError> {
        Ok(self.sessions.read().await.contains_key(&session_id))
    }

    async fn delete(&self, session_id: SessionId) -> Result<(), SessionStoreError> {
        self.sessions.write().await.remove(&session_id);
        Ok(())
    }
}
