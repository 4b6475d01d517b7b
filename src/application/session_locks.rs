//! Per-session serialization.
//!
//! Each session gets its own async mutex, so two requests for the same
//! session are processed one after the other while requests for
//! different sessions run fully in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::foundation::SessionId;

/// Registry of per-session locks.
#[derive(Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for one session, creating it on first use.
    ///
    /// The registry lock is only held long enough to look up the entry;
    /// waiting happens on the session's own mutex.
    pub async fn acquire(&self, session_id: SessionId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(session_id).or_default())
        };
        lock.lock_owned().await
    }

    /// Drops the lock entry for an ended session.
    pub async fn remove(&self, session_id: SessionId) {
        self.locks.lock().await.remove(&session_id);
    }

    /// Number of sessions with a registered lock.
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.locks.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn same_session_operations_are_serialized() {
        let locks = Arc::new(SessionLocks::new());
        let session = SessionId::new();
        let in_flight = Arc::new(AtomicU32::new(0));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let locks = Arc::clone(&locks);
            let in_flight = Arc::clone(&in_flight);
            tasks.push(tokio::spawn(async move {
                let _guard = locks.acquire(session).await;
                let concurrent = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                assert_eq!(concurrent, 1, "lock admitted two holders");
                tokio::time::sleep(Duration::from_millis(2)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
    }

    #[tokio::test]
    async fn different_sessions_do_not_block_each_other() {
        let locks = SessionLocks::new();
        let guard_a = locks.acquire(SessionId::new()).await;
        // Acquiring a second session must not wait on the first.
        let guard_b = tokio::time::timeout(
            Duration::from_millis(100),
            locks.acquire(SessionId::new()),
        )
        .await
        .expect("second session blocked on the first");
        drop(guard_a);
        drop(guard_b);
    }

    #[tokio::test]
    async fn remove_forgets_the_session() {
        let locks = SessionLocks::new();
        let session = SessionId::new();
        drop(locks.acquire(session).await);
        assert_eq!(locks.len().await, 1);
        locks.remove(session).await;
        assert!(locks.is_empty().await);
    }
}
