use async_trait::async_trait;
use review_core::model::{ReviewId, SessionSnapshot};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Scoped key-value persistence for in-progress sessions.
///
/// One entry per review id, holding the serialized `SessionSnapshot`. The
/// engine writes through after every mutation; `load` is lenient — a stored
/// payload that no longer parses behaves as "no snapshot" so a corrupt entry
/// degrades to a fresh session instead of an error.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist or replace the snapshot for a session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save(&self, id: ReviewId, snapshot: &SessionSnapshot) -> Result<(), StorageError>;

    /// Fetch the snapshot for a session, if a readable one exists.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for connection-level failures; a missing
    /// or unreadable payload is `Ok(None)`.
    async fn load(&self, id: ReviewId) -> Result<Option<SessionSnapshot>, StorageError>;

    /// Remove the snapshot for a session. Removing a missing entry is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the entry cannot be removed.
    async fn clear(&self, id: ReviewId) -> Result<(), StorageError>;
}

/// Simple in-memory session store for testing and prototyping.
///
/// Holds the serialized JSON payloads, so tests can observe that a failed
/// finalize leaves the stored bytes untouched.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    entries: Arc<Mutex<HashMap<ReviewId, String>>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The raw stored payload for a session, if any. Test hook.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the map lock is poisoned.
    pub fn raw_payload(&self, id: ReviewId) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(&self, id: ReviewId, snapshot: &SessionSnapshot) -> Result<(), StorageError> {
        let payload = snapshot
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(id, payload);
        Ok(())
    }

    async fn load(&self, id: ReviewId) -> Result<Option<SessionSnapshot>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let Some(payload) = guard.get(&id) else {
            return Ok(None);
        };
        let parsed = SessionSnapshot::from_json(payload);
        if parsed.is_none() {
            tracing::warn!(review_id = id.value(), "discarding unreadable session snapshot");
        }
        Ok(parsed)
    }

    async fn clear(&self, id: ReviewId) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_core::model::{MarkStatus, QuestionId, QuestionMark, SessionSnapshot};

    fn build_snapshot(id: u64) -> SessionSnapshot {
        SessionSnapshot {
            session_id: Some(ReviewId::new(id)),
            current_index: 1,
            marks: vec![QuestionMark::new(QuestionId::new(3), MarkStatus::Answered)],
            elapsed_seconds: 42,
            ..SessionSnapshot::default()
        }
    }

    #[tokio::test]
    async fn round_trips_snapshot() {
        let store = InMemorySessionStore::new();
        let id = ReviewId::new(7);
        let snapshot = build_snapshot(7);

        store.save(id, &snapshot).await.unwrap();
        let loaded = store.load(id).await.unwrap().unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[tokio::test]
    async fn save_replaces_previous_entry() {
        let store = InMemorySessionStore::new();
        let id = ReviewId::new(7);

        store.save(id, &build_snapshot(7)).await.unwrap();
        let mut updated = build_snapshot(7);
        updated.elapsed_seconds = 99;
        store.save(id, &updated).await.unwrap();

        let loaded = store.load(id).await.unwrap().unwrap();
        assert_eq!(loaded.elapsed_seconds, 99);
    }

    #[tokio::test]
    async fn missing_entry_loads_as_none() {
        let store = InMemorySessionStore::new();
        assert!(store.load(ReviewId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_removes_entry_and_is_idempotent() {
        let store = InMemorySessionStore::new();
        let id = ReviewId::new(7);
        store.save(id, &build_snapshot(7)).await.unwrap();

        store.clear(id).await.unwrap();
        assert!(store.load(id).await.unwrap().is_none());
        store.clear(id).await.unwrap();
    }

    #[tokio::test]
    async fn unreadable_payload_degrades_to_none() {
        let store = InMemorySessionStore::new();
        let id = ReviewId::new(7);
        store
            .entries
            .lock()
            .unwrap()
            .insert(id, "{{ definitely not json".to_string());

        assert!(store.load(id).await.unwrap().is_none());
    }
}
