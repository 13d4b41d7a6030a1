use chrono::Utc;
use review_core::model::{ReviewId, SessionSnapshot};
use sqlx::Row;

use super::SqliteSessionStore;
use crate::repository::{SessionStore, StorageError};

fn id_i64(v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization("review_id overflow".to_string()))
}

#[async_trait::async_trait]
impl SessionStore for SqliteSessionStore {
    async fn save(&self, id: ReviewId, snapshot: &SessionSnapshot) -> Result<(), StorageError> {
        let payload = snapshot
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        sqlx::query(
            r"
                INSERT INTO session_snapshots (review_id, payload, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(review_id) DO UPDATE SET
                    payload = excluded.payload,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(id_i64(id.value())?)
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn load(&self, id: ReviewId) -> Result<Option<SessionSnapshot>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT payload FROM session_snapshots WHERE review_id = ?1
            ",
        )
        .bind(id_i64(id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let payload: String = row
            .try_get("payload")
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let parsed = SessionSnapshot::from_json(&payload);
        if parsed.is_none() {
            tracing::warn!(review_id = id.value(), "discarding unreadable session snapshot");
        }
        Ok(parsed)
    }

    async fn clear(&self, id: ReviewId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM session_snapshots WHERE review_id = ?1")
            .bind(id_i64(id.value())?)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_core::model::{MarkStatus, QuestionId, QuestionMark, SessionPhase};

    async fn connect(name: &str) -> SqliteSessionStore {
        // Shared-cache memory databases keep one schema across the pool's
        // connections; each test gets its own name.
        let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
        SqliteSessionStore::connect(&url).await.unwrap()
    }

    fn build_snapshot(id: u64) -> SessionSnapshot {
        SessionSnapshot {
            session_id: Some(ReviewId::new(id)),
            current_index: 2,
            marks: vec![
                QuestionMark::new(QuestionId::new(1), MarkStatus::Answered),
                QuestionMark::new(QuestionId::new(2), MarkStatus::Skipped),
            ],
            practical_score: 6.5,
            practical_link: "https://tasks.example/13".to_string(),
            elapsed_seconds: 311,
            is_paused: true,
            phase: SessionPhase::InProgress,
            ..SessionSnapshot::default()
        }
    }

    #[tokio::test]
    async fn round_trips_snapshot() {
        let store = connect("sqlite_round_trip").await;
        let id = ReviewId::new(13);
        let snapshot = build_snapshot(13);

        store.save(id, &snapshot).await.unwrap();
        let loaded = store.load(id).await.unwrap().unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[tokio::test]
    async fn upsert_replaces_payload() {
        let store = connect("sqlite_upsert").await;
        let id = ReviewId::new(13);

        store.save(id, &build_snapshot(13)).await.unwrap();
        let mut updated = build_snapshot(13);
        updated.elapsed_seconds = 500;
        store.save(id, &updated).await.unwrap();

        let loaded = store.load(id).await.unwrap().unwrap();
        assert_eq!(loaded.elapsed_seconds, 500);
    }

    #[tokio::test]
    async fn clear_deletes_entry() {
        let store = connect("sqlite_clear").await;
        let id = ReviewId::new(13);
        store.save(id, &build_snapshot(13)).await.unwrap();

        store.clear(id).await.unwrap();
        assert!(store.load(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_payload_loads_as_none() {
        let store = connect("sqlite_corrupt").await;
        let id = ReviewId::new(13);

        sqlx::query(
            "INSERT INTO session_snapshots (review_id, payload, updated_at) VALUES (?1, ?2, ?3)",
        )
        .bind(13_i64)
        .bind("{ broken")
        .bind(Utc::now())
        .execute(store.pool())
        .await
        .unwrap();

        assert!(store.load(id).await.unwrap().is_none());
    }
}
