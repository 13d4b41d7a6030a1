use std::sync::Arc;

use review_core::model::{
    MarkStatus, ModuleId, QuestionCatalog, QuestionId, ReviewId, ReviewRecord, ScoreBreakdown,
};
use storage::repository::SessionStore;

use super::engine::{MarkOutcome, SessionEngine};
use super::ticker::SessionTicker;
use crate::error::SessionError;
use crate::record_client::ReviewRecordApi;

/// Orchestrates session start, write-through persistence, and the terminal
/// finalize/cancel actions.
///
/// The engine itself is pure state; this service pairs each state change
/// with a save so a reload can resume from the store, and owns the two
/// operations that end a session's persisted life.
#[derive(Clone)]
pub struct SessionFlowService {
    store: Arc<dyn SessionStore>,
    records: Arc<dyn ReviewRecordApi>,
}

impl SessionFlowService {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, records: Arc<dyn ReviewRecordApi>) -> Self {
        Self { store, records }
    }

    /// Open a session for a scheduled review: restores the stored snapshot
    /// when one exists, otherwise starts fresh, then writes the opening
    /// state through.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the store cannot be read or
    /// written. An unreadable snapshot is not an error — it restores as a
    /// fresh session.
    pub async fn start_session(
        &self,
        record_id: ReviewId,
        module_id: ModuleId,
        catalog: &QuestionCatalog,
    ) -> Result<SessionEngine, SessionError> {
        let restored = self.store.load(record_id).await?;
        let engine = SessionEngine::start(record_id, module_id, catalog, restored);
        self.commit(&engine).await?;
        Ok(engine)
    }

    /// Write the session's current state through to the store. Call after
    /// any direct engine mutation (navigation, notes, practical fields).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the snapshot cannot be saved.
    pub async fn commit(&self, session: &SessionEngine) -> Result<(), SessionError> {
        self.store
            .save(session.session_id(), &session.snapshot())
            .await?;
        tracing::debug!(review_id = session.session_id().value(), "session snapshot saved");
        Ok(())
    }

    /// Mark a question and persist.
    ///
    /// # Errors
    ///
    /// Propagates the engine's marking errors and storage failures.
    pub async fn mark(
        &self,
        session: &mut SessionEngine,
        question_id: QuestionId,
        status: MarkStatus,
    ) -> Result<MarkOutcome, SessionError> {
        let outcome = session.mark(question_id, status)?;
        self.commit(session).await?;
        Ok(outcome)
    }

    /// Advance the session timer by one second and persist.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the snapshot cannot be saved.
    pub async fn tick(&self, session: &mut SessionEngine) -> Result<(), SessionError> {
        session.tick();
        self.commit(session).await
    }

    /// Run the submission gates and persist the phase change.
    ///
    /// # Errors
    ///
    /// Propagates the engine's gate errors; the stored snapshot is left at
    /// the last committed state when a gate refuses.
    pub async fn request_submit(&self, session: &mut SessionEngine) -> Result<(), SessionError> {
        session.request_submit()?;
        self.commit(session).await
    }

    /// Confirm feedback, freezing the score, and persist.
    ///
    /// # Errors
    ///
    /// Propagates the engine's phase errors and storage failures.
    pub async fn confirm_feedback(
        &self,
        session: &mut SessionEngine,
    ) -> Result<ScoreBreakdown, SessionError> {
        let score = session.confirm_feedback()?;
        self.commit(session).await?;
        Ok(score)
    }

    /// Back out of the feedback step and persist.
    ///
    /// # Errors
    ///
    /// Propagates the engine's phase errors and storage failures.
    pub async fn cancel_feedback(&self, session: &mut SessionEngine) -> Result<(), SessionError> {
        session.cancel_feedback()?;
        self.commit(session).await
    }

    /// Commit the session's results: one write to the Review Record
    /// Service, then — only on acknowledged success — clear the stored
    /// snapshot and stop the ticker.
    ///
    /// On failure the payload is discarded, the phase stays `ResultReady`,
    /// and the stored snapshot is untouched, so the caller can retry from
    /// the same place.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Records` when the backend write fails and
    /// `SessionError::InvalidPhase` outside `ResultReady`.
    pub async fn finalize(
        &self,
        session: &mut SessionEngine,
        ticker: Option<&SessionTicker>,
    ) -> Result<ReviewRecord, SessionError> {
        let update = session.finalize_update()?;
        let record = match self
            .records
            .finalize_review(session.session_id(), &update)
            .await
        {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(
                    review_id = session.session_id().value(),
                    error = %err,
                    "finalize write failed; snapshot kept for retry"
                );
                return Err(SessionError::Records(err));
            }
        };

        self.store.clear(session.session_id()).await?;
        if let Some(ticker) = ticker {
            ticker.stop();
        }
        Ok(record)
    }

    /// Abandon the session: clears the stored snapshot and stops the ticker
    /// without contacting the Review Record Service. Permitted in any phase
    /// before a successful finalize.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the entry cannot be removed.
    pub async fn cancel(
        &self,
        session: &SessionEngine,
        ticker: Option<&SessionTicker>,
    ) -> Result<(), SessionError> {
        self.store.clear(session.session_id()).await?;
        if let Some(ticker) = ticker {
            ticker.stop();
        }
        Ok(())
    }
}
