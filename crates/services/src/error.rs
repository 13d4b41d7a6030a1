//! Shared error types for the services crate.

use thiserror::Error;

use review_core::model::{QuestionId, SessionPhase};
use storage::repository::StorageError;

/// Errors emitted by the Review Record Service client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecordClientError {
    #[error("review record service returned status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by session operations.
///
/// The two submission-gate variants carry the remediation data the caller
/// needs (which question, which field); none of these are fatal — a session
/// stays resumable after every one of them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("question {0} is not part of this session's module")]
    UnknownQuestion(QuestionId),

    #[error("{op} is not allowed while the session is {phase:?}")]
    InvalidPhase {
        op: &'static str,
        phase: SessionPhase,
    },

    #[error("question at index {first_unmarked} has not been marked yet")]
    QuestionsIncomplete { first_unmarked: usize },

    #[error("practical task link is required")]
    MissingPracticalLink,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Records(#[from] RecordClientError),
}
