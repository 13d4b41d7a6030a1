use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ModuleId, QuestionId};

/// Errors raised while loading a question catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("invalid question catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One evaluation question, tagged with the module it belongs to.
///
/// Questions are supplied once at application start and never mutated; the
/// `reference_answer` is the insight a reviewer compares the spoken answer
/// against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub module_id: ModuleId,
    pub text: String,
    /// Legacy catalog files call this field `answer`.
    #[serde(alias = "answer")]
    pub reference_answer: String,
}

/// Ordered, read-only collection of all evaluation questions.
///
/// The catalog's order is the evaluation order: `for_module` preserves it so
/// that a session's current-question index stays meaningful across restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

impl QuestionCatalog {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Load a catalog from its JSON representation (an array of questions).
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` if the payload is not a valid question
    /// array.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, CatalogError> {
        let questions: Vec<Question> = serde_json::from_slice(bytes)?;
        Ok(Self::new(questions))
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Returns the subset of questions belonging to `module_id`, in catalog
    /// order. Deterministic: the same catalog yields the same subset and
    /// order on every call.
    #[must_use]
    pub fn for_module(&self, module_id: ModuleId) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| q.module_id == module_id)
            .cloned()
            .collect()
    }
}
