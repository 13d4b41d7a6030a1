use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur while interpreting marks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarkError {
    #[error("unknown mark status: {0}")]
    UnknownStatus(String),
}

//
// ─── MARK STATUS ──────────────────────────────────────────────────────────────
//

/// The reviewer's qualitative judgment on one question.
///
/// Each status maps to a fixed theoretical score:
/// - `Answered`: complete, correct answer — 10 points
/// - `NeedsImprovement`: partially correct — 5 points
/// - `Wrong`: incorrect — 0 points
/// - `Skipped`: not attempted — 0 points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkStatus {
    /// Answered fully and correctly.
    #[serde(rename = "answered")]
    Answered,
    /// Answered with gaps that need follow-up.
    #[serde(rename = "need-improvement")]
    NeedsImprovement,
    /// Answered incorrectly.
    #[serde(rename = "wrong")]
    Wrong,
    /// Skipped by the student.
    #[serde(rename = "skip")]
    Skipped,
}

impl MarkStatus {
    /// The theoretical points this status contributes.
    #[must_use]
    pub fn score(self) -> u32 {
        match self {
            MarkStatus::Answered => 10,
            MarkStatus::NeedsImprovement => 5,
            MarkStatus::Wrong | MarkStatus::Skipped => 0,
        }
    }

    /// The wire name used in persisted sessions and finalize payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MarkStatus::Answered => "answered",
            MarkStatus::NeedsImprovement => "need-improvement",
            MarkStatus::Wrong => "wrong",
            MarkStatus::Skipped => "skip",
        }
    }

    /// Parses a wire name back into a status.
    ///
    /// # Errors
    ///
    /// Returns `MarkError::UnknownStatus` for any unrecognized name.
    pub fn from_wire(value: &str) -> Result<Self, MarkError> {
        match value {
            "answered" => Ok(MarkStatus::Answered),
            "need-improvement" => Ok(MarkStatus::NeedsImprovement),
            "wrong" => Ok(MarkStatus::Wrong),
            "skip" => Ok(MarkStatus::Skipped),
            other => Err(MarkError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for MarkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── QUESTION MARK ────────────────────────────────────────────────────────────
//

/// One recorded judgment: which question, which status, and the derived score.
///
/// The score is always derived from the status. Deserialization recomputes it,
/// so a snapshot edited by hand (or written by an older schema) can never
/// smuggle in an inconsistent score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionMark {
    question_id: QuestionId,
    status: MarkStatus,
    score: u32,
}

impl QuestionMark {
    #[must_use]
    pub fn new(question_id: QuestionId, status: MarkStatus) -> Self {
        Self {
            question_id,
            status,
            score: status.score(),
        }
    }

    #[must_use]
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    #[must_use]
    pub fn status(&self) -> MarkStatus {
        self.status
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }
}

impl<'de> Deserialize<'de> for QuestionMark {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Wire {
            question_id: QuestionId,
            status: MarkStatus,
            // Present on the wire but ignored: the score is derived.
            #[serde(default)]
            #[allow(dead_code)]
            score: u32,
        }

        let wire = Wire::deserialize(deserializer)?;
        Ok(QuestionMark::new(wire.question_id, wire.status))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
