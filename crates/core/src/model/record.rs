use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{ModuleId, ReviewId};
use crate::model::score::ScoreBreakdown;
use crate::model::snapshot::SessionSnapshot;

//
// ─── RECORD STATUS ────────────────────────────────────────────────────────────
//

/// Lifecycle status of a scheduled review record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Pending,
    Active,
    Completed,
    Failed,
}

impl RecordStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Active => "active",
            RecordStatus::Completed => "completed",
            RecordStatus::Failed => "failed",
        }
    }

    /// Whether a session may still be conducted for this record.
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, RecordStatus::Pending | RecordStatus::Active)
    }
}

//
// ─── REVIEW RECORD ────────────────────────────────────────────────────────────
//

/// One scheduled review as the Review Record Service sees it.
///
/// Field names follow the service's camelCase wire format. Completed records
/// additionally carry the frozen scores, the reviewer's notes, and the final
/// session snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: ReviewId,
    pub student_name: String,
    #[serde(default)]
    pub batch: Option<String>,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scores: Option<ScoreBreakdown>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Older records used the `sessionData` key.
    #[serde(default, alias = "sessionData")]
    pub session_snapshot: Option<SessionSnapshot>,
}

impl ReviewRecord {
    /// Resolves the record's module label (e.g. `"Module 3"`) to an id.
    #[must_use]
    pub fn module_id(&self) -> Option<ModuleId> {
        self.module.as_deref().and_then(ModuleId::parse_label)
    }
}

/// Request body for scheduling a new review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub student_name: String,
    pub batch: String,
    pub module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
