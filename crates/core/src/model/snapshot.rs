use serde::{Deserialize, Serialize};

use crate::model::ids::ReviewId;
use crate::model::mark::QuestionMark;

//
// ─── SESSION PHASE ────────────────────────────────────────────────────────────
//

/// Where the session stands in its submit workflow.
///
/// `InProgress` is the default working state; `AwaitingFeedback` is entered
/// once both submission gates pass; `ResultReady` freezes the score and is
/// the only phase from which the finalize write may be attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    #[default]
    InProgress,
    AwaitingFeedback,
    ResultReady,
}

//
// ─── WORKBENCH ────────────────────────────────────────────────────────────────
//

/// Language selector of the simulated code workbench.
///
/// Purely cosmetic session state: the buffer is persisted with the session
/// but never executed and never scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorkbenchLanguage {
    #[default]
    #[serde(rename = "c")]
    C,
    #[serde(rename = "java")]
    Java,
}

impl WorkbenchLanguage {
    /// The starter buffer shown when this language is selected.
    #[must_use]
    pub fn starter_snippet(self) -> &'static str {
        match self {
            WorkbenchLanguage::C => {
                "#include <stdio.h>\n\nint main() {\n    printf(\"Hello World\\n\");\n    return 0;\n}"
            }
            WorkbenchLanguage::Java => {
                "public class Main {\n    public static void main(String[] args) {\n        System.out.println(\"Hello World\");\n    }\n}"
            }
        }
    }
}

fn default_workbench_code() -> String {
    WorkbenchLanguage::default().starter_snippet().to_string()
}

//
// ─── SESSION SNAPSHOT ─────────────────────────────────────────────────────────
//

/// The persisted form of a session, written through on every mutation.
///
/// Every field is independently optional on load: snapshots written by older
/// schema revisions restore field-by-field, with defaults filling whatever is
/// missing. The aliases accept the key names the legacy browser persistence
/// used (`results`, `practicalMark`, `seconds`, `notes`, `language`, `code`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Older snapshots carried no id; the store key already scopes them.
    #[serde(default)]
    pub session_id: Option<ReviewId>,
    #[serde(default)]
    pub current_index: usize,
    #[serde(default, alias = "results")]
    pub marks: Vec<QuestionMark>,
    #[serde(default, alias = "practicalMark")]
    pub practical_score: f64,
    #[serde(default)]
    pub practical_link: String,
    #[serde(default, alias = "seconds")]
    pub elapsed_seconds: u64,
    #[serde(default)]
    pub is_paused: bool,
    #[serde(default, alias = "notes")]
    pub reviewer_notes: String,
    #[serde(default, alias = "language")]
    pub workbench_language: WorkbenchLanguage,
    #[serde(default = "default_workbench_code", alias = "code")]
    pub workbench_code: String,
    #[serde(default)]
    pub phase: SessionPhase,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            session_id: None,
            current_index: 0,
            marks: Vec::new(),
            practical_score: 0.0,
            practical_link: String::new(),
            elapsed_seconds: 0,
            is_paused: false,
            reviewer_notes: String::new(),
            workbench_language: WorkbenchLanguage::default(),
            workbench_code: default_workbench_code(),
            phase: SessionPhase::default(),
        }
    }
}

impl SessionSnapshot {
    /// Serializes the snapshot for the session store.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error; snapshots contain only
    /// plain data, so this only fails on allocation-level problems.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses a stored payload leniently: a payload that is not a JSON
    /// object in any recognizable shape yields `None` rather than an error,
    /// so a corrupt store entry degrades to a fresh session.
    #[must_use]
    pub fn from_json(payload: &str) -> Option<Self> {
        serde_json::from_str(payload).ok()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
