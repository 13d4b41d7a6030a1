mod ids;
mod mark;
mod question;
mod record;
mod score;
mod snapshot;

pub use ids::{ModuleId, ParseIdError, QuestionId, ReviewId};
pub use mark::{MarkError, MarkStatus, QuestionMark};
pub use question::{CatalogError, Question, QuestionCatalog};
pub use record::{NewReview, RecordStatus, ReviewRecord};
pub use score::{
    PASS_MARK, POINTS_PER_QUESTION, PRACTICAL_WEIGHT, PracticalScore, ScoreBreakdown, ScoreError,
    THEORETICAL_WEIGHT,
};
pub use snapshot::{SessionPhase, SessionSnapshot, WorkbenchLanguage};
