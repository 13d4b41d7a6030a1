use std::collections::HashMap;
use std::fmt;

use review_core::model::{
    MarkStatus, ModuleId, PracticalScore, Question, QuestionCatalog, QuestionId, QuestionMark,
    RecordStatus, ReviewId, ScoreBreakdown, SessionPhase, SessionSnapshot, WorkbenchLanguage,
};

use super::progress::SessionProgress;
use crate::error::SessionError;
use crate::record_client::FinalizeUpdate;

//
// ─── MARK OUTCOME ─────────────────────────────────────────────────────────────
//

/// Result of marking a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkOutcome {
    pub mark: QuestionMark,
    /// Whether the engine auto-advanced to the next question.
    pub advanced: bool,
}

//
// ─── SESSION ENGINE ───────────────────────────────────────────────────────────
//

/// Stateful engine for one evaluation session.
///
/// Owns the module's question walk, the reviewer's marks, the practical
/// fields, the advisory timer, and the submit workflow phases. All
/// operations are synchronous `&mut self` calls; the composite score is
/// never stored while the session is in progress — it is recomputed from
/// the marks on every read and only frozen when the feedback step confirms.
pub struct SessionEngine {
    session_id: ReviewId,
    module_id: ModuleId,
    questions: Vec<Question>,
    current: usize,
    marks: HashMap<QuestionId, QuestionMark>,
    elapsed_seconds: u64,
    is_paused: bool,
    practical_score: PracticalScore,
    practical_link: String,
    reviewer_notes: String,
    workbench_language: WorkbenchLanguage,
    workbench_code: String,
    phase: SessionPhase,
    frozen_score: Option<ScoreBreakdown>,
}

impl SessionEngine {
    /// Start (or resume) the session for a scheduled review.
    ///
    /// Derives the module's question set from the catalog — the same catalog
    /// always yields the same set and order, which keeps the current index
    /// meaningful across restarts. When `restored` is present and belongs to
    /// this session (a snapshot without an id is a legacy schema and is
    /// accepted; a mismatched id is ignored), state is rebuilt field by
    /// field: the index is clamped into range, marks for questions outside
    /// the module set are dropped, and an out-of-domain practical score is
    /// clamped. Calling `start` again with the same inputs yields an
    /// equivalent engine.
    #[must_use]
    pub fn start(
        session_id: ReviewId,
        module_id: ModuleId,
        catalog: &QuestionCatalog,
        restored: Option<SessionSnapshot>,
    ) -> Self {
        let questions = catalog.for_module(module_id);

        let mut engine = Self {
            session_id,
            module_id,
            questions,
            current: 0,
            marks: HashMap::new(),
            elapsed_seconds: 0,
            is_paused: false,
            practical_score: PracticalScore::default(),
            practical_link: String::new(),
            reviewer_notes: String::new(),
            workbench_language: WorkbenchLanguage::default(),
            workbench_code: WorkbenchLanguage::default().starter_snippet().to_string(),
            phase: SessionPhase::InProgress,
            frozen_score: None,
        };

        let Some(snapshot) = restored else {
            return engine;
        };
        if snapshot.session_id.is_some_and(|id| id != session_id) {
            return engine;
        }

        engine.current = clamp_index(snapshot.current_index, engine.questions.len());
        for mark in snapshot.marks {
            if engine.contains_question(mark.question_id()) {
                engine.marks.insert(mark.question_id(), mark);
            }
        }
        engine.practical_score = PracticalScore::clamped(snapshot.practical_score);
        engine.practical_link = snapshot.practical_link;
        engine.elapsed_seconds = snapshot.elapsed_seconds;
        engine.is_paused = snapshot.is_paused;
        engine.reviewer_notes = snapshot.reviewer_notes;
        engine.workbench_language = snapshot.workbench_language;
        engine.workbench_code = snapshot.workbench_code;
        engine.phase = snapshot.phase;
        if engine.phase == SessionPhase::ResultReady {
            // The frozen score is not persisted; recomputing it from the
            // restored marks is deterministic.
            engine.frozen_score = Some(engine.score());
        }

        engine
    }

    //
    // ─── ACCESSORS ────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn session_id(&self) -> ReviewId {
        self.session_id
    }

    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn mark_for(&self, question_id: QuestionId) -> Option<&QuestionMark> {
        self.marks.get(&question_id)
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    #[must_use]
    pub fn practical_score(&self) -> PracticalScore {
        self.practical_score
    }

    #[must_use]
    pub fn practical_link(&self) -> &str {
        &self.practical_link
    }

    #[must_use]
    pub fn reviewer_notes(&self) -> &str {
        &self.reviewer_notes
    }

    #[must_use]
    pub fn workbench_language(&self) -> WorkbenchLanguage {
        self.workbench_language
    }

    #[must_use]
    pub fn workbench_code(&self) -> &str {
        &self.workbench_code
    }

    /// The score frozen by `confirm_feedback`, if the session reached
    /// `ResultReady`.
    #[must_use]
    pub fn frozen_score(&self) -> Option<ScoreBreakdown> {
        self.frozen_score
    }

    /// The composite score as of the current marks, recomputed on every
    /// call.
    #[must_use]
    pub fn score(&self) -> ScoreBreakdown {
        ScoreBreakdown::compute(self.marks.values(), self.questions.len(), self.practical_score)
    }

    /// Returns a summary of the current marking progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.questions.len();
        let marked = self.marked_count();
        SessionProgress {
            total,
            marked,
            remaining: total - marked,
            first_unmarked: self.first_unmarked(),
            is_complete: marked == total,
        }
    }

    fn marked_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| self.marks.contains_key(&q.id))
            .count()
    }

    fn first_unmarked(&self) -> Option<usize> {
        self.questions
            .iter()
            .position(|q| !self.marks.contains_key(&q.id))
    }

    fn contains_question(&self, question_id: QuestionId) -> bool {
        self.questions.iter().any(|q| q.id == question_id)
    }

    //
    // ─── NAVIGATION ───────────────────────────────────────────────────────
    //

    /// Whether `next` would move forward (false at the last question).
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.current + 1 < self.questions.len()
    }

    /// Whether `previous` would move back (false at the first question).
    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    /// Jump to the given question index, clamped into range. A no-op when
    /// the module has no questions.
    pub fn go_to(&mut self, index: usize) {
        self.current = clamp_index(index, self.questions.len());
    }

    /// Move to the next question; silently stays put at the last one.
    pub fn next(&mut self) {
        if self.can_advance() {
            self.current += 1;
        }
    }

    /// Move to the previous question; silently stays put at the first one.
    pub fn previous(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    //
    // ─── MARKING ──────────────────────────────────────────────────────────
    //

    /// Record the reviewer's judgment for a question, replacing any earlier
    /// mark for it. When the marked question is not the last in sequence the
    /// engine advances to the next question immediately.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` outside `InProgress` and
    /// `SessionError::UnknownQuestion` for ids outside the module set; both
    /// leave the session untouched.
    pub fn mark(
        &mut self,
        question_id: QuestionId,
        status: MarkStatus,
    ) -> Result<MarkOutcome, SessionError> {
        self.require_phase(SessionPhase::InProgress, "mark")?;
        if !self.contains_question(question_id) {
            return Err(SessionError::UnknownQuestion(question_id));
        }

        let mark = QuestionMark::new(question_id, status);
        self.marks.insert(question_id, mark);

        let marked_last = self.questions.last().map(|q| q.id) == Some(question_id);
        let advanced = !marked_last && self.can_advance();
        if advanced {
            self.current += 1;
        }

        Ok(MarkOutcome { mark, advanced })
    }

    //
    // ─── PRACTICAL, NOTES, WORKBENCH ──────────────────────────────────────
    //

    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` outside `InProgress`.
    pub fn set_practical_score(&mut self, score: PracticalScore) -> Result<(), SessionError> {
        self.require_phase(SessionPhase::InProgress, "set practical score")?;
        self.practical_score = score;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` outside `InProgress`.
    pub fn set_practical_link(&mut self, link: impl Into<String>) -> Result<(), SessionError> {
        self.require_phase(SessionPhase::InProgress, "set practical link")?;
        self.practical_link = link.into();
        Ok(())
    }

    /// Reviewer notes stay editable through the feedback step.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` once the result is frozen.
    pub fn set_reviewer_notes(&mut self, notes: impl Into<String>) -> Result<(), SessionError> {
        if self.phase == SessionPhase::ResultReady {
            return Err(SessionError::InvalidPhase {
                op: "edit notes",
                phase: self.phase,
            });
        }
        self.reviewer_notes = notes.into();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` outside `InProgress`.
    pub fn set_workbench_code(&mut self, code: impl Into<String>) -> Result<(), SessionError> {
        self.require_phase(SessionPhase::InProgress, "edit workbench")?;
        self.workbench_code = code.into();
        Ok(())
    }

    /// Switch the workbench language, resetting the buffer to the language's
    /// starter snippet.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` outside `InProgress`.
    pub fn set_workbench_language(
        &mut self,
        language: WorkbenchLanguage,
    ) -> Result<(), SessionError> {
        self.require_phase(SessionPhase::InProgress, "edit workbench")?;
        self.workbench_language = language;
        self.workbench_code = language.starter_snippet().to_string();
        Ok(())
    }

    //
    // ─── TIMER ────────────────────────────────────────────────────────────
    //

    /// Advance the advisory elapsed-time counter by one second, unless
    /// paused. Never gates any other operation.
    pub fn tick(&mut self) {
        if !self.is_paused {
            self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
        }
    }

    pub fn pause(&mut self) {
        self.is_paused = true;
    }

    pub fn resume(&mut self) {
        self.is_paused = false;
    }

    //
    // ─── SUBMIT WORKFLOW ──────────────────────────────────────────────────
    //

    /// Request the transition into the feedback step.
    ///
    /// Two gates run in order: every module question must carry a mark
    /// (reported with the index of the first unmarked question), then the
    /// practical link must be non-empty after trimming. Only when both pass
    /// does the phase become `AwaitingFeedback`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::QuestionsIncomplete`,
    /// `SessionError::MissingPracticalLink`, or
    /// `SessionError::InvalidPhase`; the phase is unchanged on every error.
    pub fn request_submit(&mut self) -> Result<(), SessionError> {
        self.require_phase(SessionPhase::InProgress, "submit")?;

        if let Some(first_unmarked) = self.first_unmarked() {
            return Err(SessionError::QuestionsIncomplete { first_unmarked });
        }
        if self.practical_link.trim().is_empty() {
            return Err(SessionError::MissingPracticalLink);
        }

        self.phase = SessionPhase::AwaitingFeedback;
        Ok(())
    }

    /// Confirm the feedback step: freezes the score and enters
    /// `ResultReady`. Notes may be empty.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` outside `AwaitingFeedback`.
    pub fn confirm_feedback(&mut self) -> Result<ScoreBreakdown, SessionError> {
        self.require_phase(SessionPhase::AwaitingFeedback, "confirm feedback")?;
        let score = self.score();
        self.frozen_score = Some(score);
        self.phase = SessionPhase::ResultReady;
        Ok(score)
    }

    /// Back out of the feedback step without altering any data.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` outside `AwaitingFeedback`.
    pub fn cancel_feedback(&mut self) -> Result<(), SessionError> {
        self.require_phase(SessionPhase::AwaitingFeedback, "cancel feedback")?;
        self.phase = SessionPhase::InProgress;
        Ok(())
    }

    /// Build the immutable finalize payload from the frozen result.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` unless the session is in
    /// `ResultReady`.
    pub fn finalize_update(&self) -> Result<FinalizeUpdate, SessionError> {
        self.require_phase(SessionPhase::ResultReady, "finalize")?;
        let score = self.frozen_score.unwrap_or_else(|| self.score());

        Ok(FinalizeUpdate {
            status: if score.passed() {
                RecordStatus::Completed
            } else {
                RecordStatus::Failed
            },
            scores: score,
            notes: self.reviewer_notes.clone(),
            session_snapshot: self.snapshot(),
        })
    }

    fn require_phase(&self, expected: SessionPhase, op: &'static str) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidPhase {
                op,
                phase: self.phase,
            })
        }
    }

    //
    // ─── PERSISTENCE ──────────────────────────────────────────────────────
    //

    /// The persisted form of the current state. Marks are emitted in
    /// question order so the serialized bytes are stable for identical
    /// state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: Some(self.session_id),
            current_index: self.current,
            marks: self
                .questions
                .iter()
                .filter_map(|q| self.marks.get(&q.id).copied())
                .collect(),
            practical_score: self.practical_score.value(),
            practical_link: self.practical_link.clone(),
            elapsed_seconds: self.elapsed_seconds,
            is_paused: self.is_paused,
            reviewer_notes: self.reviewer_notes.clone(),
            workbench_language: self.workbench_language,
            workbench_code: self.workbench_code.clone(),
            phase: self.phase,
        }
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { index.min(len - 1) }
}

impl fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionEngine")
            .field("session_id", &self.session_id)
            .field("module_id", &self.module_id)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("marks_len", &self.marks.len())
            .field("elapsed_seconds", &self.elapsed_seconds)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn build_catalog() -> QuestionCatalog {
        let questions = (1..=4_u64)
            .map(|id| Question {
                id: QuestionId::new(id),
                module_id: ModuleId::new(1),
                text: format!("Q{id}"),
                reference_answer: format!("A{id}"),
            })
            .chain(std::iter::once(Question {
                id: QuestionId::new(50),
                module_id: ModuleId::new(2),
                text: "other module".to_string(),
                reference_answer: String::new(),
            }))
            .collect();
        QuestionCatalog::new(questions)
    }

    fn build_engine() -> SessionEngine {
        SessionEngine::start(ReviewId::new(9), ModuleId::new(1), &build_catalog(), None)
    }

    fn mark_all(engine: &mut SessionEngine, status: MarkStatus) {
        let ids: Vec<QuestionId> = engine.questions().iter().map(|q| q.id).collect();
        for id in ids {
            engine.mark(id, status).unwrap();
        }
    }

    #[test]
    fn fresh_session_has_defaults() {
        let engine = build_engine();
        assert_eq!(engine.questions().len(), 4);
        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.phase(), SessionPhase::InProgress);
        assert_eq!(engine.elapsed_seconds(), 0);
        assert!(!engine.is_paused());
        assert_eq!(engine.workbench_code(), WorkbenchLanguage::C.starter_snippet());
        assert!(engine.frozen_score().is_none());
    }

    #[test]
    fn navigation_clamps_and_saturates() {
        let mut engine = build_engine();

        engine.previous();
        assert_eq!(engine.current_index(), 0);
        assert!(!engine.can_go_back());

        engine.go_to(99);
        assert_eq!(engine.current_index(), 3);
        assert!(!engine.can_advance());

        engine.next();
        assert_eq!(engine.current_index(), 3);

        engine.go_to(1);
        assert_eq!(engine.current_index(), 1);
        assert!(engine.can_advance() && engine.can_go_back());
    }

    #[test]
    fn marking_advances_except_at_last_question() {
        let mut engine = build_engine();

        let outcome = engine.mark(QuestionId::new(1), MarkStatus::Answered).unwrap();
        assert!(outcome.advanced);
        assert_eq!(engine.current_index(), 1);

        engine.go_to(3);
        let outcome = engine.mark(QuestionId::new(4), MarkStatus::Wrong).unwrap();
        assert!(!outcome.advanced);
        assert_eq!(engine.current_index(), 3);
    }

    #[test]
    fn remarking_replaces_contribution() {
        let mut engine = build_engine();
        engine.mark(QuestionId::new(1), MarkStatus::Answered).unwrap();
        assert_eq!(engine.score().theoretical_earned, 10);

        engine.mark(QuestionId::new(1), MarkStatus::Wrong).unwrap();
        assert_eq!(engine.score().theoretical_earned, 0);
        assert_eq!(engine.progress().marked, 1);
    }

    #[test]
    fn marking_foreign_question_is_rejected() {
        let mut engine = build_engine();
        let err = engine.mark(QuestionId::new(50), MarkStatus::Answered).unwrap_err();
        assert!(matches!(err, SessionError::UnknownQuestion(_)));
        assert_eq!(engine.progress().marked, 0);
    }

    #[test]
    fn score_matches_weighted_blend() {
        let mut engine = build_engine();
        engine.mark(QuestionId::new(1), MarkStatus::Answered).unwrap();
        engine.mark(QuestionId::new(2), MarkStatus::Answered).unwrap();
        engine.mark(QuestionId::new(3), MarkStatus::NeedsImprovement).unwrap();
        engine.mark(QuestionId::new(4), MarkStatus::Wrong).unwrap();
        engine
            .set_practical_score(PracticalScore::new(8.0).unwrap())
            .unwrap();

        let score = engine.score();
        assert_eq!(score.theoretical_earned, 25);
        assert_eq!(score.theoretical_max, 40);
        assert!((score.composite_score - 67.75).abs() < 1e-9);
        assert!(score.passed());
    }

    #[test]
    fn submit_reports_first_unmarked_question_first() {
        let mut engine = build_engine();
        engine.mark(QuestionId::new(1), MarkStatus::Answered).unwrap();
        engine.mark(QuestionId::new(3), MarkStatus::Answered).unwrap();
        // The link being set must not shadow the incomplete-questions gate.
        engine.set_practical_link("https://tasks.example/1").unwrap();

        let err = engine.request_submit().unwrap_err();
        assert!(matches!(
            err,
            SessionError::QuestionsIncomplete { first_unmarked: 1 }
        ));
        assert_eq!(engine.phase(), SessionPhase::InProgress);
    }

    #[test]
    fn submit_requires_non_blank_practical_link() {
        let mut engine = build_engine();
        mark_all(&mut engine, MarkStatus::Answered);
        engine.set_practical_link("   ").unwrap();

        let err = engine.request_submit().unwrap_err();
        assert!(matches!(err, SessionError::MissingPracticalLink));
        assert_eq!(engine.phase(), SessionPhase::InProgress);
    }

    #[test]
    fn submit_enters_feedback_when_gates_pass() {
        let mut engine = build_engine();
        mark_all(&mut engine, MarkStatus::Answered);
        engine.set_practical_link("https://tasks.example/1").unwrap();

        engine.request_submit().unwrap();
        assert_eq!(engine.phase(), SessionPhase::AwaitingFeedback);
    }

    #[test]
    fn feedback_can_be_cancelled_without_losing_data() {
        let mut engine = build_engine();
        mark_all(&mut engine, MarkStatus::Answered);
        engine.set_practical_link("https://tasks.example/1").unwrap();
        engine.request_submit().unwrap();
        engine.set_reviewer_notes("strong session").unwrap();

        engine.cancel_feedback().unwrap();
        assert_eq!(engine.phase(), SessionPhase::InProgress);
        assert_eq!(engine.reviewer_notes(), "strong session");
        assert_eq!(engine.progress().marked, 4);
    }

    #[test]
    fn confirm_freezes_score_and_locks_mutations() {
        let mut engine = build_engine();
        mark_all(&mut engine, MarkStatus::Answered);
        engine
            .set_practical_score(PracticalScore::new(9.0).unwrap())
            .unwrap();
        engine.set_practical_link("https://tasks.example/1").unwrap();
        engine.request_submit().unwrap();

        let frozen = engine.confirm_feedback().unwrap();
        assert_eq!(engine.phase(), SessionPhase::ResultReady);
        assert_eq!(engine.frozen_score(), Some(frozen));
        assert!(frozen.passed());

        let err = engine.mark(QuestionId::new(1), MarkStatus::Wrong).unwrap_err();
        assert!(matches!(err, SessionError::InvalidPhase { .. }));
        let err = engine.set_reviewer_notes("too late").unwrap_err();
        assert!(matches!(err, SessionError::InvalidPhase { .. }));
    }

    #[test]
    fn finalize_update_reflects_pass_and_fail() {
        let mut engine = build_engine();
        mark_all(&mut engine, MarkStatus::Answered);
        engine.set_practical_link("https://tasks.example/1").unwrap();
        engine.set_reviewer_notes("excellent").unwrap();
        engine.request_submit().unwrap();
        engine.confirm_feedback().unwrap();

        let update = engine.finalize_update().unwrap();
        assert_eq!(update.status, RecordStatus::Completed);
        assert_eq!(update.scores.theoretical_earned, 40);
        assert_eq!(update.notes, "excellent");
        assert_eq!(update.session_snapshot, engine.snapshot());

        let mut failing = build_engine();
        mark_all(&mut failing, MarkStatus::Wrong);
        failing.set_practical_link("https://tasks.example/2").unwrap();
        failing.request_submit().unwrap();
        failing.confirm_feedback().unwrap();

        let update = failing.finalize_update().unwrap();
        assert_eq!(update.status, RecordStatus::Failed);
        assert!(!update.scores.passed());
    }

    #[test]
    fn finalize_update_outside_result_ready_is_rejected() {
        let engine = build_engine();
        let err = engine.finalize_update().unwrap_err();
        assert!(matches!(err, SessionError::InvalidPhase { .. }));
    }

    #[test]
    fn timer_respects_pause() {
        let mut engine = build_engine();
        engine.tick();
        engine.tick();
        assert_eq!(engine.elapsed_seconds(), 2);

        engine.pause();
        engine.tick();
        assert_eq!(engine.elapsed_seconds(), 2);

        engine.resume();
        engine.tick();
        assert_eq!(engine.elapsed_seconds(), 3);
    }

    #[test]
    fn restore_reproduces_identical_state() {
        let mut engine = build_engine();
        engine.mark(QuestionId::new(1), MarkStatus::Answered).unwrap();
        engine.mark(QuestionId::new(2), MarkStatus::NeedsImprovement).unwrap();
        engine
            .set_practical_score(PracticalScore::new(7.5).unwrap())
            .unwrap();
        engine.set_practical_link("https://tasks.example/1").unwrap();
        engine.set_reviewer_notes("halfway".to_string()).unwrap();
        for _ in 0..120 {
            engine.tick();
        }
        engine.pause();

        let restored = SessionEngine::start(
            ReviewId::new(9),
            ModuleId::new(1),
            &build_catalog(),
            Some(engine.snapshot()),
        );

        assert_eq!(restored.snapshot(), engine.snapshot());
        assert_eq!(restored.current_index(), engine.current_index());
        assert_eq!(restored.elapsed_seconds(), 120);
        assert!(restored.is_paused());

        // Restoring again from the same snapshot is idempotent.
        let again = SessionEngine::start(
            ReviewId::new(9),
            ModuleId::new(1),
            &build_catalog(),
            Some(restored.snapshot()),
        );
        assert_eq!(again.snapshot(), restored.snapshot());
    }

    #[test]
    fn restore_ignores_snapshot_for_other_session() {
        let mut engine = build_engine();
        engine.mark(QuestionId::new(1), MarkStatus::Answered).unwrap();

        let restored = SessionEngine::start(
            ReviewId::new(1000),
            ModuleId::new(1),
            &build_catalog(),
            Some(engine.snapshot()),
        );
        assert_eq!(restored.progress().marked, 0);
        assert_eq!(restored.current_index(), 0);
    }

    #[test]
    fn restore_clamps_index_and_drops_foreign_marks() {
        let snapshot = SessionSnapshot {
            session_id: Some(ReviewId::new(9)),
            current_index: 40,
            marks: vec![
                QuestionMark::new(QuestionId::new(2), MarkStatus::Answered),
                QuestionMark::new(QuestionId::new(50), MarkStatus::Answered),
            ],
            practical_score: 44.0,
            ..SessionSnapshot::default()
        };

        let engine = SessionEngine::start(
            ReviewId::new(9),
            ModuleId::new(1),
            &build_catalog(),
            Some(snapshot),
        );

        assert_eq!(engine.current_index(), 3);
        assert_eq!(engine.progress().marked, 1);
        assert!(engine.mark_for(QuestionId::new(50)).is_none());
        assert_eq!(engine.practical_score().value(), 10.0);
    }

    #[test]
    fn restore_into_result_ready_refreezes_score() {
        let mut engine = build_engine();
        mark_all(&mut engine, MarkStatus::Answered);
        engine.set_practical_link("https://tasks.example/1").unwrap();
        engine.request_submit().unwrap();
        let frozen = engine.confirm_feedback().unwrap();

        let restored = SessionEngine::start(
            ReviewId::new(9),
            ModuleId::new(1),
            &build_catalog(),
            Some(engine.snapshot()),
        );
        assert_eq!(restored.phase(), SessionPhase::ResultReady);
        assert_eq!(restored.frozen_score(), Some(frozen));
    }

    #[test]
    fn empty_module_scores_practical_only() {
        let mut engine =
            SessionEngine::start(ReviewId::new(9), ModuleId::new(77), &build_catalog(), None);
        assert!(engine.current_question().is_none());

        engine
            .set_practical_score(PracticalScore::new(8.0).unwrap())
            .unwrap();
        let score = engine.score();
        assert_eq!(score.theoretical_max, 0);
        assert!((score.composite_score - 24.0).abs() < 1e-9);

        // With no questions the first gate passes trivially.
        engine.set_practical_link("https://tasks.example/1").unwrap();
        engine.request_submit().unwrap();
        assert_eq!(engine.phase(), SessionPhase::AwaitingFeedback);
    }

    #[test]
    fn workbench_language_switch_resets_buffer() {
        let mut engine = build_engine();
        engine.set_workbench_code("int x;").unwrap();
        engine.set_workbench_language(WorkbenchLanguage::Java).unwrap();
        assert_eq!(engine.workbench_code(), WorkbenchLanguage::Java.starter_snippet());
    }
}
