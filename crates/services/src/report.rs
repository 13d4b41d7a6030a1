use std::fmt::Write as _;

use review_core::model::MarkStatus;

use crate::sessions::SessionEngine;

/// Renders the shareable plain-text result report for a session.
///
/// Pure read over the engine: the frozen score when the result is ready,
/// the live score otherwise. Presentation layers copy or print this as-is.
#[must_use]
pub fn render_text_report(
    session: &SessionEngine,
    student_name: &str,
    module_label: &str,
) -> String {
    let score = session.frozen_score().unwrap_or_else(|| session.score());
    let verdict = if score.passed() { "Passed" } else { "Failed" };

    let mut report = String::new();
    let _ = writeln!(report, "Evaluation Report: {student_name}");
    let _ = writeln!(report, "Module: {module_label}");
    let _ = writeln!(report, "Result: {verdict} ({:.1}%)", score.composite_score);
    let _ = writeln!(report);

    push_section(&mut report, session, MarkStatus::NeedsImprovement, "Need Improvement");
    push_section(
        &mut report,
        session,
        MarkStatus::Wrong,
        "Incorrect / Pending Mastery",
    );

    if !session.reviewer_notes().is_empty() {
        let _ = writeln!(report, "Feedback:");
        let _ = writeln!(report, "{}", session.reviewer_notes());
    }

    report
}

fn push_section(report: &mut String, session: &SessionEngine, status: MarkStatus, title: &str) {
    let matching: Vec<&str> = session
        .questions()
        .iter()
        .filter(|q| session.mark_for(q.id).map(|m| m.status()) == Some(status))
        .map(|q| q.text.as_str())
        .collect();
    if matching.is_empty() {
        return;
    }

    let _ = writeln!(report, "{title}");
    let _ = writeln!(report, "---------");
    for text in matching {
        let _ = writeln!(report, "- {text}");
    }
    let _ = writeln!(report);
}
