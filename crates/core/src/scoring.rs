//! Local, optimistic scoring of an attempt.
//!
//! The backend owns the authoritative result (including XP, points and
//! badges). This mirrors its rules so the UI can preview an outcome before
//! the server answers.

use crate::model::{AnswerMap, Attempt, QuizResult, ResultSource};

/// Score an attempt against the current answers.
///
/// Per question: `points_correct` for the correct option, `points_wrong` for
/// any other chosen option, nothing when unanswered. A question whose correct
/// option is unknown counts as wrong when answered.
#[must_use]
pub fn score_locally(attempt: &Attempt, answers: &AnswerMap) -> QuizResult {
    let mut score_points = 0_i32;
    let mut correct_count = 0_u32;
    let mut wrong_count = 0_u32;
    let mut unanswered_count = 0_u32;

    for question in attempt.questions() {
        match answers.get(question.id()) {
            None => unanswered_count = unanswered_count.saturating_add(1),
            Some(choice) if question.is_correct(choice) == Some(true) => {
                correct_count = correct_count.saturating_add(1);
                score_points = score_points.saturating_add(question.points_correct());
            }
            Some(_) => {
                wrong_count = wrong_count.saturating_add(1);
                score_points = score_points.saturating_add(question.points_wrong());
            }
        }
    }

    let percent_correct = percent(correct_count, attempt.question_count());
    let is_passed = attempt
        .level()
        .pass_condition()
        .is_met(score_points, correct_count, percent_correct);

    QuizResult {
        score_points,
        correct_count,
        wrong_count,
        unanswered_count,
        percent_correct,
        xp_earned: 0,
        points_earned: 0,
        is_passed,
        new_total_xp: None,
        badges_earned: Vec::new(),
        source: ResultSource::Local,
    }
}

/// `part / total * 100`, or 0 when there is nothing to divide by.
#[must_use]
pub fn percent(part: u32, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let total = total as f64;
    f64::from(part) / total * 100.0
}
