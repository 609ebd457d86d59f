//! Answer grading over the quiz content model.

use pretexta_content::quiz::Quiz;
use serde::{Deserialize, Serialize};

/// One recorded answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    /// The participant picked option `index`.
    Selected(usize),
    /// The question timer expired unanswered.
    Skipped,
}

/// Per-question verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradedQuestion {
    /// The question graded.
    pub question_id: String,
    /// The recorded answer.
    pub answer: Answer,
    /// Whether the selected option was flagged correct.
    pub correct: bool,
}

/// Result of grading one quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizGrade {
    /// Score on the `0..=100` scale, `round(correct / total * 100)`.
    pub score: i32,
    /// Questions answered correctly.
    pub correct: usize,
    /// Questions asked.
    pub total: usize,
    /// Per-question verdicts, in quiz order.
    pub questions: Vec<GradedQuestion>,
}

/// Grades the given answers against a quiz. Answers pair with questions by
/// id; questions without a recorded answer count as skipped.
#[must_use]
pub fn grade(quiz: &Quiz, answers: &[(String, Answer)]) -> QuizGrade {
    let mut graded = Vec::with_capacity(quiz.questions.len());
    let mut correct_count = 0;

    for question in &quiz.questions {
        let answer = answers
            .iter()
            .find(|(id, _)| *id == question.id)
            .map_or(Answer::Skipped, |(_, answer)| *answer);
        let correct = match answer {
            Answer::Selected(index) => question.options.get(index).is_some_and(|o| o.correct),
            Answer::Skipped => false,
        };
        if correct {
            correct_count += 1;
        }
        graded.push(GradedQuestion {
            question_id: question.id.clone(),
            answer,
            correct,
        });
    }

    let total = quiz.questions.len();
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let score = if total == 0 {
        0
    } else {
        (correct_count as f64 / total as f64 * 100.0).round() as i32
    };

    QuizGrade {
        score,
        correct: correct_count,
        total,
        questions: graded,
    }
}
