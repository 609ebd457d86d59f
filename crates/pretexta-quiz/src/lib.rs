//! Quiz grading.
//!
//! Quizzes are graded server-side from the recorded answers: a question is
//! correct when the selected option is flagged correct, and a timer skip is
//! always wrong.

pub mod grading;

pub use grading::{Answer, GradedQuestion, QuizGrade, grade};
