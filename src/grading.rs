//! Answer grading.
//!
//! Only objective questions (MCQ and True/False) are auto-graded. An answer counts as
//! correct when, compared case-insensitively and trimmed, it equals the canonical
//! answer or contains the canonical answer's first character. That lenient rule lets
//! `"B"` match `"B) Paris"`, and also accepts any answer that merely contains the
//! letter. Free-text questions never add to the correct count but still count toward
//! the total.

use std::collections::BTreeMap;

use crate::question::{Question, QuestionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
    /// `round(100 * correct / total)`; 0 for an empty quiz
    pub percentage: u32,
}

/// How a single answer is shown in the review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
    /// Free-text answer; not auto-graded
    Ungraded,
}

pub fn is_auto_graded(question_type: QuestionType) -> bool {
    question_type.is_objective()
}

fn normalize(answer: &str) -> String {
    answer.to_lowercase().trim().to_string()
}

/// The lenient comparison used for objective questions. Unanswered is never correct.
pub fn answer_matches(answer: Option<&str>, correct_answer: &str) -> bool {
    let Some(answer) = answer else {
        return false;
    };
    let answer = normalize(answer);
    let correct = normalize(correct_answer);
    if answer == correct {
        return true;
    }
    match correct.chars().next() {
        Some(first) => answer.contains(first),
        // Every string contains the empty prefix.
        None => true,
    }
}

pub fn review_verdict(question: &Question, answer: Option<&str>) -> Verdict {
    if !is_auto_graded(question.question_type) {
        return Verdict::Ungraded;
    }
    if answer_matches(answer, &question.correct_answer) {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    }
}

/// Score `answers` (keyed by question index) against `questions`.
pub fn score(questions: &[Question], answers: &BTreeMap<usize, String>) -> Score {
    let correct = questions
        .iter()
        .enumerate()
        .filter(|(i, q)| review_verdict(q, answers.get(i).map(String::as_str)) == Verdict::Correct)
        .count();
    let total = questions.len();
    let percentage = if total == 0 {
        0
    } else {
        (100.0 * correct as f64 / total as f64).round() as u32
    };
    Score { correct, total, percentage }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    pub index: usize,
    pub question: String,
    pub question_type: QuestionType,
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub explanation: String,
    pub verdict: Verdict,
}

impl QuestionReview {
    /// The user's answer, or "Not answered".
    pub fn answer_display(&self) -> &str {
        match self.user_answer.as_deref() {
            Some(answer) if !answer.trim().is_empty() => answer,
            _ => "Not answered",
        }
    }

    /// Whether the canonical answer should be shown next to the user's.
    pub fn shows_correct_answer(&self) -> bool {
        self.verdict != Verdict::Correct
    }
}

/// Score plus a per-question review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizReport {
    pub score: Score,
    pub reviews: Vec<QuestionReview>,
}

impl QuizReport {
    pub fn new(questions: &[Question], answers: &BTreeMap<usize, String>) -> Self {
        let reviews = questions
            .iter()
            .enumerate()
            .map(|(index, q)| {
                let user_answer = answers.get(&index).cloned();
                QuestionReview {
                    index,
                    question: q.question.clone(),
                    question_type: q.question_type,
                    verdict: review_verdict(q, user_answer.as_deref()),
                    user_answer,
                    correct_answer: q.correct_answer.clone(),
                    explanation: q.explanation.clone(),
                }
            })
            .collect();
        Self { score: score(questions, answers), reviews }
    }

    pub fn headline(&self) -> &'static str {
        match self.score.percentage {
            p if p >= 80 => "Excellent work!",
            p if p >= 60 => "Good job!",
            _ => "Keep practicing!",
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} out of {} questions correct",
            self.score.correct, self.score.total
        )
    }
}
