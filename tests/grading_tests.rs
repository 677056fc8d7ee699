
use std::collections::BTreeMap;

use quiz_forge::grading::{review_verdict, score, QuizReport, Verdict};
use quiz_forge::QuestionType;
use test_utils::{mcq, open_question, sample_mcqs};

fn answers(pairs: &[(usize, &str)]) -> BTreeMap<usize, String> {
    pairs.iter().map(|(i, a)| (*i, a.to_string())).collect()
}

#[test]
fn option_letters_score_against_prefixed_answers() {
    let questions = sample_mcqs();
    let result = score(&questions, &answers(&[(0, "B"), (1, "A"), (2, "X")]));
    assert_eq!(result.correct, 2);
    assert_eq!(result.total, 3);
    assert_eq!(result.percentage, 67);
}

#[test]
fn true_false_is_case_insensitive() {
    let questions = vec![open_question(QuestionType::TrueFalse, "The sky is blue.", "True")];
    let result = score(&questions, &answers(&[(0, "true")]));
    assert_eq!(result.correct, 1);
    assert_eq!(result.percentage, 100);
}

#[test]
fn first_letter_match_is_lenient() {
    // Any answer containing the canonical answer's first letter is accepted.
    let questions = vec![mcq("Capital of France?", &["A) Berlin", "B) Paris"], "B) Paris")];
    let result = score(&questions, &answers(&[(0, "A) Berlin")]));
    assert_eq!(result.correct, 1);
}

#[test]
fn full_option_text_matches() {
    let questions = sample_mcqs();
    let result = score(&questions, &answers(&[(0, "B) Paris"), (1, "a) 1945"), (2, "  C) OXYGEN ")]));
    assert_eq!(result.correct, 3);
    assert_eq!(result.percentage, 100);
}

#[test]
fn unanswered_questions_are_wrong() {
    let questions = sample_mcqs();
    let result = score(&questions, &BTreeMap::new());
    assert_eq!(result.correct, 0);
    assert_eq!(result.percentage, 0);
}

#[test]
fn free_text_types_never_count_but_stay_in_total() {
    let questions = vec![
        mcq("Capital of France?", &["A) Berlin", "B) Paris"], "B) Paris"),
        open_question(QuestionType::OneWord, "Chemical symbol for gold?", "Au"),
        open_question(QuestionType::Brief, "Why is the sky blue?", "Rayleigh scattering"),
        open_question(QuestionType::LongAnswer, "Explain photosynthesis.", "Plants convert light"),
    ];
    let given = answers(&[(0, "B"), (1, "Au"), (2, "Rayleigh scattering"), (3, "Plants convert light")]);
    let result = score(&questions, &given);
    assert_eq!(result.correct, 1);
    assert_eq!(result.total, 4);
    assert_eq!(result.percentage, 25);
}

#[test]
fn scoring_is_repeatable() {
    let questions = sample_mcqs();
    let given = answers(&[(0, "B"), (2, "C")]);
    assert_eq!(score(&questions, &given), score(&questions, &given));
}

#[test]
fn review_agrees_with_score() {
    let questions = vec![
        mcq("Capital of France?", &["A) Berlin", "B) Paris"], "B) Paris"),
        open_question(QuestionType::OneWord, "Chemical symbol for gold?", "Au"),
    ];
    assert_eq!(review_verdict(&questions[0], Some("b")), Verdict::Correct);
    assert_eq!(review_verdict(&questions[0], None), Verdict::Incorrect);
    assert_eq!(review_verdict(&questions[1], Some("au")), Verdict::Ungraded);
}

#[test]
fn report_lists_each_question() {
    let questions = sample_mcqs();
    let report = QuizReport::new(&questions, &answers(&[(0, "B"), (1, "A")]));
    assert_eq!(report.score.percentage, 67);
    assert_eq!(report.headline(), "Good job!");
    assert_eq!(report.summary(), "2 out of 3 questions correct");

    assert_eq!(report.reviews.len(), 3);
    assert!(!report.reviews[0].shows_correct_answer());
    assert_eq!(report.reviews[2].answer_display(), "Not answered");
    assert!(report.reviews[2].shows_correct_answer());
    assert_eq!(report.reviews[2].correct_answer, "C) Oxygen");
}

#[test]
fn headline_tiers() {
    let questions = sample_mcqs();
    let all = QuizReport::new(&questions, &answers(&[(0, "B"), (1, "A"), (2, "C")]));
    assert_eq!(all.headline(), "Excellent work!");
    let none = QuizReport::new(&questions, &BTreeMap::new());
    assert_eq!(none.headline(), "Keep practicing!");
}
