//! Question entity model and the quiz configuration chosen before generation.
//!
//! Field names on the wire are camelCase (`correctAnswer`, `questionType`, ...) and
//! question types use their display names (`"MCQ"`, `"True/False"`, ...), matching what
//! the generation service returns.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Smallest number of questions a quiz may ask for.
pub const MIN_QUESTION_COUNT: u8 = 3;
/// Largest number of questions a quiz may ask for.
pub const MAX_QUESTION_COUNT: u8 = 20;

/// The closed set of answer formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub enum QuestionType {
    /// Multiple choice with lettered options
    #[default]
    #[serde(rename = "MCQ", alias = "Multiple Choice", alias = "mcq")]
    Mcq,
    /// A statement to be judged true or false
    #[serde(rename = "True/False", alias = "True or False", alias = "TrueFalse")]
    TrueFalse,
    /// Answered with a single word
    #[serde(rename = "One Word", alias = "OneWord")]
    OneWord,
    /// Answered in one or two sentences
    #[serde(rename = "Brief")]
    Brief,
    /// Answered with a detailed explanation
    #[serde(rename = "Long Answer", alias = "LongAnswer")]
    LongAnswer,
}

impl QuestionType {
    /// Wire and display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mcq => "MCQ",
            Self::TrueFalse => "True/False",
            Self::OneWord => "One Word",
            Self::Brief => "Brief",
            Self::LongAnswer => "Long Answer",
        }
    }

    /// Whether answers are picked from a fixed set rather than typed freely.
    pub fn is_objective(&self) -> bool {
        matches!(self, Self::Mcq | Self::TrueFalse)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = ConfigError;

    /// Case-insensitive; accepts the display names and dashed/underscored forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "mcq" | "multiplechoice" => Ok(Self::Mcq),
            "truefalse" | "tf" | "trueorfalse" => Ok(Self::TrueFalse),
            "oneword" | "word" => Ok(Self::OneWord),
            "brief" | "short" => Ok(Self::Brief),
            "longanswer" | "long" => Ok(Self::LongAnswer),
            _ => Err(ConfigError::Invalid(format!(
                "unknown question type '{}'. Supported: mcq, true-false, one-word, brief, long-answer",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(ConfigError::Invalid(format!(
                "unknown difficulty '{}'. Supported: easy, medium, hard",
                s
            ))),
        }
    }
}

/// A generated question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(title = "Question", description = "A single quiz question generated from the source content")]
pub struct Question {
    /// The question text shown to the quiz taker
    pub question: String,
    /// The answer format of this question
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// Answer options, prefixed "A) ", "B) ", ... (MCQ only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// The canonical answer: the option text or letter for MCQ, "True"/"False" for True/False
    pub correct_answer: String,
    /// Why the answer is correct
    #[serde(default)]
    pub explanation: String,
}

impl Question {
    /// Options for display; empty for non-MCQ questions.
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }

    /// The choices a taker picks from, if the type has a fixed set.
    pub fn choices(&self) -> Vec<String> {
        match self.question_type {
            QuestionType::Mcq => self.options().to_vec(),
            QuestionType::TrueFalse => vec!["True".to_string(), "False".to_string()],
            _ => Vec::new(),
        }
    }

    /// Turn what the taker typed into the answer to record: a letter or number picks
    /// that choice (`"b"` → `"B) Paris"`), `t`/`f` pick True/False, anything else is
    /// kept as typed.
    pub fn resolve_answer(&self, input: &str) -> String {
        let input = input.trim();
        let choices = self.choices();
        if choices.is_empty() {
            return input.to_string();
        }

        let lowered = input.to_lowercase();
        if self.question_type == QuestionType::TrueFalse {
            match lowered.as_str() {
                "t" | "true" | "1" => return choices[0].clone(),
                "f" | "false" | "2" => return choices[1].clone(),
                _ => return input.to_string(),
            }
        }

        let mut chars = lowered.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_lowercase() {
                let index = (c as u8 - b'a') as usize;
                if let Some(choice) = choices.get(index) {
                    return choice.clone();
                }
            }
        }
        if let Ok(n) = lowered.parse::<usize>() {
            if let Some(choice) = n.checked_sub(1).and_then(|i| choices.get(i)) {
                return choice.clone();
            }
        }
        input.to_string()
    }

    /// Structural problems that make the question unusable, if any.
    pub fn defect(&self) -> Option<String> {
        if self.question.trim().is_empty() {
            return Some("question text is empty".to_string());
        }
        if self.question_type == QuestionType::Mcq && self.options().is_empty() {
            return Some("multiple-choice question has no options".to_string());
        }
        None
    }
}

/// The selection made in the configure stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizConfig {
    question_type: QuestionType,
    difficulty: Difficulty,
    question_count: u8,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            question_type: QuestionType::Mcq,
            difficulty: Difficulty::Medium,
            question_count: 5,
        }
    }
}

impl QuizConfig {
    pub fn new(
        question_type: QuestionType,
        difficulty: Difficulty,
        question_count: u8,
    ) -> Result<Self, ConfigError> {
        if !(MIN_QUESTION_COUNT..=MAX_QUESTION_COUNT).contains(&question_count) {
            return Err(ConfigError::Invalid(format!(
                "question count must be between {} and {}, got {}",
                MIN_QUESTION_COUNT, MAX_QUESTION_COUNT, question_count
            )));
        }
        Ok(Self { question_type, difficulty, question_count })
    }

    pub fn question_type(&self) -> QuestionType {
        self.question_type
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn question_count(&self) -> u8 {
        self.question_count
    }
}

/// Body of a generation request.
///
/// `questionCount` is the canonical field; `count` is accepted when reading for older
/// callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub content: String,
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    #[serde(alias = "count")]
    pub question_count: u8,
}

impl GenerationRequest {
    pub fn new(content: impl Into<String>, config: &QuizConfig) -> Self {
        Self {
            content: content.into(),
            question_type: config.question_type(),
            difficulty: config.difficulty(),
            question_count: config.question_count(),
        }
    }

    /// Validated selection carried by this request.
    pub fn config(&self) -> Result<QuizConfig, ConfigError> {
        QuizConfig::new(self.question_type, self.difficulty, self.question_count)
    }
}

/// What the generation service returns on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "Quiz", description = "The generated quiz")]
pub struct GeneratedQuiz {
    /// The generated questions, in order
    pub questions: Vec<Question>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_type_wire_names() {
        let json = serde_json::to_string(&QuestionType::TrueFalse).unwrap();
        assert_eq!(json, "\"True/False\"");
        let parsed: QuestionType = serde_json::from_str("\"Long Answer\"").unwrap();
        assert_eq!(parsed, QuestionType::LongAnswer);
    }

    #[test]
    fn question_type_from_cli_names() {
        assert_eq!("true-false".parse::<QuestionType>().unwrap(), QuestionType::TrueFalse);
        assert_eq!("One Word".parse::<QuestionType>().unwrap(), QuestionType::OneWord);
        assert_eq!("MCQ".parse::<QuestionType>().unwrap(), QuestionType::Mcq);
        assert!("essay".parse::<QuestionType>().is_err());
    }

    #[test]
    fn config_rejects_counts_outside_range() {
        assert!(QuizConfig::new(QuestionType::Mcq, Difficulty::Easy, 2).is_err());
        assert!(QuizConfig::new(QuestionType::Mcq, Difficulty::Easy, 21).is_err());
        assert!(QuizConfig::new(QuestionType::Mcq, Difficulty::Easy, 3).is_ok());
        assert!(QuizConfig::new(QuestionType::Mcq, Difficulty::Easy, 20).is_ok());
    }

    #[test]
    fn request_accepts_legacy_count_field() {
        let body = r#"{"content":"x","questionType":"Brief","difficulty":"Hard","count":7}"#;
        let request: GenerationRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.question_count, 7);
        assert_eq!(request.question_type, QuestionType::Brief);

        let out = serde_json::to_value(&request).unwrap();
        assert_eq!(out["questionCount"], 7);
        assert!(out.get("count").is_none());
    }

    #[test]
    fn letters_pick_mcq_options() {
        let q = Question {
            question: "Capital of France?".into(),
            question_type: QuestionType::Mcq,
            options: Some(vec!["A) Berlin".into(), "B) Paris".into(), "C) Rome".into()]),
            correct_answer: "B) Paris".into(),
            explanation: String::new(),
        };
        assert_eq!(q.resolve_answer("b"), "B) Paris");
        assert_eq!(q.resolve_answer("3"), "C) Rome");
        assert_eq!(q.resolve_answer("z"), "z");
        assert_eq!(q.resolve_answer(" Paris "), "Paris");
    }

    #[test]
    fn true_false_shorthand() {
        let q = Question {
            question: "Water boils at 100C at sea level.".into(),
            question_type: QuestionType::TrueFalse,
            options: None,
            correct_answer: "True".into(),
            explanation: String::new(),
        };
        assert_eq!(q.resolve_answer("t"), "True");
        assert_eq!(q.resolve_answer("FALSE"), "False");
    }

    #[test]
    fn mcq_without_options_is_defective() {
        let q = Question {
            question: "Capital of France?".into(),
            question_type: QuestionType::Mcq,
            options: None,
            correct_answer: "Paris".into(),
            explanation: String::new(),
        };
        assert!(q.defect().is_some());
    }
}
