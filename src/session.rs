//! Quiz session state machine.
//!
//! A session moves `Input → Config → Taking → Results` and back to `Input` on reset.
//! Every change goes through the pure [`transition`] function; a rejected event leaves
//! the session untouched so the user can correct the input and retry.

use std::collections::BTreeMap;

use tracing::{debug, info, instrument, warn};

use crate::error::{QuizError, SessionError};
use crate::generator::QuizGenerator;
use crate::grading::QuizReport;
use crate::question::{Question, QuizConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stage {
    #[default]
    Input,
    Config,
    Taking,
    Results,
}

/// User actions and generation outcomes that drive the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Leave `Input` with the acquired content
    SubmitContent(String),
    /// Change the question type, difficulty or count while in `Config`
    Configure(QuizConfig),
    /// A generation request was issued
    GenerationStarted,
    /// The pending request produced these questions
    GenerationSucceeded(Vec<Question>),
    /// The pending request failed
    GenerationFailed,
    /// Record (or overwrite) the answer to the current question
    RecordAnswer(String),
    /// Advance; completes the quiz on the last question
    Next,
    Previous,
    /// `Config → Input` or `Taking → Config`
    Back,
    /// Discard everything and return to `Input`
    Reset,
}

/// State of one quiz interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuizSession {
    stage: Stage,
    source_content: String,
    config: QuizConfig,
    questions: Vec<Question>,
    answers: BTreeMap<usize, String>,
    current_index: usize,
    generating: bool,
}

fn expect_stage(session: &QuizSession, expected: Stage) -> Result<(), SessionError> {
    if session.stage != expected {
        return Err(SessionError::WrongStage { expected, actual: session.stage });
    }
    Ok(())
}

/// Apply `event` to `session`, returning the next state.
pub fn transition(session: &QuizSession, event: Event) -> Result<QuizSession, SessionError> {
    let mut next = session.clone();
    match event {
        Event::SubmitContent(content) => {
            expect_stage(session, Stage::Input)?;
            if content.trim().is_empty() {
                return Err(SessionError::ContentRequired);
            }
            next.source_content = content;
            next.stage = Stage::Config;
        }
        Event::Configure(config) => {
            expect_stage(session, Stage::Config)?;
            if session.generating {
                return Err(SessionError::GenerationInProgress);
            }
            next.config = config;
        }
        Event::GenerationStarted => {
            expect_stage(session, Stage::Config)?;
            if session.generating {
                return Err(SessionError::GenerationInProgress);
            }
            if session.source_content.trim().is_empty() {
                return Err(SessionError::ContentRequired);
            }
            next.generating = true;
        }
        Event::GenerationSucceeded(questions) => {
            expect_stage(session, Stage::Config)?;
            if !session.generating {
                return Err(SessionError::GenerationNotStarted);
            }
            if questions.is_empty() {
                return Err(SessionError::NoQuestions);
            }
            next.generating = false;
            next.questions = questions;
            next.answers.clear();
            next.current_index = 0;
            next.stage = Stage::Taking;
        }
        Event::GenerationFailed => {
            expect_stage(session, Stage::Config)?;
            if !session.generating {
                return Err(SessionError::GenerationNotStarted);
            }
            next.generating = false;
        }
        Event::RecordAnswer(answer) => {
            expect_stage(session, Stage::Taking)?;
            next.answers.insert(session.current_index, answer);
        }
        Event::Next => {
            expect_stage(session, Stage::Taking)?;
            if !session.is_answered(session.current_index) {
                return Err(SessionError::AnswerRequired);
            }
            if session.current_index + 1 < session.questions.len() {
                next.current_index += 1;
            } else {
                next.stage = Stage::Results;
            }
        }
        Event::Previous => {
            expect_stage(session, Stage::Taking)?;
            next.current_index = session.current_index.saturating_sub(1);
        }
        Event::Back => match session.stage {
            Stage::Config if session.generating => return Err(SessionError::GenerationInProgress),
            Stage::Config => next.stage = Stage::Input,
            Stage::Taking => {
                next.questions.clear();
                next.answers.clear();
                next.current_index = 0;
                next.stage = Stage::Config;
            }
            actual => return Err(SessionError::WrongStage { expected: Stage::Config, actual }),
        },
        Event::Reset => next = QuizSession::default(),
    }
    Ok(next)
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `event` in place. On error the session is unchanged.
    pub fn apply(&mut self, event: Event) -> Result<(), SessionError> {
        let from = self.stage;
        match transition(self, event) {
            Ok(next) => {
                if next.stage != from {
                    debug!(target: "quiz_forge::session", ?from, to = ?next.stage, "Stage changed");
                }
                *self = next;
                Ok(())
            }
            Err(e) => {
                debug!(target: "quiz_forge::session", stage = ?from, error = %e, "Event rejected");
                Err(e)
            }
        }
    }

    pub fn submit_content(&mut self, content: impl Into<String>) -> Result<(), SessionError> {
        self.apply(Event::SubmitContent(content.into()))
    }

    pub fn configure(&mut self, config: QuizConfig) -> Result<(), SessionError> {
        self.apply(Event::Configure(config))
    }

    pub fn record_answer(&mut self, answer: impl Into<String>) -> Result<(), SessionError> {
        self.apply(Event::RecordAnswer(answer.into()))
    }

    pub fn next(&mut self) -> Result<(), SessionError> {
        self.apply(Event::Next)
    }

    pub fn previous(&mut self) -> Result<(), SessionError> {
        self.apply(Event::Previous)
    }

    pub fn back(&mut self) -> Result<(), SessionError> {
        self.apply(Event::Back)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
        debug!(target: "quiz_forge::session", "Session reset");
    }

    /// Generate questions for the submitted content and configuration.
    ///
    /// On success the session moves to `Taking` and the question count is returned.
    /// On failure it stays in `Config`, ready for another attempt.
    #[instrument(target = "quiz_forge::session", skip(self, generator), fields(content_len = self.source_content.len()))]
    pub async fn generate<G>(&mut self, generator: &G) -> Result<usize, QuizError>
    where
        G: QuizGenerator + ?Sized,
    {
        self.apply(Event::GenerationStarted)?;
        info!(
            target: "quiz_forge::session",
            question_type = %self.config.question_type(),
            difficulty = %self.config.difficulty(),
            count = self.config.question_count(),
            "Requesting quiz generation"
        );

        let outcome = generator.generate(&self.source_content, &self.config).await;
        match outcome {
            Ok(questions) => {
                let count = questions.len();
                if let Err(e) = self.apply(Event::GenerationSucceeded(questions)) {
                    self.apply(Event::GenerationFailed)?;
                    return Err(e.into());
                }
                info!(target: "quiz_forge::session", count, "Quiz ready");
                Ok(count)
            }
            Err(e) => {
                warn!(target: "quiz_forge::session", error = %e, "Quiz generation failed");
                self.apply(Event::GenerationFailed)?;
                Err(e)
            }
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn source_content(&self) -> &str {
        &self.source_content
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &BTreeMap<usize, String> {
        &self.answers
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The question being answered; `None` outside `Taking`.
    pub fn current_question(&self) -> Option<&Question> {
        if self.stage != Stage::Taking {
            return None;
        }
        self.questions.get(self.current_index)
    }

    pub fn current_answer(&self) -> Option<&str> {
        self.answers.get(&self.current_index).map(String::as_str)
    }

    /// Whether a non-blank answer is recorded for `index`.
    pub fn is_answered(&self, index: usize) -> bool {
        self.answers
            .get(&index)
            .map_or(false, |answer| !answer.trim().is_empty())
    }

    pub fn answered_count(&self) -> usize {
        (0..self.questions.len()).filter(|&i| self.is_answered(i)).count()
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    /// Whether `Next` would be accepted.
    pub fn can_advance(&self) -> bool {
        self.stage == Stage::Taking && self.is_answered(self.current_index)
    }

    /// `(current_index + 1) / total`, in `(0, 1]`; `None` outside `Taking`.
    pub fn progress(&self) -> Option<f64> {
        if self.stage != Stage::Taking || self.questions.is_empty() {
            return None;
        }
        Some((self.current_index + 1) as f64 / self.questions.len() as f64)
    }

    /// Graded results; `None` until the quiz is complete.
    pub fn report(&self) -> Option<QuizReport> {
        if self.stage != Stage::Results {
            return None;
        }
        Some(QuizReport::new(&self.questions, &self.answers))
    }
}
