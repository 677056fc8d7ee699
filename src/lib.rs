pub mod clients;
pub mod config;
pub mod core;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod generator;
pub mod grading;
pub mod interceptors;
pub mod json_utils;
pub mod notice;
pub mod question;
pub mod session;

// Convenient re-exports
pub use error::{QuizError, SessionError};
pub use gateway::QuizGateway;
pub use generator::{HttpQuizGenerator, LocalQuizGenerator, QuizGenerator};
pub use grading::{score, QuizReport, Score};
pub use question::{Difficulty, Question, QuestionType, QuizConfig};
pub use session::{transition, Event, QuizSession, Stage};
