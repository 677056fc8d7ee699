//! Transient user notifications.

use std::fmt;

use crate::error::{QuizError, SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { level, title: title.into(), description: description.into() }
    }

    pub fn generated(count: usize) -> Self {
        Self::new(
            NoticeLevel::Success,
            "Quiz Generated!",
            format!("Successfully created {} questions.", count),
        )
    }

    pub fn file_processed(name: &str) -> Self {
        Self::new(NoticeLevel::Info, "File Processed", format!("Extracted text from {}.", name))
    }

    pub fn from_error(error: &QuizError) -> Self {
        let title = match error {
            QuizError::EmptyContent | QuizError::Session(SessionError::ContentRequired) => "Content Required",
            QuizError::Extraction(_) => "Error Processing File",
            QuizError::Session(_) => "Not Available",
            _ => "Error Generating Quiz",
        };
        Self::new(NoticeLevel::Error, title, error.user_message())
    }
}

impl From<&QuizError> for Notice {
    fn from(error: &QuizError) -> Self {
        Self::from_error(error)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;

    #[test]
    fn titles_follow_the_failure() {
        assert_eq!(Notice::from_error(&QuizError::EmptyContent).title, "Content Required");
        assert_eq!(
            Notice::from_error(&QuizError::Extraction(ExtractionError::OcrUnavailable)).title,
            "Error Processing File"
        );
        let rate_limited = QuizError::GenerationRequest {
            status: Some(429),
            message: "Rate limits exceeded. Please try again later.".to_string(),
        };
        let notice = Notice::from(&rate_limited);
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.title, "Error Generating Quiz");
        assert_eq!(notice.description, "Rate limits exceeded. Please try again later.");
    }

    #[test]
    fn generated_counts_questions() {
        assert_eq!(Notice::generated(5).to_string(), "Quiz Generated!: Successfully created 5 questions.");
    }
}
