use thiserror::Error;

use crate::session::Stage;

/// Fallback shown when the generation service gives no message of its own.
pub const GENERATION_FALLBACK_MESSAGE: &str = "Failed to generate quiz. Please try again.";
/// Shown for failures nothing more specific is known about.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Errors surfaced by the quiz flow. Each one maps to a user-facing message and
/// leaves the session in the stage it was in.
#[derive(Error, Debug)]
pub enum QuizError {
    #[error("Content required")]
    EmptyContent,
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("Generation request failed (status {status:?}): {message}")]
    GenerationRequest { status: Option<u16>, message: String },
    #[error("Invalid response format: {0}")]
    InvalidResponseFormat(String),
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl QuizError {
    /// Text for the notification shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyContent => "Please provide some content to generate quiz from".to_string(),
            Self::Extraction(e) => e.user_message().to_string(),
            Self::GenerationRequest { message, .. } => message.clone(),
            Self::InvalidResponseFormat(_) => "Invalid response format from the server".to_string(),
            Self::Session(e) => e.to_string(),
            Self::Unknown(_) => UNKNOWN_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Rejected session transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Please provide some content to generate quiz from")]
    ContentRequired,
    #[error("This action is not available while {actual:?} is active (expected {expected:?})")]
    WrongStage { expected: Stage, actual: Stage },
    #[error("A quiz is already being generated")]
    GenerationInProgress,
    #[error("No quiz is being generated")]
    GenerationNotStarted,
    #[error("The quiz has no questions")]
    NoQuestions,
    #[error("Answer the current question before moving on")]
    AnswerRequired,
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File is not valid UTF-8 text")]
    InvalidText,
    #[error("No extractable text in {0}")]
    Empty(String),
    #[error("Text extraction program failed: {0}")]
    Program(String),
    #[error("Image text recognition is not available")]
    OcrUnavailable,
}

impl ExtractionError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Empty(_) => "The file appears to be empty or contains no extractable text.",
            Self::OcrUnavailable => "Image uploaded, but text recognition is not available yet. Please paste the text instead.",
            _ => "Failed to process the uploaded file. Please try another file.",
        }
    }
}

/// Failure reported by an LLM provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Payment required")]
    PaymentRequired,
    #[error("Authentication failed")]
    Authentication,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AIError {
    #[error("Chat completions API error: {0}")]
    Chat(ProviderError),
    #[error("Claude API error: {0}")]
    Claude(ProviderError),
    #[error("Mock error: {0}")]
    Mock(ProviderError),
}

impl AIError {
    pub fn provider_error(&self) -> &ProviderError {
        match self {
            Self::Chat(e) | Self::Claude(e) | Self::Mock(e) => e,
        }
    }
}

/// Failures of the generation service, each carrying the HTTP status it answers with.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Model error: {0}")]
    Ai(#[from] AIError),
    #[error("Could not parse quiz data from AI response")]
    UnparseableOutput,
}

impl GatewayError {
    pub fn status(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Ai(e) => match e.provider_error() {
                ProviderError::RateLimit => 429,
                ProviderError::PaymentRequired => 402,
                _ => 500,
            },
            Self::UnparseableOutput => 500,
        }
    }

    /// The `error` field of the JSON failure body.
    pub fn public_message(&self) -> String {
        match self {
            Self::BadRequest(reason) => format!("Invalid request: {}", reason),
            Self::Ai(e) => match e.provider_error() {
                ProviderError::RateLimit => "Rate limits exceeded. Please try again later.".to_string(),
                ProviderError::PaymentRequired => {
                    "Payment required. Please add credits to your workspace.".to_string()
                }
                _ => "Failed to generate quiz".to_string(),
            },
            Self::UnparseableOutput => self.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable {0} is not set")]
    MissingKey(&'static str),
    #[error("{0}")]
    Invalid(String),
}
